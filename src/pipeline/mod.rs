//! Pipeline entry points for crawler operations.
//!
//! - `run_scrape`: Discover listing URLs and keep keyword matches
//! - `run_enrich`: Enrich every cached URL list
//! - `run_filter`: Move accepted raw records into the cleaned store
//! - `run_pipeline`: Discover, enrich and filter in one run
//! - `run_info`: Report configuration and store status

pub mod enrich;
pub mod filter;
pub mod info;
pub mod persist;
pub mod pipeline;
pub mod scrape;
pub mod stats;

pub use enrich::run_enrich;
pub use filter::{FilterOutcome, FilterSummary, classify, run_filter};
pub use info::{StoreStatus, run_info};
pub use persist::{FlushPolicy, RawResults};
pub use pipeline::run_pipeline;
pub use scrape::{run_discovery, run_scrape};
pub use stats::RunStats;
