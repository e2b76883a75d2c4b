//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Listing URL discovery (`UrlDiscovery`)
//! - Listing detail enrichment (`ListingEnricher`)
//! - Cookie banner and login overlay dismissal

mod discovery;
mod listings;
mod overlays;

pub use discovery::{DiscoveryOutcome, PartitionUrls, UrlDiscovery};
pub use listings::{
    EnrichMode, EnrichOutcome, ExcludeReason, ListingEnricher, ListingOutcome, SNIPPET_CHARS,
    snippet,
};
pub use overlays::{Dismissal, dismiss_overlays};
