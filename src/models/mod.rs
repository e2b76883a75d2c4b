// src/models/mod.rs

//! Domain models for the crawler application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod listing;
mod partition;
mod rules;

// Re-export all public types
pub use config::{Config, SiteSelectors, TimeoutConfig};
pub use listing::{EnrichedRecord, NOT_AVAILABLE};
pub use partition::{DiscoveryPartition, TraversalMode};
pub use rules::{ExclusionRules, KeywordMatcher, contains_any};

