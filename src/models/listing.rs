//! Enriched listing record.

use serde::{Deserialize, Serialize};

/// Placeholder for a detail field whose element is absent on the page.
pub const NOT_AVAILABLE: &str = "N/A";

/// A listing enriched with the fields of its detail page.
///
/// `url` is the primary key; records are replaced, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichedRecord {
    /// Absolute listing URL
    pub url: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub price: String,

    #[serde(default)]
    pub shipping: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub date: String,

    /// Full description, or a bounded snippet in keyword-match mode
    #[serde(default, alias = "snippet")]
    pub description: String,

    /// Filter keywords found in the description (keyword-match mode only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<String>>,
}

impl EnrichedRecord {
    /// Whether the record carries a usable primary key.
    pub fn has_valid_url(&self) -> bool {
        !self.url.trim().is_empty()
    }
}
