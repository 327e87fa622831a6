//! Search result projection.

use serde::{Deserialize, Serialize};

use super::Drug;

/// A drug returned by search, flagged with where it was found.
///
/// Built per search call; the order of a result list is significant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub drug: Drug,
    /// True when the match came from the clinic's current stock
    pub in_inventory: bool,
}

impl SearchResult {
    pub fn from_inventory(drug: Drug) -> Self {
        Self {
            drug,
            in_inventory: true,
        }
    }

    pub fn from_catalog(drug: Drug) -> Self {
        Self {
            drug,
            in_inventory: false,
        }
    }
}
