//! Clinic settings read by the core.

use serde::{Deserialize, Serialize};

/// A clinic and the settings that affect lot codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clinic {
    pub id: String,
    pub name: String,
    /// Whether lot codes must carry a Left/Right position
    pub require_lot_location: bool,
}

impl Clinic {
    /// Create a clinic with a fresh identifier.
    pub fn new(name: String, require_lot_location: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            require_lot_location,
        }
    }
}
