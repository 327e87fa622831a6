//! Drug catalog and inventory models.

use serde::{Deserialize, Serialize};

/// Catalog identifier for a drug.
pub type DrugId = String;

/// A single entry in the shared drug catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drug {
    /// Unique identifier
    pub id: DrugId,
    /// Medication name as dispensed (e.g., "Amlodipine")
    pub medication_name: String,
    /// Generic name; equals the medication name when none was given
    pub generic_name: String,
    /// Numeric strength (e.g., 5.0)
    pub strength: f64,
    /// Strength unit, free text (e.g., "mg", "mg/ml")
    pub strength_unit: String,
    /// National Drug Code as entered, separators included
    pub ndc: Option<String>,
    /// Dosage form (e.g., "tablet", "suspension")
    pub form: String,
}

impl Drug {
    /// NDC with separators stripped, empty when the drug has none.
    pub fn normalized_ndc(&self) -> String {
        self.ndc
            .as_deref()
            .map(crate::codes::normalize_ndc)
            .unwrap_or_default()
    }

    /// Case-insensitive substring match on medication or generic name.
    ///
    /// `query_lower` must already be lowercase.
    pub fn name_contains(&self, query_lower: &str) -> bool {
        self.medication_name.to_lowercase().contains(query_lower)
            || self.generic_name.to_lowercase().contains(query_lower)
    }
}

/// Attributes for finding or creating a catalog drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDrug {
    pub medication_name: String,
    pub generic_name: Option<String>,
    pub strength: f64,
    pub strength_unit: String,
    pub ndc: Option<String>,
    pub form: String,
}

impl NewDrug {
    /// Create drug attributes with required fields.
    pub fn new(medication_name: String, strength: f64, strength_unit: String, form: String) -> Self {
        Self {
            medication_name,
            generic_name: None,
            strength,
            strength_unit,
            ndc: None,
            form,
        }
    }

    /// Supplied NDC, ignoring blank input.
    pub fn ndc(&self) -> Option<&str> {
        self.ndc.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Build the catalog row to insert under a fresh identifier.
    pub fn into_drug(self, id: DrugId) -> Drug {
        let ndc = self.ndc().map(str::to_string);
        let generic_name = self
            .generic_name
            .filter(|g| !g.trim().is_empty())
            .unwrap_or_else(|| self.medication_name.clone());
        Drug {
            id,
            medication_name: self.medication_name,
            generic_name,
            strength: self.strength,
            strength_unit: self.strength_unit,
            ndc,
            form: self.form,
        }
    }
}

/// One inventory record at a clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    pub id: String,
    pub clinic_id: String,
    pub drug_id: DrugId,
    /// Units with zero available quantity are out of stock
    pub available_quantity: i64,
    /// Drawer where the unit is stored
    pub lot_code: Option<String>,
}

impl Unit {
    /// Create an in-stock unit with a fresh identifier.
    pub fn new(clinic_id: String, drug_id: DrugId, available_quantity: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            clinic_id,
            drug_id,
            available_quantity,
            lot_code: None,
        }
    }
}

/// A unit joined to its catalog drug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub unit: Unit,
    pub drug: Drug,
}
