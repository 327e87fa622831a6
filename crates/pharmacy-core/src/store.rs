//! Catalog store adapter.
//!
//! The narrow read/write surface the search engine and upsert resolver need
//! from persistent storage. Implementations translate these calls into their
//! own query language with bound parameters; they hold no business logic.
//! [`crate::db::Database`] is the SQLite implementation.

use thiserror::Error;

use crate::models::{Drug, DrugId, InventoryItem};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A uniqueness constraint rejected an insert.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Substring query against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTextQuery {
    /// Matched case-insensitively against medication and generic name
    pub text: String,
    /// Matched as a substring of the NDC column; `None` searches names only
    pub ndc: Option<String>,
    /// Maximum number of rows to return
    pub limit: usize,
}

/// Exact attribute key used to find an equivalent catalog drug.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugAttributes<'a> {
    /// Compared case-insensitively
    pub medication_name: &'a str,
    pub strength: f64,
    pub strength_unit: &'a str,
    pub form: &'a str,
}

/// Storage operations consumed by the core.
pub trait CatalogStore {
    /// In-stock units (available quantity > 0) at a clinic, joined to their drug.
    fn query_inventory(&self, clinic_id: &str) -> StoreResult<Vec<InventoryItem>>;

    /// Catalog drugs matching a substring query, at most `query.limit` rows.
    fn query_catalog_by_text(&self, query: &CatalogTextQuery) -> StoreResult<Vec<Drug>>;

    /// Catalog drug whose stored NDC equals `ndc` exactly.
    fn query_catalog_by_exact_ndc(&self, ndc: &str) -> StoreResult<Option<Drug>>;

    /// Catalog drug with the same name, strength, unit and form.
    fn query_catalog_by_attributes(&self, attrs: &DrugAttributes<'_>) -> StoreResult<Option<Drug>>;

    /// Insert a catalog drug and return its identifier.
    ///
    /// A uniqueness violation is reported as [`StoreError::Conflict`].
    fn insert_drug(&self, drug: &Drug) -> StoreResult<DrugId>;

    /// Whether the clinic requires a Left/Right position in lot codes.
    ///
    /// Unknown clinics do not.
    fn clinic_requires_lot_location(&self, clinic_id: &str) -> StoreResult<bool>;
}
