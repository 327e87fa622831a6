//! SQLite implementation of the catalog store.

mod clinics;
mod drugs;
mod schema;
mod units;

pub use schema::*;

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, ErrorCode};
use std::path::Path;

use crate::models::{Drug, DrugId, InventoryItem};
use crate::store::{CatalogStore, CatalogTextQuery, DrugAttributes, StoreError, StoreResult};

/// SQL function lowercasing text with Unicode rules, unlike SQLite's ASCII-only `lower`.
pub(crate) const UNICODE_LOWER: &str = "unicode_lower";

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Register SQL functions and initialize schema.
    fn initialize(&self) -> StoreResult<()> {
        self.conn.create_scalar_function(
            UNICODE_LOWER,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let text: Option<String> = ctx.get(0)?;
                Ok(text.map(|t| t.to_lowercase()))
            },
        )?;
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl CatalogStore for Database {
    fn query_inventory(&self, clinic_id: &str) -> StoreResult<Vec<InventoryItem>> {
        self.list_in_stock(clinic_id)
    }

    fn query_catalog_by_text(&self, query: &CatalogTextQuery) -> StoreResult<Vec<Drug>> {
        self.search_drugs_by_text(query)
    }

    fn query_catalog_by_exact_ndc(&self, ndc: &str) -> StoreResult<Option<Drug>> {
        self.get_drug_by_ndc(ndc)
    }

    fn query_catalog_by_attributes(&self, attrs: &DrugAttributes<'_>) -> StoreResult<Option<Drug>> {
        self.get_drug_by_attributes(attrs)
    }

    fn insert_drug(&self, drug: &Drug) -> StoreResult<DrugId> {
        self.insert_drug_row(drug)
    }

    fn clinic_requires_lot_location(&self, clinic_id: &str) -> StoreResult<bool> {
        Ok(self
            .get_clinic(clinic_id)?
            .map(|c| c.require_lot_location)
            .unwrap_or(false))
    }
}

/// Map a write failure, separating uniqueness conflicts from other constraints.
fn map_write_error(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            StoreError::Conflict(msg.clone().unwrap_or_else(|| err.to_string()))
        }
        rusqlite::Error::SqliteFailure(err, msg) if err.code == ErrorCode::ConstraintViolation => {
            StoreError::Constraint(msg.clone().unwrap_or_else(|| err.to_string()))
        }
        _ => e.into(),
    }
}

/// Wrap user input as a LIKE substring pattern, escaping `%`, `_` and `\`.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
