//! Drug upsert resolver.
//!
//! Find by NDC → Find by Attributes → Insert. Calls for the same
//! (name, strength, unit, form) are serialized through [`UpsertLocks`], and an
//! insert that loses a race to another writer re-reads the winner.

mod locks;

pub use locks::*;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Drug, DrugId, NewDrug};
use crate::store::{CatalogStore, DrugAttributes, StoreError, StoreResult};

/// Resolver errors.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Finds or creates catalog drugs.
pub struct DrugResolver<'a, S: CatalogStore + ?Sized> {
    store: &'a S,
    locks: &'a UpsertLocks,
}

impl<'a, S: CatalogStore + ?Sized> DrugResolver<'a, S> {
    /// Create a new resolver. `locks` must be shared by every resolver
    /// writing to the same catalog.
    pub fn new(store: &'a S, locks: &'a UpsertLocks) -> Self {
        Self { store, locks }
    }

    /// Return the identifier of a matching catalog drug, creating one if needed.
    ///
    /// Lookup failures are treated as "not found"; insert failures are
    /// returned to the caller.
    pub fn get_or_create_drug(&self, fields: &NewDrug) -> ResolverResult<DrugId> {
        if fields.medication_name.trim().is_empty() {
            return Err(ResolverError::InvalidInput(
                "medication name is required".into(),
            ));
        }
        if !fields.strength.is_finite() {
            return Err(ResolverError::InvalidInput(format!(
                "strength must be a finite number, got {}",
                fields.strength
            )));
        }

        self.locks
            .with_lock(&upsert_key(fields), || self.resolve_locked(fields))
    }

    fn resolve_locked(&self, fields: &NewDrug) -> ResolverResult<DrugId> {
        if let Some(ndc) = fields.ndc() {
            if let Some(drug) = self.lookup(self.store.query_catalog_by_exact_ndc(ndc)) {
                return Ok(drug.id);
            }
        }

        let attrs = attributes(fields);
        if let Some(drug) = self.lookup(self.store.query_catalog_by_attributes(&attrs)) {
            return Ok(drug.id);
        }

        let drug = fields.clone().into_drug(uuid::Uuid::new_v4().to_string());
        match self.store.insert_drug(&drug) {
            Ok(id) => {
                info!(drug_id = %id, medication = %drug.medication_name, "Created catalog drug");
                Ok(id)
            }
            Err(StoreError::Conflict(msg)) => {
                // Another writer created the same drug first.
                match self.store.query_catalog_by_attributes(&attrs)? {
                    Some(existing) => Ok(existing.id),
                    None => Err(StoreError::Conflict(msg).into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    fn lookup(&self, result: StoreResult<Option<Drug>>) -> Option<Drug> {
        result.unwrap_or_else(|e| {
            warn!(error = %e, "Catalog lookup failed during upsert");
            None
        })
    }
}

fn attributes(fields: &NewDrug) -> DrugAttributes<'_> {
    DrugAttributes {
        medication_name: &fields.medication_name,
        strength: fields.strength,
        strength_unit: &fields.strength_unit,
        form: &fields.form,
    }
}

/// Serialization key: the catalog uniqueness tuple, case-folded.
fn upsert_key(fields: &NewDrug) -> String {
    format!(
        "{}|{}|{}|{}",
        fields.medication_name.to_lowercase(),
        fields.strength,
        fields.strength_unit.to_lowercase(),
        fields.form.to_lowercase()
    )
}
