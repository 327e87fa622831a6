//! Drug search engine.
//!
//! Merges two sources for a clinic: the clinic's in-stock inventory and the
//! shared drug catalog. Inventory matches always come first. A failing source
//! is logged and contributes nothing; the other source still answers.
//!
//! Pipeline: Query Normalization → Inventory Match → Catalog Match → Dedup → Rank → Truncate

mod query;
mod ranking;

pub use query::*;
pub use ranking::*;

use tracing::{debug, warn};

use crate::codes::ndc_matches;
use crate::models::{Drug, InventoryItem, SearchResult};
use crate::store::{CatalogStore, CatalogTextQuery};

/// Maximum results from [`SearchEngine::search_drugs`].
pub const MAX_DRUG_RESULTS: usize = 10;

/// Maximum results from [`SearchEngine::search_medications_by_name`].
pub const MAX_MEDICATION_RESULTS: usize = 15;

/// Number of catalog rows fetched per search.
pub const CATALOG_CANDIDATE_LIMIT: usize = 20;

/// Stateless search over a catalog store.
pub struct SearchEngine<'a, S: CatalogStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: CatalogStore + ?Sized> SearchEngine<'a, S> {
    /// Create a new search engine.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Search by name or NDC fragment.
    ///
    /// Inventory drugs match when their NDC contains the query digits or a
    /// name contains the query text. Results are unique by NDC, inventory
    /// first, in source order, at most [`MAX_DRUG_RESULTS`].
    pub fn search_drugs(&self, query: &str, clinic_id: &str) -> Vec<SearchResult> {
        let Some(query) = SearchQuery::parse(query) else {
            return Vec::new();
        };

        let mut results = DedupResults::new();

        for item in self.inventory(clinic_id) {
            let drug = item.drug;
            if query.matches_ndc(&drug.normalized_ndc()) || drug.name_contains(&query.text_lower) {
                results.push(NdcKey::of(&drug), SearchResult::from_inventory(drug));
            }
        }
        let inventory_count = results.len();

        let catalog = self.catalog(&CatalogTextQuery {
            text: query.text.clone(),
            ndc: Some(query.catalog_ndc_pattern().to_string()),
            limit: CATALOG_CANDIDATE_LIMIT,
        });
        for drug in catalog {
            results.push(NdcKey::of(&drug), SearchResult::from_catalog(drug));
        }

        debug!(
            query = %query.text,
            inventory = inventory_count,
            total = results.len(),
            "Drug search"
        );

        let mut results = results.into_vec();
        results.truncate(MAX_DRUG_RESULTS);
        results
    }

    /// Exact NDC lookup, preferring the clinic's stock.
    ///
    /// Inventory is compared on normalized NDCs; the catalog fallback uses
    /// the NDC exactly as given.
    pub fn search_drug_by_ndc(&self, ndc: &str, clinic_id: Option<&str>) -> Option<SearchResult> {
        if ndc.trim().is_empty() {
            return None;
        }

        if let Some(clinic_id) = clinic_id {
            let in_stock = self.inventory(clinic_id).into_iter().find(|item| {
                item.drug
                    .ndc
                    .as_deref()
                    .is_some_and(|stored| ndc_matches(ndc, stored))
            });
            if let Some(item) = in_stock {
                return Some(SearchResult::from_inventory(item.drug));
            }
        }

        match self.store.query_catalog_by_exact_ndc(ndc) {
            Ok(drug) => drug.map(SearchResult::from_catalog),
            Err(e) => {
                warn!(error = %e, ndc, "Catalog NDC lookup failed");
                None
            }
        }
    }

    /// Search by name only, collapsing equivalent drugs.
    ///
    /// Results are unique by (medication name, strength, unit), sorted with
    /// inventory first and then alphabetically, at most
    /// [`MAX_MEDICATION_RESULTS`].
    pub fn search_medications_by_name(&self, query: &str, clinic_id: &str) -> Vec<SearchResult> {
        let Some(query) = SearchQuery::parse(query) else {
            return Vec::new();
        };

        let mut results = DedupResults::new();

        for item in self.inventory(clinic_id) {
            let drug = item.drug;
            if drug.name_contains(&query.text_lower) {
                results.push(MedicationKey::of(&drug), SearchResult::from_inventory(drug));
            }
        }

        let catalog = self.catalog(&CatalogTextQuery {
            text: query.text.clone(),
            ndc: None,
            limit: CATALOG_CANDIDATE_LIMIT,
        });
        for drug in catalog {
            results.push(MedicationKey::of(&drug), SearchResult::from_catalog(drug));
        }

        let mut results = results.into_vec();
        sort_inventory_first_by_name(&mut results);
        results.truncate(MAX_MEDICATION_RESULTS);

        debug!(query = %query.text, total = results.len(), "Medication name search");
        results
    }

    /// In-stock inventory, or nothing if the store fails.
    fn inventory(&self, clinic_id: &str) -> Vec<InventoryItem> {
        self.store.query_inventory(clinic_id).unwrap_or_else(|e| {
            warn!(error = %e, clinic_id, "Inventory query failed, searching catalog only");
            Vec::new()
        })
    }

    /// Catalog candidates, or nothing if the store fails.
    fn catalog(&self, query: &CatalogTextQuery) -> Vec<Drug> {
        self.store.query_catalog_by_text(query).unwrap_or_else(|e| {
            warn!(error = %e, query = %query.text, "Catalog query failed, using inventory only");
            Vec::new()
        })
    }
}
