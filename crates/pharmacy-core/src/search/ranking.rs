//! Deduplication and ordering of merged search results.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use crate::models::{Drug, DrugId, SearchResult};

/// Identity of a drug for NDC-based deduplication.
///
/// Drugs without an NDC are only deduplicated against themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NdcKey {
    Ndc(String),
    Unlabeled(DrugId),
}

impl NdcKey {
    pub fn of(drug: &Drug) -> Self {
        let ndc = drug.normalized_ndc();
        if ndc.is_empty() {
            NdcKey::Unlabeled(drug.id.clone())
        } else {
            NdcKey::Ndc(ndc)
        }
    }
}

/// `(medication name, strength, strength unit)`, case-insensitive.
///
/// Equivalent drugs sold under different NDCs share this key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MedicationKey {
    name: String,
    strength_bits: u64,
    unit: String,
}

impl MedicationKey {
    pub fn of(drug: &Drug) -> Self {
        // -0.0 and 0.0 are the same strength
        let strength = if drug.strength == 0.0 { 0.0 } else { drug.strength };
        Self {
            name: drug.medication_name.to_lowercase(),
            strength_bits: strength.to_bits(),
            unit: drug.strength_unit.to_lowercase(),
        }
    }
}

/// Results in insertion order; the first entry for a key wins.
pub struct DedupResults<K> {
    seen: HashSet<K>,
    results: Vec<SearchResult>,
}

impl<K: Eq + Hash> DedupResults<K> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            results: Vec::new(),
        }
    }

    /// Add a result unless its key was already seen. Returns whether it was added.
    pub fn push(&mut self, key: K, result: SearchResult) -> bool {
        if !self.seen.insert(key) {
            return false;
        }
        self.results.push(result);
        true
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn into_vec(self) -> Vec<SearchResult> {
        self.results
    }
}

impl<K: Eq + Hash> Default for DedupResults<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Inventory first, then by medication name. The sort is stable, so equal
/// names keep insertion order.
pub fn sort_inventory_first_by_name(results: &mut [SearchResult]) {
    results.sort_by(|a, b| inventory_first(a, b).then_with(|| by_name(a, b)));
}

fn inventory_first(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.in_inventory.cmp(&a.in_inventory)
}

fn by_name(a: &SearchResult, b: &SearchResult) -> Ordering {
    a.drug
        .medication_name
        .to_lowercase()
        .cmp(&b.drug.medication_name.to_lowercase())
}
