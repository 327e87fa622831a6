//! Search engine integration tests.
//!
//! Exercise ordering, deduplication and source-failure behavior against an
//! in-memory SQLite store and a store with a broken source.

use std::cell::Cell;
use std::collections::HashSet;

use pharmacy_core::codes::normalize_ndc;
use pharmacy_core::db::Database;
use pharmacy_core::models::{Clinic, Drug, DrugId, InventoryItem, NewDrug, SearchResult, Unit};
use pharmacy_core::search::{SearchEngine, MAX_DRUG_RESULTS, MAX_MEDICATION_RESULTS};
use pharmacy_core::store::{
    CatalogStore, CatalogTextQuery, DrugAttributes, StoreError, StoreResult,
};

fn new_drug(name: &str, generic: Option<&str>, strength: f64, unit: &str, ndc: Option<&str>) -> NewDrug {
    let mut fields = NewDrug::new(name.into(), strength, unit.into(), "tablet".into());
    fields.generic_name = generic.map(Into::into);
    fields.ndc = ndc.map(Into::into);
    fields
}

/// A clinic with a mixed inventory and a larger catalog.
fn setup() -> (Database, String) {
    let db = Database::open_in_memory().unwrap();
    let clinic = Clinic::new("Main Street".into(), false);
    db.insert_clinic(&clinic).unwrap();
    let other = Clinic::new("Uptown".into(), false);
    db.insert_clinic(&other).unwrap();

    let catalog = vec![
        ("amlo-5", new_drug("Norvasc", Some("Amlodipine"), 5.0, "mg", Some("0069-1520-68"))),
        ("amlo-5-generic", new_drug("Amlodipine", None, 5.0, "mg", Some("0093-7167-01"))),
        ("amlo-10", new_drug("Amlodipine", None, 10.0, "mg", Some("0093-7168-01"))),
        ("amlo-5-repack", new_drug("Amlodipine", None, 5.0, "mg", Some("0093716701"))),
        ("lisin-10", new_drug("Lisinopril", None, 10.0, "mg", Some("0093-7339-01"))),
        ("metf-500", new_drug("Metformin", None, 500.0, "mg", None)),
        ("metf-850", new_drug("Metformin", None, 850.0, "mg", None)),
    ];

    for (id, fields) in catalog {
        // The repack differs only in form so the catalog accepts it
        let mut fields = fields;
        if id == "amlo-5-repack" {
            fields.form = "tablet, repackaged".into();
        }
        db.insert_drug(&fields.into_drug(id.into())).unwrap();
    }

    for (drug_id, qty) in [("amlo-5", 30), ("lisin-10", 0), ("metf-850", 12)] {
        db.insert_unit(&Unit::new(clinic.id.clone(), drug_id.into(), qty))
            .unwrap();
    }
    db.insert_unit(&Unit::new(other.id.clone(), "amlo-10".into(), 5))
        .unwrap();

    (db, clinic.id)
}

fn ids(results: &[SearchResult]) -> Vec<&str> {
    results.iter().map(|r| r.drug.id.as_str()).collect()
}

fn assert_inventory_grouped(results: &[SearchResult]) {
    let first_catalog = results.iter().position(|r| !r.in_inventory);
    if let Some(pos) = first_catalog {
        assert!(
            results[pos..].iter().all(|r| !r.in_inventory),
            "Inventory entry after catalog entry: {:?}",
            results.iter().map(|r| (&r.drug.id, r.in_inventory)).collect::<Vec<_>>()
        );
    }
}

#[test]
fn test_search_drugs_by_name() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    let results = engine.search_drugs("amlodipine", &clinic_id);

    // Norvasc matches by generic name and is in stock; the repack shares an
    // NDC with the generic and is dropped.
    assert_eq!(ids(&results), vec!["amlo-5", "amlo-5-generic", "amlo-10"]);
    assert!(results[0].in_inventory);
    assert!(!results[1].in_inventory);
}

#[test]
fn test_search_drugs_by_ndc_fragment() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    let results = engine.search_drugs("0069-1520", &clinic_id);
    assert_eq!(ids(&results), vec!["amlo-5"]);
    assert!(results[0].in_inventory);

    let results = engine.search_drugs("7339", &clinic_id);
    assert_eq!(ids(&results), vec!["lisin-10"]);
    assert!(!results[0].in_inventory, "zero-quantity units are not inventory");
}

#[test]
fn test_search_drugs_unique_by_ndc() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    for query in ["amlo", "0093", "metformin", "mg"] {
        let results = engine.search_drugs(query, &clinic_id);
        assert!(results.len() <= MAX_DRUG_RESULTS);
        assert_inventory_grouped(&results);

        let ndcs: Vec<String> = results
            .iter()
            .filter_map(|r| r.drug.ndc.as_deref().map(normalize_ndc))
            .collect();
        let unique: HashSet<&String> = ndcs.iter().collect();
        assert_eq!(unique.len(), ndcs.len(), "Duplicate NDC for query {:?}", query);
    }
}

#[test]
fn test_drugs_without_ndc_are_all_returned() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    let results = engine.search_drugs("metformin", &clinic_id);
    assert_eq!(ids(&results), vec!["metf-850", "metf-500"]);
    assert!(results[0].in_inventory);
}

#[test]
fn test_inventory_of_other_clinic_is_ignored() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    let results = engine.search_drugs("amlo", &clinic_id);
    let amlo_10 = results.iter().find(|r| r.drug.id == "amlo-10").unwrap();
    assert!(!amlo_10.in_inventory);
}

#[test]
fn test_search_medications_by_name() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    let results = engine.search_medications_by_name("amlo", &clinic_id);

    // In stock first, then alphabetical; the 5mg generic and repack collapse.
    assert_eq!(ids(&results), vec!["amlo-5", "amlo-5-generic", "amlo-10"]);
    assert_eq!(results[0].drug.medication_name, "Norvasc");
    assert_inventory_grouped(&results);
}

#[test]
fn test_search_medications_ignores_ndc() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    assert!(engine.search_medications_by_name("0069", &clinic_id).is_empty());
}

#[test]
fn test_search_medications_sorted_within_groups() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    let results = engine.search_medications_by_name("in", &clinic_id);
    assert!(results.len() <= MAX_MEDICATION_RESULTS);
    assert_inventory_grouped(&results);

    for group in [true, false] {
        let names: Vec<String> = results
            .iter()
            .filter(|r| r.in_inventory == group)
            .map(|r| r.drug.medication_name.to_lowercase())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    let keys: HashSet<(String, u64, String)> = results
        .iter()
        .map(|r| {
            (
                r.drug.medication_name.to_lowercase(),
                r.drug.strength.to_bits(),
                r.drug.strength_unit.to_lowercase(),
            )
        })
        .collect();
    assert_eq!(keys.len(), results.len());
}

#[test]
fn test_search_drug_by_ndc() {
    let (db, clinic_id) = setup();
    let engine = SearchEngine::new(&db);

    let hit = engine.search_drug_by_ndc("0069152068", Some(&clinic_id)).unwrap();
    assert_eq!(hit.drug.id, "amlo-5");
    assert!(hit.in_inventory);

    // Out of stock: falls back to the catalog, which needs the raw form
    assert!(engine.search_drug_by_ndc("0093733901", Some(&clinic_id)).is_none());
    let hit = engine.search_drug_by_ndc("0093-7339-01", Some(&clinic_id)).unwrap();
    assert_eq!(hit.drug.id, "lisin-10");
    assert!(!hit.in_inventory);

    assert!(engine.search_drug_by_ndc("9999-9999-99", None).is_none());
}

#[test]
fn test_catalog_only_drug_found_by_scanned_ndc() {
    let db = Database::open_in_memory().unwrap();
    let clinic = Clinic::new("Main Street".into(), false);
    db.insert_clinic(&clinic).unwrap();
    let drug = new_drug("Amlodipine", None, 5.0, "mg", Some("0069-1520-68")).into_drug("amlo".into());
    db.insert_drug(&drug).unwrap();

    let engine = SearchEngine::new(&db);
    for scanned in ["0069152068", "0069-1520-68", "1520 68"] {
        let results = engine.search_drugs(scanned, &clinic.id);
        assert_eq!(ids(&results), vec!["amlo"], "scan {:?}", scanned);
        assert!(!results[0].in_inventory);
    }

    // Stocking it changes the flag, not whether it is found
    db.insert_unit(&Unit::new(clinic.id.clone(), "amlo".into(), 4)).unwrap();
    let results = engine.search_drugs("0069152068", &clinic.id);
    assert_eq!(ids(&results), vec!["amlo"]);
    assert!(results[0].in_inventory);
}

#[test]
fn test_non_ascii_names_match_in_either_source() {
    let db = Database::open_in_memory().unwrap();
    let clinic = Clinic::new("Main Street".into(), false);
    db.insert_clinic(&clinic).unwrap();
    let drug = new_drug("Étodolac", None, 400.0, "mg", None).into_drug("etod".into());
    db.insert_drug(&drug).unwrap();

    let engine = SearchEngine::new(&db);
    for query in ["étodolac", "ÉTODOLAC"] {
        let results = engine.search_medications_by_name(query, &clinic.id);
        assert_eq!(ids(&results), vec!["etod"], "query {:?}", query);
        assert!(!results[0].in_inventory);
        assert_eq!(ids(&engine.search_drugs(query, &clinic.id)), vec!["etod"]);
    }

    db.insert_unit(&Unit::new(clinic.id.clone(), "etod".into(), 10)).unwrap();
    let results = engine.search_medications_by_name("étodolac", &clinic.id);
    assert_eq!(ids(&results), vec!["etod"]);
    assert!(results[0].in_inventory);
}

/// Store with switchable failures that counts every call.
struct FlakyStore {
    db: Database,
    fail_inventory: bool,
    fail_catalog: bool,
    calls: Cell<usize>,
}

impl FlakyStore {
    fn new(db: Database) -> Self {
        Self {
            db,
            fail_inventory: false,
            fail_catalog: false,
            calls: Cell::new(0),
        }
    }

    fn call(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl CatalogStore for FlakyStore {
    fn query_inventory(&self, clinic_id: &str) -> StoreResult<Vec<InventoryItem>> {
        self.call();
        if self.fail_inventory {
            return Err(StoreError::Unavailable("inventory timed out".into()));
        }
        self.db.query_inventory(clinic_id)
    }

    fn query_catalog_by_text(&self, query: &CatalogTextQuery) -> StoreResult<Vec<Drug>> {
        self.call();
        if self.fail_catalog {
            return Err(StoreError::Unavailable("catalog timed out".into()));
        }
        self.db.query_catalog_by_text(query)
    }

    fn query_catalog_by_exact_ndc(&self, ndc: &str) -> StoreResult<Option<Drug>> {
        self.call();
        if self.fail_catalog {
            return Err(StoreError::Unavailable("catalog timed out".into()));
        }
        self.db.query_catalog_by_exact_ndc(ndc)
    }

    fn query_catalog_by_attributes(&self, attrs: &DrugAttributes<'_>) -> StoreResult<Option<Drug>> {
        self.call();
        self.db.query_catalog_by_attributes(attrs)
    }

    fn insert_drug(&self, drug: &Drug) -> StoreResult<DrugId> {
        self.call();
        self.db.insert_drug(drug)
    }

    fn clinic_requires_lot_location(&self, clinic_id: &str) -> StoreResult<bool> {
        self.call();
        self.db.clinic_requires_lot_location(clinic_id)
    }
}

#[test]
fn test_short_query_never_touches_store() {
    let (db, clinic_id) = setup();
    let store = FlakyStore::new(db);
    let engine = SearchEngine::new(&store);

    assert!(engine.search_drugs(" a ", &clinic_id).is_empty());
    assert!(engine.search_medications_by_name("", &clinic_id).is_empty());
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn test_inventory_failure_keeps_catalog_results() {
    let (db, clinic_id) = setup();
    let mut store = FlakyStore::new(db);
    store.fail_inventory = true;
    let engine = SearchEngine::new(&store);

    let results = engine.search_drugs("amlodipine", &clinic_id);
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| !r.in_inventory));

    let hit = engine.search_drug_by_ndc("0069-1520-68", Some(&clinic_id)).unwrap();
    assert!(!hit.in_inventory);
}

#[test]
fn test_catalog_failure_keeps_inventory_results() {
    let (db, clinic_id) = setup();
    let mut store = FlakyStore::new(db);
    store.fail_catalog = true;
    let engine = SearchEngine::new(&store);

    let results = engine.search_medications_by_name("amlo", &clinic_id);
    assert_eq!(ids(&results), vec!["amlo-5"]);
    assert!(results[0].in_inventory);

    assert!(engine.search_drug_by_ndc("0093-7339-01", Some(&clinic_id)).is_none());
}

#[test]
fn test_both_sources_failing_is_empty() {
    let (db, clinic_id) = setup();
    let mut store = FlakyStore::new(db);
    store.fail_inventory = true;
    store.fail_catalog = true;
    let engine = SearchEngine::new(&store);

    assert!(engine.search_drugs("amlodipine", &clinic_id).is_empty());
}
