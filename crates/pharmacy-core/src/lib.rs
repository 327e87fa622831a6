//! Pharmacy Inventory Core Library
//!
//! Drug search, catalog upsert and lot/QR code grammar for clinic pharmacies.
//!
//! # Architecture
//!
//! ```text
//!   free-text query / scanned NDC
//!                │
//!                ▼
//!     ┌─────────────────────┐        ┌──────────────────────┐
//!     │    SearchEngine     │───────▶│     CatalogStore     │
//!     │ normalize → match → │        │  inventory (clinic)  │
//!     │ dedup → rank → cap  │        │  catalog (shared)    │
//!     └─────────────────────┘        └──────────▲───────────┘
//!                                               │
//!     ┌─────────────────────┐                   │
//!     │    DrugResolver     │───────────────────┘
//!     │ NDC → attrs → insert│
//!     └─────────────────────┘
//!
//!     codes: NDC · lot code · dosage · QR code  (pure, used by both)
//! ```
//!
//! # Core Principle
//!
//! **Reads degrade, writes fail loudly.** A search whose inventory or catalog
//! query fails still returns what the other source found; a drug that cannot
//! be created is always reported.
//!
//! # Modules
//!
//! - [`codes`]: NDC normalization, lot codes, dosage parsing, QR codes
//! - [`models`]: Domain types (Drug, Unit, Clinic, SearchResult)
//! - [`store`]: Storage interface consumed by the core
//! - [`db`]: SQLite implementation of the store
//! - [`search`]: Drug search engine
//! - [`resolver`]: Find-or-create for catalog drugs
//! - [`config`] / [`logging`]: process setup

pub mod codes;
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod search;
pub mod store;

// Re-export commonly used types
pub use codes::{Dosage, DrawerSide, LotCode};
pub use config::CoreConfig;
pub use db::Database;
pub use models::{Clinic, Drug, DrugId, InventoryItem, NewDrug, SearchResult, Unit};
pub use resolver::{DrugResolver, UpsertLocks};
pub use search::SearchEngine;
pub use store::{CatalogStore, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, Weak};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PharmacyError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StoreError> for PharmacyError {
    fn from(e: StoreError) -> Self {
        PharmacyError::DatabaseError(e.to_string())
    }
}

impl From<resolver::ResolverError> for PharmacyError {
    fn from(e: resolver::ResolverError) -> Self {
        match e {
            resolver::ResolverError::InvalidInput(msg) => PharmacyError::InvalidInput(msg),
            resolver::ResolverError::Store(e) => e.into(),
        }
    }
}

impl From<anyhow::Error> for PharmacyError {
    fn from(e: anyhow::Error) -> Self {
        PharmacyError::ConfigError(format!("{:#}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for PharmacyError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PharmacyError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PharmacyCore>, PharmacyError> {
    open_file(Path::new(&path))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PharmacyCore>, PharmacyError> {
    let db = Database::open_in_memory()?;
    Ok(PharmacyCore::new(db, Arc::new(UpsertLocks::new())))
}

/// Open the database named by a JSON config file.
///
/// A `log_filter` in the config also installs the tracing subscriber.
#[uniffi::export]
pub fn open_database_from_config(config_path: String) -> Result<Arc<PharmacyCore>, PharmacyError> {
    open_configured(CoreConfig::load(&config_path)?)
}

/// Open the database named by `PHARMACY_DB_PATH` (default `pharmacy.db`),
/// logging with `PHARMACY_LOG` when set.
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<PharmacyCore>, PharmacyError> {
    open_configured(CoreConfig::from_env())
}

fn open_configured(config: CoreConfig) -> Result<Arc<PharmacyCore>, PharmacyError> {
    if let Some(filter) = config.log_filter.as_deref() {
        logging::init_tracing(Some(filter));
    }
    open_file(&config.database_path)
}

fn open_file(path: &Path) -> Result<Arc<PharmacyCore>, PharmacyError> {
    let db = Database::open(path)?;
    Ok(PharmacyCore::new(db, shared_upsert_locks(path)))
}

/// Upsert locks for each open database file, so cores on the same file
/// serialize catalog creation with each other.
static UPSERT_LOCKS_BY_PATH: LazyLock<Mutex<HashMap<PathBuf, Weak<UpsertLocks>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn shared_upsert_locks(path: &Path) -> Arc<UpsertLocks> {
    let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let mut registry = UPSERT_LOCKS_BY_PATH
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    registry.retain(|_, locks| locks.strong_count() > 0);

    if let Some(locks) = registry.get(&key).and_then(Weak::upgrade) {
        return locks;
    }
    let locks = Arc::new(UpsertLocks::new());
    registry.insert(key, Arc::downgrade(&locks));
    locks
}

/// Install the tracing subscriber. Returns false if one was already installed.
#[uniffi::export]
pub fn init_logging(filter: Option<String>) -> bool {
    logging::init_tracing(filter.as_deref())
}

// =========================================================================
// Code Grammar (exported to FFI)
// =========================================================================

/// Strip all non-digits from an NDC.
#[uniffi::export]
pub fn normalize_ndc(ndc: String) -> String {
    codes::normalize_ndc(&ndc)
}

/// Check a lot code, optionally requiring a Left/Right position.
#[uniffi::export]
pub fn validate_lot_code(code: String, require_location: bool) -> bool {
    codes::validate_lot_code(&code, require_location)
}

/// Describe a lot code, e.g. "Drawer B Left".
#[uniffi::export]
pub fn get_lot_description(code: String) -> String {
    codes::lot_description(&code)
}

/// Parse a dosage string such as "5mg".
#[uniffi::export]
pub fn parse_dosage(text: String) -> FfiDosage {
    codes::parse_dosage(&text).into()
}

/// Generate a QR code string. `date` is `YYYY-MM-DD`; today (local time) when absent.
#[uniffi::export]
pub fn generate_qr_code(
    lot_code: String,
    date: Option<String>,
    medication_name: String,
    dosage: String,
    sequence: Option<u32>,
) -> Result<String, PharmacyError> {
    let date = match date {
        Some(d) => chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|e| PharmacyError::InvalidInput(format!("date '{}': {}", d, e)))?,
        None => chrono::Local::now().date_naive(),
    };
    Ok(codes::generate_qr_code(
        &lot_code,
        &date,
        &medication_name,
        &dosage,
        sequence,
    ))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
///
/// Calls on one core are serialized by its connection mutex. Cores opened on
/// the same file share `upsert_locks`, which serializes `get_or_create_drug`
/// across their connections; other processes are held off by the catalog's
/// unique index.
#[derive(uniffi::Object)]
pub struct PharmacyCore {
    db: Arc<Mutex<Database>>,
    upsert_locks: Arc<UpsertLocks>,
}

impl PharmacyCore {
    fn new(db: Database, upsert_locks: Arc<UpsertLocks>) -> Arc<Self> {
        Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            upsert_locks,
        })
    }
}

#[uniffi::export]
impl PharmacyCore {
    // =========================================================================
    // Search Operations
    // =========================================================================

    /// Search inventory and catalog by name or NDC fragment (max 10).
    pub fn search_drugs(
        &self,
        query: String,
        clinic_id: String,
    ) -> Result<Vec<FfiSearchResult>, PharmacyError> {
        let db = self.db.lock()?;
        let results = SearchEngine::new(&*db).search_drugs(&query, &clinic_id);
        Ok(results.into_iter().map(|r| r.into()).collect())
    }

    /// Exact NDC lookup, preferring the clinic's stock.
    pub fn search_drug_by_ndc(
        &self,
        ndc: String,
        clinic_id: Option<String>,
    ) -> Result<Option<FfiSearchResult>, PharmacyError> {
        let db = self.db.lock()?;
        let result = SearchEngine::new(&*db).search_drug_by_ndc(&ndc, clinic_id.as_deref());
        Ok(result.map(|r| r.into()))
    }

    /// Search by medication name, one entry per drug/strength (max 15).
    pub fn search_medications_by_name(
        &self,
        query: String,
        clinic_id: String,
    ) -> Result<Vec<FfiSearchResult>, PharmacyError> {
        let db = self.db.lock()?;
        let results = SearchEngine::new(&*db).search_medications_by_name(&query, &clinic_id);
        Ok(results.into_iter().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Find a matching catalog drug or create one; returns its ID.
    pub fn get_or_create_drug(&self, fields: FfiNewDrug) -> Result<String, PharmacyError> {
        let db = self.db.lock()?;
        let resolver = DrugResolver::new(&*db, &self.upsert_locks);
        Ok(resolver.get_or_create_drug(&fields.into())?)
    }

    /// Get a catalog drug by ID.
    pub fn get_drug(&self, drug_id: String) -> Result<Option<FfiDrug>, PharmacyError> {
        let db = self.db.lock()?;
        Ok(db.get_drug(&drug_id)?.map(|d| d.into()))
    }

    // =========================================================================
    // Clinic & Inventory Operations
    // =========================================================================

    /// Register a clinic; returns its ID.
    pub fn add_clinic(
        &self,
        name: String,
        require_lot_location: bool,
    ) -> Result<String, PharmacyError> {
        let db = self.db.lock()?;
        let clinic = Clinic::new(name, require_lot_location);
        db.insert_clinic(&clinic)?;
        Ok(clinic.id)
    }

    /// Add a unit of stock; returns its ID.
    ///
    /// The lot code, if any, must satisfy the clinic's location setting and
    /// is stored uppercase.
    pub fn add_unit(
        &self,
        clinic_id: String,
        drug_id: String,
        available_quantity: i64,
        lot_code: Option<String>,
    ) -> Result<String, PharmacyError> {
        let db = self.db.lock()?;
        if db.get_clinic(&clinic_id)?.is_none() {
            return Err(PharmacyError::NotFound(format!("clinic {}", clinic_id)));
        }
        if db.get_drug(&drug_id)?.is_none() {
            return Err(PharmacyError::NotFound(format!("drug {}", drug_id)));
        }

        let lot = match lot_code {
            Some(code) => {
                let required = db.clinic_requires_lot_location(&clinic_id)?;
                let lot = LotCode::parse(code.trim(), required).ok_or_else(|| {
                    PharmacyError::InvalidInput(format!("invalid lot code '{}'", code))
                })?;
                Some(lot.to_string())
            }
            None => None,
        };

        let mut unit = Unit::new(clinic_id, drug_id, available_quantity);
        unit.lot_code = lot;
        db.insert_unit(&unit)?;
        Ok(unit.id)
    }

    /// Validate a lot code against the clinic's location setting.
    pub fn validate_lot_code_for_clinic(
        &self,
        code: String,
        clinic_id: String,
    ) -> Result<bool, PharmacyError> {
        let db = self.db.lock()?;
        let required = db.clinic_requires_lot_location(&clinic_id)?;
        Ok(codes::validate_lot_code(&code, required))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog drug.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    pub id: String,
    pub medication_name: String,
    pub generic_name: String,
    pub strength: f64,
    pub strength_unit: String,
    pub ndc: Option<String>,
    pub form: String,
}

impl From<Drug> for FfiDrug {
    fn from(drug: Drug) -> Self {
        Self {
            id: drug.id,
            medication_name: drug.medication_name,
            generic_name: drug.generic_name,
            strength: drug.strength,
            strength_unit: drug.strength_unit,
            ndc: drug.ndc,
            form: drug.form,
        }
    }
}

/// FFI-safe search result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSearchResult {
    pub drug: FfiDrug,
    pub in_inventory: bool,
}

impl From<SearchResult> for FfiSearchResult {
    fn from(result: SearchResult) -> Self {
        Self {
            drug: result.drug.into(),
            in_inventory: result.in_inventory,
        }
    }
}

/// FFI-safe drug attributes for find-or-create.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewDrug {
    pub medication_name: String,
    pub generic_name: Option<String>,
    pub strength: f64,
    pub strength_unit: String,
    pub ndc: Option<String>,
    pub form: String,
}

impl From<FfiNewDrug> for NewDrug {
    fn from(fields: FfiNewDrug) -> Self {
        NewDrug {
            medication_name: fields.medication_name,
            generic_name: fields.generic_name,
            strength: fields.strength,
            strength_unit: fields.strength_unit,
            ndc: fields.ndc,
            form: fields.form,
        }
    }
}

/// FFI-safe parsed dosage.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiDosage {
    pub strength: f64,
    pub unit: String,
}

impl From<Dosage> for FfiDosage {
    fn from(dosage: Dosage) -> Self {
        Self {
            strength: dosage.strength,
            unit: dosage.unit,
        }
    }
}
