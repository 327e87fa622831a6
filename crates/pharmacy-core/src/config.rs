//! Process configuration.
//!
//! The entry point builds a [`CoreConfig`], opens the database from it and
//! hands the connection to the core. Nothing in the core reads the
//! environment on its own.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable holding the database path.
pub const DB_PATH_ENV: &str = "PHARMACY_DB_PATH";

/// Environment variable holding the tracing filter.
pub const LOG_ENV: &str = "PHARMACY_LOG";

/// Default database file when nothing is configured.
pub const DEFAULT_DB_PATH: &str = "pharmacy.db";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// `tracing` filter directive, e.g. "pharmacy_core=debug"
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            log_filter: None,
        }
    }
}

impl CoreConfig {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Build configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_path: lookup(DB_PATH_ENV)
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_filter: lookup(LOG_ENV).filter(|f| !f.trim().is_empty()),
        }
    }
}
