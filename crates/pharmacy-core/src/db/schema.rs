//! SQLite schema definition.

/// Complete database schema for the pharmacy inventory core.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Clinics
-- ============================================================================

CREATE TABLE IF NOT EXISTS clinics (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    require_lot_location INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Drug Catalog (shared across clinics)
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    id TEXT PRIMARY KEY,
    medication_name TEXT NOT NULL,
    generic_name TEXT NOT NULL,
    strength REAL NOT NULL,
    strength_unit TEXT NOT NULL,
    ndc TEXT,                                    -- raw form, separators kept
    ndc_digits TEXT NOT NULL DEFAULT '',         -- digits only, for substring search
    form TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One catalog row per (name, strength, unit, form); concurrent creators
-- get a UNIQUE violation and re-read the winner.
CREATE UNIQUE INDEX IF NOT EXISTS idx_drugs_attributes
    ON drugs(lower(medication_name), strength, strength_unit, form);
CREATE INDEX IF NOT EXISTS idx_drugs_ndc ON drugs(ndc);

-- ============================================================================
-- Units (clinic inventory)
-- ============================================================================

CREATE TABLE IF NOT EXISTS units (
    id TEXT PRIMARY KEY,
    clinic_id TEXT NOT NULL REFERENCES clinics(id),
    drug_id TEXT NOT NULL REFERENCES drugs(id),
    available_quantity INTEGER NOT NULL DEFAULT 0 CHECK (available_quantity >= 0),
    lot_code TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_units_clinic ON units(clinic_id, available_quantity);
CREATE INDEX IF NOT EXISTS idx_units_drug ON units(drug_id);
"#;
