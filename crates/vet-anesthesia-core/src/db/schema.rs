//! SQLite schema definition.

/// Complete database schema for the anesthesia record store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Animals
-- ============================================================================

CREATE TABLE IF NOT EXISTS animals (
    local_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    breed TEXT,
    age_years INTEGER,
    weight_kg REAL NOT NULL CHECK (weight_kg > 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_animals_name ON animals(name);

-- ============================================================================
-- Drugs
-- ============================================================================

CREATE TABLE IF NOT EXISTS drugs (
    local_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    dose REAL NOT NULL CHECK (dose >= 0),
    dose_unit TEXT NOT NULL,                      -- e.g. 'mg/kg', 'µg/kg/min'
    concentration REAL NOT NULL CHECK (concentration > 0),
    concentration_unit TEXT NOT NULL,             -- 'mg/mL' or 'µg/mL'
    mode TEXT NOT NULL,                           -- 'bolus' | 'continuous_infusion'
    route TEXT,
    syringe_volume_ml REAL,
    comment TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_drugs_name ON drugs(name);

-- ============================================================================
-- Fluid Infusion Configurations
-- ============================================================================

CREATE TABLE IF NOT EXISTS infusion_configs (
    local_id TEXT PRIMARY KEY,
    weight_kg REAL NOT NULL CHECK (weight_kg > 0),
    rate_ml_per_kg_per_hour REAL NOT NULL DEFAULT 1.0,
    delivery_set TEXT NOT NULL DEFAULT 'macro',   -- 'macro' | 'micro'
    bag_volume_ml REAL NOT NULL DEFAULT 20.0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Sessions
-- ============================================================================

CREATE TABLE IF NOT EXISTS anesthesia_sessions (
    session_id TEXT PRIMARY KEY,
    animal_id TEXT REFERENCES animals(local_id) ON DELETE SET NULL,
    drug_id TEXT NOT NULL REFERENCES drugs(local_id),
    dose_used_ml REAL NOT NULL CHECK (dose_used_ml > 0),
    notes TEXT,
    infusion_config_id TEXT REFERENCES infusion_configs(local_id),
    performed_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_sessions_animal ON anesthesia_sessions(animal_id);
CREATE INDEX IF NOT EXISTS idx_sessions_performed ON anesthesia_sessions(performed_at);

CREATE TABLE IF NOT EXISTS walk_in_sessions (
    session_id TEXT PRIMARY KEY,
    species TEXT NOT NULL,
    animal_name TEXT NOT NULL,
    weight_kg REAL NOT NULL CHECK (weight_kg > 0),
    drug_id TEXT NOT NULL REFERENCES drugs(local_id),
    dose_used_ml REAL NOT NULL CHECK (dose_used_ml > 0),
    notes TEXT,
    performed_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_walk_in_performed ON walk_in_sessions(performed_at);

-- ============================================================================
-- Protocols
-- ============================================================================

CREATE TABLE IF NOT EXISTS protocols (
    protocol_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS protocol_drugs (
    protocol_id TEXT NOT NULL REFERENCES protocols(protocol_id) ON DELETE CASCADE,
    drug_id TEXT NOT NULL REFERENCES drugs(local_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    PRIMARY KEY (protocol_id, drug_id)
);

CREATE INDEX IF NOT EXISTS idx_protocol_drugs_position ON protocol_drugs(protocol_id, position);
"#;
