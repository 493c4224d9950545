//! Vet-Anesthesia Core Library
//!
//! Local-first veterinary anesthesia dose and infusion-rate calculator
//! with a SQLite record store.
//!
//! # Architecture
//!
//! ```text
//! Animal (weight) ──┐
//!                   ├──► Dose Calculator ──► Dose Plan
//! Drug (dose, unit, ┘    (canonical units:     │
//!  concentration)         µg/kg/h over µg/mL)  │
//!                                              ▼
//!                                  Session (+ Infusion Config)
//!                                              │
//!                                              ▼
//!                                    Prescription Export
//! ```
//!
//! # Modules
//!
//! - [`calculator`]: Pure dose, flow, drip-rate, duration and reservoir formulas
//! - [`db`]: SQLite record store for animals, drugs, sessions and protocols
//! - [`models`]: Domain types (Animal, Drug, InfusionConfig, sessions, protocols)
//! - [`planner`]: Wires stored records to the calculator
//! - [`export`]: Prescription rendering
//! - [`config`]: TOML configuration
//! - [`logging`]: Tracing setup

pub mod calculator;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod models;
pub mod planner;

// Re-export commonly used types
pub use calculator::{
    CalcError, Concentration, ConcentrationUnit, DeliverySet, DoseUnit, InfusionDuration,
    InfusionPlan, ReservoirPreparation,
};
pub use config::Config;
pub use db::Database;
pub use export::{Prescription, PrescriptionExporter};
pub use models::{
    AdministrationMode, Animal, AnesthesiaSession, Drug, InfusionConfig, InfusionSettings,
    Protocol, ProtocolStep, SessionKind, SessionSummary, WalkInSession,
};
pub use planner::{DosePlan, SessionPlanner, SessionRequest, WalkInRequest};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum AnesthesiaError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Division guard: {0}")]
    DivisionGuard(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<CalcError> for AnesthesiaError {
    fn from(e: CalcError) -> Self {
        match e {
            CalcError::InvalidInput { .. } => AnesthesiaError::InvalidInput(e.to_string()),
            CalcError::CapacityExceeded { .. } => AnesthesiaError::CapacityExceeded(e.to_string()),
            CalcError::DivisionGuard { .. } => AnesthesiaError::DivisionGuard(e.to_string()),
        }
    }
}

impl From<db::DbError> for AnesthesiaError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => AnesthesiaError::NotFound(what),
            other => AnesthesiaError::DatabaseError(other.to_string()),
        }
    }
}

impl From<planner::PlannerError> for AnesthesiaError {
    fn from(e: planner::PlannerError) -> Self {
        use planner::PlannerError;
        match e {
            PlannerError::Database(e) => e.into(),
            PlannerError::Calculation(e) => e.into(),
            PlannerError::AnimalNotFound(id) => AnesthesiaError::NotFound(format!("animal {}", id)),
            PlannerError::DrugNotFound(id) => AnesthesiaError::NotFound(format!("drug {}", id)),
            PlannerError::DoseRequired(_) => AnesthesiaError::InvalidInput(e.to_string()),
        }
    }
}

impl From<export::ExportError> for AnesthesiaError {
    fn from(e: export::ExportError) -> Self {
        use export::ExportError;
        match e {
            ExportError::Database(e) => e.into(),
            ExportError::Calculation(e) => e.into(),
            ExportError::Json(e) => e.into(),
            ExportError::SessionNotFound(id) => {
                AnesthesiaError::NotFound(format!("session {}", id))
            }
            ExportError::Io(e) => AnesthesiaError::IoError(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for AnesthesiaError {
    fn from(e: serde_json::Error) -> Self {
        AnesthesiaError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for AnesthesiaError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        AnesthesiaError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Calculator Functions (exported to FFI)
// =========================================================================

/// Bolus volume (mL); dose and concentration share a mass unit.
#[uniffi::export]
pub fn compute_bolus_dose(
    weight_kg: f64,
    dose: f64,
    concentration: f64,
) -> Result<f64, AnesthesiaError> {
    Ok(calculator::compute_bolus_dose(weight_kg, dose, concentration)?)
}

/// Bolus volume (mL) with explicit units, e.g. "mg/kg" over "mg/mL".
#[uniffi::export]
pub fn compute_bolus_volume(
    weight_kg: f64,
    dose: f64,
    dose_unit: String,
    concentration: f64,
    concentration_unit: String,
) -> Result<f64, AnesthesiaError> {
    let dose_unit: DoseUnit = dose_unit.parse()?;
    let concentration = Concentration::new(concentration, concentration_unit.parse()?);
    Ok(calculator::compute_bolus_volume(
        weight_kg,
        dose,
        dose_unit,
        concentration,
    )?)
}

/// Drug CRI flow rate (mL/h), e.g. "µg/kg/min" over "mg/mL".
#[uniffi::export]
pub fn compute_continuous_infusion_rate(
    weight_kg: f64,
    dose: f64,
    dose_unit: String,
    concentration: f64,
    concentration_unit: String,
) -> Result<f64, AnesthesiaError> {
    let dose_unit: DoseUnit = dose_unit.parse()?;
    let concentration = Concentration::new(concentration, concentration_unit.parse()?);
    Ok(calculator::compute_continuous_infusion_rate(
        weight_kg,
        dose,
        dose_unit,
        concentration,
    )?)
}

/// Fluid flow rate (mL/h) from a per-kilogram rate.
#[uniffi::export]
pub fn compute_fluid_rate(
    weight_kg: f64,
    rate_ml_per_kg_per_hour: f64,
) -> Result<f64, AnesthesiaError> {
    Ok(calculator::compute_fluid_rate(
        weight_kg,
        rate_ml_per_kg_per_hour,
    )?)
}

/// Drops per minute; `delivery_set` is "macro" or "micro".
#[uniffi::export]
pub fn compute_drip_rate(
    flow_ml_per_hour: f64,
    delivery_set: String,
) -> Result<f64, AnesthesiaError> {
    let delivery_set: DeliverySet = delivery_set.parse()?;
    Ok(calculator::compute_drip_rate(
        flow_ml_per_hour,
        delivery_set,
    ))
}

/// Hours until the bag is empty.
#[uniffi::export]
pub fn compute_infusion_duration(
    bag_volume_ml: f64,
    flow_ml_per_hour: f64,
) -> Result<f64, AnesthesiaError> {
    Ok(calculator::compute_infusion_duration(
        bag_volume_ml,
        flow_ml_per_hour,
    )?)
}

/// Render a duration in hours as "H h MM min".
#[uniffi::export]
pub fn format_infusion_duration(duration_hours: f64) -> String {
    InfusionDuration::from_hours(duration_hours).to_string()
}

/// Drug and diluent volumes for a prepared reservoir.
#[uniffi::export]
pub fn compute_drug_volume_for_reservoir(
    dose: f64,
    weight_kg: f64,
    reservoir_volume_ml: f64,
    concentration: f64,
) -> Result<FfiReservoirPreparation, AnesthesiaError> {
    let preparation = calculator::compute_drug_volume_for_reservoir(
        dose,
        weight_kg,
        reservoir_volume_ml,
        concentration,
    )?;
    Ok(preparation.into())
}

/// Flow, drip rate and duration for one bag, rounded for display.
#[uniffi::export]
pub fn plan_infusion(
    bag_volume_ml: f64,
    flow_ml_per_hour: f64,
    delivery_set: String,
) -> Result<FfiInfusionPlan, AnesthesiaError> {
    let delivery_set: DeliverySet = delivery_set.parse()?;
    let plan = calculator::plan_infusion(bag_volume_ml, flow_ml_per_hour, delivery_set)?;
    Ok(plan.into())
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<AnesthesiaCore>, AnesthesiaError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(AnesthesiaCore::new(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<AnesthesiaCore>, AnesthesiaError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(AnesthesiaCore::new(db)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct AnesthesiaCore {
    db: Arc<Mutex<Database>>,
    settings: Mutex<InfusionSettings>,
}

impl AnesthesiaCore {
    fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            settings: Mutex::new(InfusionSettings::default()),
        }
    }

    fn current_settings(&self) -> Result<InfusionSettings, AnesthesiaError> {
        Ok(*self.settings.lock()?)
    }
}

#[uniffi::export]
impl AnesthesiaCore {
    // =========================================================================
    // Infusion Defaults
    // =========================================================================

    /// Replace the defaults used for new infusion configurations.
    pub fn set_infusion_defaults(
        &self,
        rate_ml_per_kg_per_hour: f64,
        delivery_set: String,
        bag_volume_ml: f64,
    ) -> Result<(), AnesthesiaError> {
        let settings = InfusionSettings {
            rate_ml_per_kg_per_hour,
            delivery_set: delivery_set.parse()?,
            bag_volume_ml,
        };
        settings.validate()?;
        *self.settings.lock()? = settings;
        Ok(())
    }

    // =========================================================================
    // Animal Operations
    // =========================================================================

    /// Register a new animal.
    pub fn create_animal(
        &self,
        name: String,
        species: String,
        weight_kg: f64,
        breed: Option<String>,
        age_years: Option<u32>,
    ) -> Result<FfiAnimal, AnesthesiaError> {
        let db = self.db.lock()?;
        let mut animal = Animal::new(name, species, weight_kg);
        animal.breed = breed;
        animal.age_years = age_years;
        animal.validate()?;
        db.insert_animal(&animal)?;
        Ok(animal.into())
    }

    /// Get an animal by local ID.
    pub fn get_animal(&self, local_id: String) -> Result<Option<FfiAnimal>, AnesthesiaError> {
        let db = self.db.lock()?;
        let animal = db.get_animal(&local_id)?;
        Ok(animal.map(|a| a.into()))
    }

    /// List animals by name.
    pub fn list_animals(&self) -> Result<Vec<FfiAnimal>, AnesthesiaError> {
        let db = self.db.lock()?;
        let animals = db.list_animals()?;
        Ok(animals.into_iter().map(|a| a.into()).collect())
    }

    /// Update an animal. Returns false if it does not exist.
    pub fn update_animal(&self, animal: FfiAnimal) -> Result<bool, AnesthesiaError> {
        let db = self.db.lock()?;
        let Some(mut existing) = db.get_animal(&animal.local_id)? else {
            return Ok(false);
        };
        existing.name = animal.name;
        existing.species = animal.species;
        existing.breed = animal.breed;
        existing.age_years = animal.age_years;
        existing.weight_kg = animal.weight_kg;
        existing.updated_at = chrono::Utc::now().to_rfc3339();
        existing.validate()?;
        Ok(db.update_animal(&existing)?)
    }

    /// Delete an animal; its sessions stay on file without it.
    pub fn delete_animal(&self, local_id: String) -> Result<bool, AnesthesiaError> {
        let db = self.db.lock()?;
        Ok(db.delete_animal(&local_id)?)
    }

    // =========================================================================
    // Drug Operations
    // =========================================================================

    /// Add a drug to the formulary.
    pub fn create_drug(
        &self,
        name: String,
        dose: f64,
        dose_unit: String,
        concentration: f64,
        concentration_unit: String,
        mode: String,
    ) -> Result<FfiDrug, AnesthesiaError> {
        let db = self.db.lock()?;
        let drug = Drug::new(
            name,
            dose,
            dose_unit.parse()?,
            Concentration::new(concentration, concentration_unit.parse()?),
            mode.parse()?,
        );
        drug.validate()?;
        db.insert_drug(&drug)?;
        Ok(drug.into())
    }

    /// Get a drug by local ID.
    pub fn get_drug(&self, local_id: String) -> Result<Option<FfiDrug>, AnesthesiaError> {
        let db = self.db.lock()?;
        let drug = db.get_drug(&local_id)?;
        Ok(drug.map(|d| d.into()))
    }

    /// List the formulary by name.
    pub fn list_drugs(&self) -> Result<Vec<FfiDrug>, AnesthesiaError> {
        let db = self.db.lock()?;
        let drugs = db.list_drugs()?;
        Ok(drugs.into_iter().map(|d| d.into()).collect())
    }

    /// Search the formulary by name, tolerating typos.
    pub fn search_drugs(&self, query: String, limit: u32) -> Result<Vec<FfiDrug>, AnesthesiaError> {
        let db = self.db.lock()?;
        let drugs = db.search_drugs(&query, limit as usize)?;
        Ok(drugs.into_iter().map(|d| d.into()).collect())
    }

    /// Update a drug. Returns false if it does not exist.
    pub fn update_drug(&self, drug: FfiDrug) -> Result<bool, AnesthesiaError> {
        let db = self.db.lock()?;
        let Some(mut existing) = db.get_drug(&drug.local_id)? else {
            return Ok(false);
        };
        existing.name = drug.name;
        existing.dose = drug.dose;
        existing.dose_unit = drug.dose_unit.parse()?;
        existing.concentration =
            Concentration::new(drug.concentration, drug.concentration_unit.parse()?);
        existing.mode = drug.mode.parse()?;
        existing.route = drug.route;
        existing.syringe_volume_ml = drug.syringe_volume_ml;
        existing.comment = drug.comment;
        existing.updated_at = chrono::Utc::now().to_rfc3339();
        existing.validate()?;
        Ok(db.update_drug(&existing)?)
    }

    /// Delete a drug.
    pub fn delete_drug(&self, local_id: String) -> Result<bool, AnesthesiaError> {
        let db = self.db.lock()?;
        Ok(db.delete_drug(&local_id)?)
    }

    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Plan a dose of a stored drug for a stored animal.
    pub fn plan_dose(
        &self,
        animal_id: String,
        drug_id: String,
    ) -> Result<FfiDosePlan, AnesthesiaError> {
        let settings = self.current_settings()?;
        let db = self.db.lock()?;
        let planner = SessionPlanner::with_settings(&db, settings);
        Ok(planner.plan_dose(&animal_id, &drug_id)?.into())
    }

    /// Record a session for a registered animal.
    pub fn register_session(
        &self,
        animal_id: String,
        drug_id: String,
        dose_used_ml: Option<f64>,
        notes: Option<String>,
    ) -> Result<FfiSession, AnesthesiaError> {
        let settings = self.current_settings()?;
        let db = self.db.lock()?;
        let planner = SessionPlanner::with_settings(&db, settings);
        let session = planner.register_session(
            &animal_id,
            &drug_id,
            SessionRequest {
                dose_used_ml,
                notes,
            },
        )?;
        Ok(session.into())
    }

    /// Record a session for an animal that is not registered.
    pub fn register_walk_in(
        &self,
        species: String,
        animal_name: String,
        weight_kg: f64,
        drug_id: String,
        dose_used_ml: Option<f64>,
        notes: Option<String>,
    ) -> Result<FfiSession, AnesthesiaError> {
        let db = self.db.lock()?;
        let planner = SessionPlanner::new(&db);
        let session = planner.register_walk_in(WalkInRequest {
            species,
            animal_name,
            weight_kg,
            drug_id,
            dose_used_ml,
            notes,
        })?;
        Ok(session.into())
    }

    /// All sessions, registered and walk-in, newest first.
    pub fn list_sessions(&self) -> Result<Vec<FfiSessionSummary>, AnesthesiaError> {
        let db = self.db.lock()?;
        let summaries = db.list_session_summaries()?;
        Ok(summaries.into_iter().map(|s| s.into()).collect())
    }

    // =========================================================================
    // Protocol Operations
    // =========================================================================

    /// Create a protocol; unknown drug IDs are skipped.
    pub fn create_protocol(
        &self,
        name: String,
        description: Option<String>,
        drug_ids: Vec<String>,
    ) -> Result<FfiProtocol, AnesthesiaError> {
        let mut db = self.db.lock()?;
        let protocol = db.create_protocol(&name, description.as_deref(), &drug_ids)?;
        Ok(protocol.into())
    }

    pub fn list_protocols(&self) -> Result<Vec<FfiProtocol>, AnesthesiaError> {
        let db = self.db.lock()?;
        let protocols = db.list_protocols()?;
        Ok(protocols.into_iter().map(|p| p.into()).collect())
    }

    /// Drugs of a protocol in order.
    pub fn protocol_steps(
        &self,
        protocol_id: String,
    ) -> Result<Vec<FfiProtocolStep>, AnesthesiaError> {
        let db = self.db.lock()?;
        let steps = db.protocol_steps(&protocol_id)?;
        Ok(steps.into_iter().map(|s| s.into()).collect())
    }

    /// Add a drug to a protocol, after the last one unless a position is given.
    pub fn add_drug_to_protocol(
        &self,
        protocol_id: String,
        drug_id: String,
        position: Option<u32>,
    ) -> Result<u32, AnesthesiaError> {
        let db = self.db.lock()?;
        let link = db.add_drug_to_protocol(&protocol_id, &drug_id, position)?;
        Ok(link.position)
    }

    pub fn remove_drug_from_protocol(
        &self,
        protocol_id: String,
        drug_id: String,
    ) -> Result<bool, AnesthesiaError> {
        let db = self.db.lock()?;
        Ok(db.remove_drug_from_protocol(&protocol_id, &drug_id)?)
    }

    pub fn delete_protocol(&self, protocol_id: String) -> Result<bool, AnesthesiaError> {
        let db = self.db.lock()?;
        Ok(db.delete_protocol(&protocol_id)?)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Prescription for a session as plain text.
    pub fn prescription_text(&self, session_id: String) -> Result<String, AnesthesiaError> {
        let db = self.db.lock()?;
        let prescription = PrescriptionExporter::new(&db).for_session(&session_id)?;
        Ok(prescription.to_text())
    }

    /// Prescription for a session as JSON.
    pub fn prescription_json(&self, session_id: String) -> Result<String, AnesthesiaError> {
        let db = self.db.lock()?;
        let prescription = PrescriptionExporter::new(&db).for_session(&session_id)?;
        Ok(prescription.to_json()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe animal.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimal {
    pub local_id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age_years: Option<u32>,
    pub weight_kg: f64,
}

impl From<Animal> for FfiAnimal {
    fn from(animal: Animal) -> Self {
        Self {
            local_id: animal.local_id,
            name: animal.name,
            species: animal.species,
            breed: animal.breed,
            age_years: animal.age_years,
            weight_kg: animal.weight_kg,
        }
    }
}

/// FFI-safe drug. Units and mode travel as their labels.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDrug {
    pub local_id: String,
    pub name: String,
    pub dose: f64,
    pub dose_unit: String,
    pub concentration: f64,
    pub concentration_unit: String,
    pub mode: String,
    pub route: Option<String>,
    pub syringe_volume_ml: Option<f64>,
    pub comment: Option<String>,
}

impl From<Drug> for FfiDrug {
    fn from(drug: Drug) -> Self {
        Self {
            local_id: drug.local_id,
            name: drug.name,
            dose: drug.dose,
            dose_unit: drug.dose_unit.to_string(),
            concentration: drug.concentration.value,
            concentration_unit: drug.concentration.unit.to_string(),
            mode: drug.mode.to_string(),
            route: drug.route,
            syringe_volume_ml: drug.syringe_volume_ml,
            comment: drug.comment,
        }
    }
}

/// FFI-safe infusion plan, rounded to two decimals.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInfusionPlan {
    pub bag_volume_ml: f64,
    pub delivery_set: String,
    pub flow_ml_per_hour: f64,
    pub drip_rate_per_minute: f64,
    pub duration_hours: f64,
    /// e.g. "16 h 08 min"
    pub duration_display: String,
}

impl From<InfusionPlan> for FfiInfusionPlan {
    fn from(plan: InfusionPlan) -> Self {
        let rounded = plan.rounded();
        Self {
            bag_volume_ml: rounded.bag_volume_ml,
            delivery_set: rounded.delivery_set.as_str().to_string(),
            flow_ml_per_hour: rounded.flow_ml_per_hour,
            drip_rate_per_minute: rounded.drip_rate_per_minute,
            duration_hours: rounded.duration_hours,
            duration_display: plan.duration().to_string(),
        }
    }
}

/// FFI-safe reservoir preparation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReservoirPreparation {
    pub drug_volume_ml: f64,
    pub diluent_volume_ml: f64,
    pub reservoir_volume_ml: f64,
}

impl From<ReservoirPreparation> for FfiReservoirPreparation {
    fn from(preparation: ReservoirPreparation) -> Self {
        Self {
            drug_volume_ml: preparation.drug_volume_ml,
            diluent_volume_ml: preparation.diluent_volume_ml,
            reservoir_volume_ml: preparation.reservoir_volume_ml,
        }
    }
}

/// FFI-safe dose plan.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDosePlan {
    /// "bolus" or "continuous_infusion"
    pub mode: String,
    pub bolus_volume_ml: Option<f64>,
    pub infusion: Option<FfiInfusionPlan>,
}

impl From<DosePlan> for FfiDosePlan {
    fn from(plan: DosePlan) -> Self {
        match plan {
            DosePlan::Bolus { volume_ml } => Self {
                mode: AdministrationMode::Bolus.to_string(),
                bolus_volume_ml: Some(calculator::round2(volume_ml)),
                infusion: None,
            },
            DosePlan::ContinuousInfusion { plan } => Self {
                mode: AdministrationMode::ContinuousInfusion.to_string(),
                bolus_volume_ml: None,
                infusion: Some(plan.into()),
            },
        }
    }
}

/// FFI-safe session, registered or walk-in.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub session_id: String,
    /// "registered" or "walk_in"
    pub kind: String,
    pub animal_id: Option<String>,
    /// Set for walk-ins only
    pub animal_name: Option<String>,
    pub drug_id: String,
    pub dose_used_ml: f64,
    pub notes: Option<String>,
    pub infusion_config_id: Option<String>,
    pub performed_at: String,
}

impl From<AnesthesiaSession> for FfiSession {
    fn from(session: AnesthesiaSession) -> Self {
        Self {
            session_id: session.session_id,
            kind: session_kind_label(SessionKind::Registered).to_string(),
            animal_id: session.animal_id,
            animal_name: None,
            drug_id: session.drug_id,
            dose_used_ml: session.dose_used_ml,
            notes: session.notes,
            infusion_config_id: session.infusion_config_id,
            performed_at: session.performed_at,
        }
    }
}

impl From<WalkInSession> for FfiSession {
    fn from(session: WalkInSession) -> Self {
        Self {
            session_id: session.session_id,
            kind: session_kind_label(SessionKind::WalkIn).to_string(),
            animal_id: None,
            animal_name: Some(session.animal_name),
            drug_id: session.drug_id,
            dose_used_ml: session.dose_used_ml,
            notes: session.notes,
            infusion_config_id: None,
            performed_at: session.performed_at,
        }
    }
}

/// FFI-safe row of the session list.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSessionSummary {
    pub session_id: String,
    pub kind: String,
    pub animal_label: String,
    pub drug_label: String,
    pub dose_used_ml: f64,
    pub performed_at: String,
}

impl From<SessionSummary> for FfiSessionSummary {
    fn from(summary: SessionSummary) -> Self {
        Self {
            session_id: summary.session_id,
            kind: session_kind_label(summary.kind).to_string(),
            animal_label: summary.animal_label,
            drug_label: summary.drug_label,
            dose_used_ml: summary.dose_used_ml,
            performed_at: summary.performed_at,
        }
    }
}

fn session_kind_label(kind: SessionKind) -> &'static str {
    match kind {
        SessionKind::Registered => "registered",
        SessionKind::WalkIn => "walk_in",
    }
}

/// FFI-safe protocol.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProtocol {
    pub protocol_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
}

impl From<Protocol> for FfiProtocol {
    fn from(protocol: Protocol) -> Self {
        Self {
            protocol_id: protocol.protocol_id,
            name: protocol.name,
            description: protocol.description,
            created_at: protocol.created_at,
        }
    }
}

/// FFI-safe protocol step.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProtocolStep {
    pub position: u32,
    pub drug: FfiDrug,
}

impl From<ProtocolStep> for FfiProtocolStep {
    fn from(step: ProtocolStep) -> Self {
        Self {
            position: step.position,
            drug: step.drug.into(),
        }
    }
}
