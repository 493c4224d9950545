//! Session planner.
//!
//! Pipeline: Records → Dose Plan → Session (+ Infusion Config)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculator::{plan_infusion, CalcError, InfusionPlan};
use crate::db::{Database, DbError};
use crate::models::{AnesthesiaSession, Drug, InfusionConfig, InfusionSettings, WalkInSession};

/// Planner errors.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Calculation error: {0}")]
    Calculation(#[from] CalcError),

    #[error("Animal not found: {0}")]
    AnimalNotFound(String),

    #[error("Drug not found: {0}")]
    DrugNotFound(String),

    #[error("Drug {0} is a continuous infusion; the administered volume must be given")]
    DoseRequired(String),
}

pub type PlannerResult<T> = Result<T, PlannerError>;

/// What to give an animal of a given weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DosePlan {
    /// Single injection of `volume_ml`
    Bolus { volume_ml: f64 },
    /// Drug constant-rate infusion, delivered from the configured bag
    ContinuousInfusion { plan: InfusionPlan },
}

/// Options for registering a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRequest {
    /// Volume actually given; defaults to the computed bolus volume
    pub dose_used_ml: Option<f64>,
    pub notes: Option<String>,
}

/// A session for an animal that is not on file.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkInRequest {
    pub species: String,
    pub animal_name: String,
    pub weight_kg: f64,
    pub drug_id: String,
    /// Volume actually given; defaults to the computed bolus volume
    pub dose_used_ml: Option<f64>,
    pub notes: Option<String>,
}

/// Plans doses and records sessions against the store.
pub struct SessionPlanner<'a> {
    db: &'a Database,
    settings: InfusionSettings,
}

impl<'a> SessionPlanner<'a> {
    /// Create a planner with default infusion settings.
    pub fn new(db: &'a Database) -> Self {
        Self::with_settings(db, InfusionSettings::default())
    }

    pub fn with_settings(db: &'a Database, settings: InfusionSettings) -> Self {
        Self { db, settings }
    }

    pub fn settings(&self) -> &InfusionSettings {
        &self.settings
    }

    /// Plan a dose of a stored drug for a stored animal.
    pub fn plan_dose(&self, animal_id: &str, drug_id: &str) -> PlannerResult<DosePlan> {
        let animal = self
            .db
            .get_animal(animal_id)?
            .ok_or_else(|| PlannerError::AnimalNotFound(animal_id.to_string()))?;
        let drug = self.load_drug(drug_id)?;
        self.plan_for_weight(animal.weight_kg, &drug)
    }

    /// Plan a dose of `drug` for an animal of `weight_kg`.
    pub fn plan_for_weight(&self, weight_kg: f64, drug: &Drug) -> PlannerResult<DosePlan> {
        drug.validate()?;
        let plan = if drug.is_continuous() {
            let flow = drug.infusion_rate_ml_per_hour(weight_kg)?;
            DosePlan::ContinuousInfusion {
                plan: plan_infusion(self.settings.bag_volume_ml, flow, self.settings.delivery_set)?,
            }
        } else {
            DosePlan::Bolus {
                volume_ml: drug.bolus_volume_ml(weight_kg)?,
            }
        };
        tracing::debug!(drug = %drug.name, weight_kg, ?plan, "Planned dose");
        Ok(plan)
    }

    /// Record a session for a registered animal.
    ///
    /// A continuous-infusion drug also stores a fluid infusion config for
    /// the animal's weight, built from the planner settings.
    pub fn register_session(
        &self,
        animal_id: &str,
        drug_id: &str,
        request: SessionRequest,
    ) -> PlannerResult<AnesthesiaSession> {
        let animal = self
            .db
            .get_animal(animal_id)?
            .ok_or_else(|| PlannerError::AnimalNotFound(animal_id.to_string()))?;
        animal.validate()?;
        let drug = self.load_drug(drug_id)?;

        let dose_used_ml = self.resolve_dose(animal.weight_kg, &drug, request.dose_used_ml)?;

        let mut session =
            AnesthesiaSession::new(Some(animal.local_id), drug.local_id.clone(), dose_used_ml);
        session.notes = request.notes;
        session.validate()?;

        let tx = self.db.unchecked_transaction()?;
        if drug.is_continuous() {
            let config = InfusionConfig::with_settings(animal.weight_kg, &self.settings);
            config.validate()?;
            self.db.insert_infusion_config(&config)?;
            session.infusion_config_id = Some(config.local_id);
        }
        self.db.insert_session(&session)?;
        tx.commit().map_err(DbError::from)?;

        tracing::info!(
            "Registered session {} ({} mL of {})",
            session.session_id,
            dose_used_ml,
            drug.name
        );
        Ok(session)
    }

    /// Record a session for an unregistered animal.
    pub fn register_walk_in(&self, request: WalkInRequest) -> PlannerResult<WalkInSession> {
        let drug = self.load_drug(&request.drug_id)?;
        let dose_used_ml = self.resolve_dose(request.weight_kg, &drug, request.dose_used_ml)?;

        let mut session = WalkInSession::new(
            request.species,
            request.animal_name,
            request.weight_kg,
            drug.local_id,
            dose_used_ml,
        );
        session.notes = request.notes;
        session.validate()?;
        self.db.insert_walk_in_session(&session)?;

        tracing::info!(
            "Registered walk-in session {} for {}",
            session.session_id,
            session.animal_name
        );
        Ok(session)
    }

    fn load_drug(&self, drug_id: &str) -> PlannerResult<Drug> {
        self.db
            .get_drug(drug_id)?
            .ok_or_else(|| PlannerError::DrugNotFound(drug_id.to_string()))
    }

    /// The volume given: the caller's figure, or the computed bolus.
    fn resolve_dose(
        &self,
        weight_kg: f64,
        drug: &Drug,
        dose_used_ml: Option<f64>,
    ) -> PlannerResult<f64> {
        match dose_used_ml {
            Some(volume) => Ok(volume),
            None if drug.is_continuous() => Err(PlannerError::DoseRequired(drug.name.clone())),
            None => Ok(drug.bolus_volume_ml(weight_kg)?),
        }
    }
}
