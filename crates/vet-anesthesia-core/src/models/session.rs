//! Anesthesia session models.

use serde::{Deserialize, Serialize};

use crate::calculator::{require_positive, CalcResult};

/// A session performed on a registered animal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnesthesiaSession {
    /// Local UUID
    pub session_id: String,
    /// Registered animal, if still on file
    pub animal_id: Option<String>,
    /// Drug administered
    pub drug_id: String,
    /// Volume administered in mL
    pub dose_used_ml: f64,
    /// Clinician notes
    pub notes: Option<String>,
    /// Fluid infusion used during the session
    pub infusion_config_id: Option<String>,
    /// When the session took place
    pub performed_at: String,
}

impl AnesthesiaSession {
    pub fn new(animal_id: Option<String>, drug_id: String, dose_used_ml: f64) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            animal_id,
            drug_id,
            dose_used_ml,
            notes: None,
            infusion_config_id: None,
            performed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_positive("dose_used_ml", self.dose_used_ml)?;
        Ok(())
    }
}

/// A session for an animal that is not registered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalkInSession {
    /// Local UUID
    pub session_id: String,
    /// Species as reported at the desk
    pub species: String,
    /// Animal name as reported at the desk
    pub animal_name: String,
    /// Weight in kg measured on arrival
    pub weight_kg: f64,
    /// Drug administered
    pub drug_id: String,
    /// Volume administered in mL
    pub dose_used_ml: f64,
    /// Clinician notes
    pub notes: Option<String>,
    /// When the session took place
    pub performed_at: String,
}

impl WalkInSession {
    pub fn new(
        species: String,
        animal_name: String,
        weight_kg: f64,
        drug_id: String,
        dose_used_ml: f64,
    ) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            species,
            animal_name,
            weight_kg,
            drug_id,
            dose_used_ml,
            notes: None,
            performed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_positive("weight_kg", self.weight_kg)?;
        require_positive("dose_used_ml", self.dose_used_ml)?;
        Ok(())
    }
}

/// Which table a session lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Registered,
    WalkIn,
}

/// One row of the combined session list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub kind: SessionKind,
    /// Animal name, suffixed for walk-ins; "N/A" when the animal is gone
    pub animal_label: String,
    /// Drug name; "N/A" when the drug is gone
    pub drug_label: String,
    pub dose_used_ml: f64,
    pub performed_at: String,
}
