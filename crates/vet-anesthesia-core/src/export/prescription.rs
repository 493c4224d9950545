//! Prescription export for a recorded session.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ExportError, ExportResult};
use crate::calculator::InfusionDuration;
use crate::db::Database;
use crate::models::{Drug, InfusionConfig, SessionKind};

const RULE_WIDTH: usize = 50;

/// Patient section of a prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSection {
    pub name: String,
    pub species: String,
    pub weight_kg: f64,
}

/// Drug section of a prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugSection {
    pub name: String,
    /// Reference dose with its unit (e.g., "4 mg/kg")
    pub dose: String,
    /// Concentration with its unit (e.g., "10 mg/mL")
    pub concentration: String,
}

/// Fluid infusion section of a prescription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfusionSection {
    pub bag_volume_ml: f64,
    pub delivery_set: String,
    pub flow_ml_per_hour: f64,
    pub drip_rate_per_minute: f64,
    pub duration_hours: f64,
    pub duration: InfusionDuration,
}

/// A printable prescription for one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub session_id: String,
    pub kind: SessionKind,
    /// `None` when the animal record no longer exists
    pub patient: Option<PatientSection>,
    /// `None` when the drug record no longer exists
    pub drug: Option<DrugSection>,
    pub administered_volume_ml: f64,
    pub infusion: Option<InfusionSection>,
    pub notes: Option<String>,
    pub performed_at: String,
    pub issued_at: String,
}

impl Prescription {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render as plain text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match self.kind {
            SessionKind::Registered => out.push_str(&format!(
                "ANESTHETIC PRESCRIPTION - Session {}\n",
                self.session_id
            )),
            SessionKind::WalkIn => out.push_str(&format!(
                "ANESTHETIC PRESCRIPTION - Walk-in Session {}\n",
                self.session_id
            )),
        }
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str(&format!("Date: {}\n", self.performed_at));

        out.push_str("\nPATIENT\n");
        match &self.patient {
            Some(patient) => {
                out.push_str(&format!("Name: {}\n", patient.name));
                out.push_str(&format!("Species: {}\n", patient.species));
                out.push_str(&format!("Weight: {} kg\n", patient.weight_kg));
            }
            None => out.push_str("Patient data not available\n"),
        }

        out.push_str("\nDRUG\n");
        match &self.drug {
            Some(drug) => {
                out.push_str(&format!("Medication: {}\n", drug.name));
                out.push_str(&format!("Dose: {}\n", drug.dose));
                out.push_str(&format!("Concentration: {}\n", drug.concentration));
            }
            None => out.push_str("Drug data not available\n"),
        }
        out.push_str(&format!(
            "Volume administered: {:.2} mL\n",
            self.administered_volume_ml
        ));

        if let Some(infusion) = &self.infusion {
            out.push_str("\nINFUSION\n");
            out.push_str(&format!("Bag volume: {} mL\n", infusion.bag_volume_ml));
            out.push_str(&format!("Delivery set: {}\n", infusion.delivery_set));
            out.push_str(&format!("Rate: {:.2} mL/h\n", infusion.flow_ml_per_hour));
            out.push_str(&format!("Drops/min: {:.2}\n", infusion.drip_rate_per_minute));
            out.push_str(&format!(
                "Estimated duration: {:.2} hours ({})\n",
                infusion.duration_hours, infusion.duration
            ));
        }

        if let Some(notes) = &self.notes {
            out.push_str("\nNOTES\n");
            out.push_str(notes);
            out.push('\n');
        }

        out
    }

    /// File name used when the prescription is saved.
    pub fn file_name(&self) -> String {
        format!("prescription_{}.txt", self.session_id)
    }

    /// Write the text rendering into `dir`, creating it if needed.
    pub fn write_to_dir(&self, dir: &Path) -> ExportResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, self.to_text())?;
        tracing::info!("Saved prescription to {:?}", path);
        Ok(path)
    }
}

/// Builds prescriptions from stored sessions.
pub struct PrescriptionExporter<'a> {
    db: &'a Database,
}

impl<'a> PrescriptionExporter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Build the prescription for a session, registered or walk-in.
    pub fn for_session(&self, session_id: &str) -> ExportResult<Prescription> {
        let issued_at = chrono::Utc::now().to_rfc3339();

        if let Some(session) = self.db.get_session(session_id)? {
            let patient = match &session.animal_id {
                Some(animal_id) => self.db.get_animal(animal_id)?.map(|a| PatientSection {
                    name: a.name,
                    species: a.species,
                    weight_kg: a.weight_kg,
                }),
                None => None,
            };
            let drug = self.db.get_drug(&session.drug_id)?.map(|d| drug_section(&d));
            let infusion = match &session.infusion_config_id {
                Some(config_id) => match self.db.get_infusion_config(config_id)? {
                    Some(config) => Some(infusion_section(&config)?),
                    None => None,
                },
                None => None,
            };

            return Ok(Prescription {
                session_id: session.session_id,
                kind: SessionKind::Registered,
                patient,
                drug,
                administered_volume_ml: session.dose_used_ml,
                infusion,
                notes: session.notes,
                performed_at: session.performed_at,
                issued_at,
            });
        }

        if let Some(session) = self.db.get_walk_in_session(session_id)? {
            let drug = self.db.get_drug(&session.drug_id)?.map(|d| drug_section(&d));
            return Ok(Prescription {
                session_id: session.session_id,
                kind: SessionKind::WalkIn,
                patient: Some(PatientSection {
                    name: session.animal_name,
                    species: session.species,
                    weight_kg: session.weight_kg,
                }),
                drug,
                administered_volume_ml: session.dose_used_ml,
                infusion: None,
                notes: session.notes,
                performed_at: session.performed_at,
                issued_at,
            });
        }

        Err(ExportError::SessionNotFound(session_id.to_string()))
    }
}

fn drug_section(drug: &Drug) -> DrugSection {
    DrugSection {
        name: drug.name.clone(),
        dose: format!("{} {}", drug.dose, drug.dose_unit),
        concentration: drug.concentration.to_string(),
    }
}

fn infusion_section(config: &InfusionConfig) -> ExportResult<InfusionSection> {
    let plan = config.plan()?;
    // The hours/minutes display comes from the exact duration
    let rounded = plan.rounded();
    Ok(InfusionSection {
        bag_volume_ml: rounded.bag_volume_ml,
        delivery_set: rounded.delivery_set.to_string(),
        flow_ml_per_hour: rounded.flow_ml_per_hour,
        drip_rate_per_minute: rounded.drip_rate_per_minute,
        duration_hours: rounded.duration_hours,
        duration: plan.duration(),
    })
}
