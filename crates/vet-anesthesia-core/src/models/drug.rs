//! Drug formulary models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calculator::{
    compute_bolus_volume, compute_continuous_infusion_rate, require_non_negative,
    require_positive, CalcError, CalcResult, Concentration, DoseUnit,
};

/// How a drug is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdministrationMode {
    /// Single immediate dose
    Bolus,
    /// Steady flow over time
    ContinuousInfusion,
}

impl AdministrationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdministrationMode::Bolus => "bolus",
            AdministrationMode::ContinuousInfusion => "continuous_infusion",
        }
    }
}

impl fmt::Display for AdministrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdministrationMode {
    type Err = CalcError;

    fn from_str(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "bolus" => Ok(AdministrationMode::Bolus),
            "continuous_infusion" | "continuous" | "infusion" | "cri" => {
                Ok(AdministrationMode::ContinuousInfusion)
            }
            _ => Err(CalcError::invalid(
                "administration_mode",
                format!("unknown administration mode '{}'", s),
            )),
        }
    }
}

/// A drug in the local formulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Drug {
    /// Local UUID
    pub local_id: String,
    /// Drug name
    pub name: String,
    /// Reference dose, in `dose_unit`
    pub dose: f64,
    /// Unit of the reference dose (e.g., mg/kg, µg/kg/min)
    pub dose_unit: DoseUnit,
    /// Stock concentration
    pub concentration: Concentration,
    /// Bolus or continuous infusion
    pub mode: AdministrationMode,
    /// Route of administration (e.g., "IV", "IM")
    pub route: Option<String>,
    /// Syringe volume the drug is usually prepared in
    pub syringe_volume_ml: Option<f64>,
    /// Free-text comment
    pub comment: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Drug {
    /// Create a new drug with required fields.
    pub fn new(
        name: String,
        dose: f64,
        dose_unit: DoseUnit,
        concentration: Concentration,
        mode: AdministrationMode,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            name,
            dose,
            dose_unit,
            concentration,
            mode,
            route: None,
            syringe_volume_ml: None,
            comment: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check the formulary invariants: concentration > 0, dose ≥ 0, and a
    /// dose unit that fits the administration mode.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("concentration", self.concentration.value)?;
        require_non_negative("dose", self.dose)?;
        if let Some(volume) = self.syringe_volume_ml {
            require_positive("syringe_volume_ml", volume)?;
        }
        match (self.mode, self.dose_unit.is_rate()) {
            (AdministrationMode::Bolus, true) => Err(CalcError::invalid(
                "dose_unit",
                format!(
                    "{} is a rate; a bolus drug needs a per-weight dose",
                    self.dose_unit
                ),
            )),
            (AdministrationMode::ContinuousInfusion, false) => Err(CalcError::invalid(
                "dose_unit",
                format!(
                    "{} has no time basis; an infusion drug needs a rate",
                    self.dose_unit
                ),
            )),
            _ => Ok(()),
        }
    }

    pub fn is_continuous(&self) -> bool {
        self.mode == AdministrationMode::ContinuousInfusion
    }

    /// Bolus volume (mL) for an animal of the given weight.
    pub fn bolus_volume_ml(&self, weight_kg: f64) -> CalcResult<f64> {
        compute_bolus_volume(weight_kg, self.dose, self.dose_unit, self.concentration)
    }

    /// Constant-rate infusion flow (mL/h) for an animal of the given weight.
    pub fn infusion_rate_ml_per_hour(&self, weight_kg: f64) -> CalcResult<f64> {
        compute_continuous_infusion_rate(weight_kg, self.dose, self.dose_unit, self.concentration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propofol() -> Drug {
        Drug::new(
            "Propofol".into(),
            4.0,
            DoseUnit::MG_PER_KG,
            Concentration::mg_per_ml(10.0),
            AdministrationMode::Bolus,
        )
    }

    fn remifentanil() -> Drug {
        Drug::new(
            "Remifentanil".into(),
            5.0,
            DoseUnit::UG_PER_KG_PER_HOUR,
            Concentration::mg_per_ml(0.5),
            AdministrationMode::ContinuousInfusion,
        )
    }

    #[test]
    fn test_bolus_volume() {
        let volume = propofol().bolus_volume_ml(10.0).unwrap();
        assert!((volume - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_infusion_rate() {
        let drug = remifentanil();
        assert!(drug.is_continuous());
        let flow = drug.infusion_rate_ml_per_hour(10.0).unwrap();
        assert!((flow - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_validate() {
        assert!(propofol().validate().is_ok());

        let mut drug = propofol();
        drug.concentration = Concentration::mg_per_ml(0.0);
        assert!(drug.validate().is_err());

        let mut drug = propofol();
        drug.dose = -1.0;
        assert!(drug.validate().is_err());

        let mut drug = propofol();
        drug.syringe_volume_ml = Some(0.0);
        assert!(drug.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unit_mode_mismatch() {
        assert!(remifentanil().validate().is_ok());

        let mut drug = propofol();
        drug.dose_unit = DoseUnit::MG_PER_KG_PER_MIN;
        assert!(matches!(
            drug.validate(),
            Err(CalcError::InvalidInput { field: "dose_unit", .. })
        ));

        let mut drug = remifentanil();
        drug.dose_unit = DoseUnit::UG_PER_KG;
        assert!(matches!(
            drug.validate(),
            Err(CalcError::InvalidInput { field: "dose_unit", .. })
        ));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            "bolus".parse::<AdministrationMode>().unwrap(),
            AdministrationMode::Bolus
        );
        assert_eq!(
            "Continuous Infusion".parse::<AdministrationMode>().unwrap(),
            AdministrationMode::ContinuousInfusion
        );
        assert_eq!(
            "CRI".parse::<AdministrationMode>().unwrap(),
            AdministrationMode::ContinuousInfusion
        );
        assert!("drip".parse::<AdministrationMode>().is_err());
    }

    #[test]
    fn test_drug_json_round_trip() {
        let drug = remifentanil();
        let json = serde_json::to_string(&drug).unwrap();
        assert!(json.contains("\"µg/kg/h\""));
        let back: Drug = serde_json::from_str(&json).unwrap();
        assert_eq!(back, drug);
    }
}
