//! Dose and infusion-rate calculator.
//!
//! Every operation here is a pure function of its arguments. Units are
//! normalized into one canonical basis before any formula runs:
//! micrograms per kilogram (per hour, for rates) over micrograms per
//! millilitre.
//!
//! Failures are reported, never coerced:
//! - [`CalcError::InvalidInput`]: a weight, concentration or volume that is
//!   not a positive number, a negative dose, or an unknown unit label
//! - [`CalcError::CapacityExceeded`]: a drug volume larger than its reservoir
//! - [`CalcError::DivisionGuard`]: a non-positive flow used as a divisor

mod infusion;
mod units;

pub use infusion::*;
pub use units::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Calculator errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error(
        "Drug volume {drug_volume_ml:.2} mL exceeds reservoir volume {reservoir_volume_ml:.2} mL"
    )]
    CapacityExceeded {
        drug_volume_ml: f64,
        reservoir_volume_ml: f64,
    },

    #[error("Flow rate must be positive to compute a duration, got {flow_ml_per_hour} mL/h")]
    DivisionGuard { flow_ml_per_hour: f64 },
}

pub type CalcResult<T> = Result<T, CalcError>;

impl CalcError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Reject anything that is not a finite number greater than zero.
pub(crate) fn require_positive(field: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::invalid(
            field,
            format!("must be a positive number, got {}", value),
        ))
    }
}

/// Reject negative and non-finite values; zero is allowed.
pub(crate) fn require_non_negative(field: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CalcError::invalid(
            field,
            format!("must be zero or a positive number, got {}", value),
        ))
    }
}

/// Round to two decimal places, the precision every rate is reported with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Volume (mL) of a single bolus.
///
/// `dose` and `concentration` must share a mass unit (e.g. mg/kg over mg/mL).
/// Use [`compute_bolus_volume`] when the units may differ.
pub fn compute_bolus_dose(weight_kg: f64, dose: f64, concentration: f64) -> CalcResult<f64> {
    let weight_kg = require_positive("weight_kg", weight_kg)?;
    let concentration = require_positive("concentration", concentration)?;
    let dose = require_non_negative("dose", dose)?;

    let volume_ml = weight_kg * dose / concentration;
    tracing::debug!(weight_kg, dose, concentration, volume_ml, "Computed bolus dose");
    Ok(volume_ml)
}

/// Volume (mL) of a single bolus, reconciling dose and concentration units.
pub fn compute_bolus_volume(
    weight_kg: f64,
    dose: f64,
    dose_unit: DoseUnit,
    concentration: Concentration,
) -> CalcResult<f64> {
    if dose_unit.is_rate() {
        return Err(CalcError::invalid(
            "dose_unit",
            format!("{} is a rate; a bolus needs a per-weight dose", dose_unit),
        ));
    }
    let normalized_dose = normalize_dose(require_non_negative("dose", dose)?, dose_unit);
    let normalized_concentration = normalize_concentration(concentration);
    compute_bolus_dose(weight_kg, normalized_dose.value, normalized_concentration.value)
}

/// Drug and diluent volumes for a prepared syringe or bag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReservoirPreparation {
    /// Volume of drug stock to draw up
    pub drug_volume_ml: f64,
    /// Volume of diluent to complete the reservoir
    pub diluent_volume_ml: f64,
    /// Total reservoir volume
    pub reservoir_volume_ml: f64,
}

/// Split a reservoir into drug stock and diluent.
///
/// `drug_volume = dose * weight * reservoir / concentration`. A drug volume
/// larger than the reservoir is rejected, never clamped.
pub fn compute_drug_volume_for_reservoir(
    dose: f64,
    weight_kg: f64,
    reservoir_volume_ml: f64,
    concentration: f64,
) -> CalcResult<ReservoirPreparation> {
    let dose = require_non_negative("dose", dose)?;
    let weight_kg = require_positive("weight_kg", weight_kg)?;
    let reservoir_volume_ml = require_positive("reservoir_volume_ml", reservoir_volume_ml)?;
    let concentration = require_positive("concentration", concentration)?;

    let drug_volume_ml = dose * weight_kg * reservoir_volume_ml / concentration;
    if drug_volume_ml > reservoir_volume_ml {
        tracing::warn!(
            drug_volume_ml,
            reservoir_volume_ml,
            "Rejected reservoir preparation: drug volume exceeds capacity"
        );
        return Err(CalcError::CapacityExceeded {
            drug_volume_ml,
            reservoir_volume_ml,
        });
    }

    Ok(ReservoirPreparation {
        drug_volume_ml,
        diluent_volume_ml: reservoir_volume_ml - drug_volume_ml,
        reservoir_volume_ml,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bolus_scenario() {
        // 10kg, 4 mg/kg, 10 mg/mL
        let volume = compute_bolus_dose(10.0, 4.0, 10.0).unwrap();
        assert!((volume - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_bolus_zero_dose_is_allowed() {
        assert_eq!(compute_bolus_dose(10.0, 0.0, 10.0).unwrap(), 0.0);
    }

    #[test]
    fn test_bolus_rejects_bad_weight_and_concentration() {
        assert!(matches!(
            compute_bolus_dose(0.0, 4.0, 10.0),
            Err(CalcError::InvalidInput { field: "weight_kg", .. })
        ));
        assert!(matches!(
            compute_bolus_dose(-2.0, 4.0, 10.0),
            Err(CalcError::InvalidInput { field: "weight_kg", .. })
        ));
        assert!(matches!(
            compute_bolus_dose(10.0, 4.0, 0.0),
            Err(CalcError::InvalidInput { field: "concentration", .. })
        ));
        assert!(matches!(
            compute_bolus_dose(10.0, -1.0, 10.0),
            Err(CalcError::InvalidInput { field: "dose", .. })
        ));
        assert!(compute_bolus_dose(f64::NAN, 4.0, 10.0).is_err());
    }

    #[test]
    fn test_bolus_volume_reconciles_units() {
        // 200 µg/kg of a 10 mg/mL stock for a 10kg dog = 2mg = 0.2 mL
        let volume = compute_bolus_volume(
            10.0,
            200.0,
            DoseUnit::UG_PER_KG,
            Concentration::mg_per_ml(10.0),
        )
        .unwrap();
        assert!((volume - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_bolus_volume_rejects_rate_units() {
        let result = compute_bolus_volume(
            10.0,
            5.0,
            DoseUnit::MG_PER_KG_PER_HOUR,
            Concentration::mg_per_ml(10.0),
        );
        assert!(matches!(
            result,
            Err(CalcError::InvalidInput { field: "dose_unit", .. })
        ));
    }

    #[test]
    fn test_reservoir_preparation() {
        // 0.1 * 10 * 20 / 50 = 0.4 mL of drug in a 20 mL syringe
        let prep = compute_drug_volume_for_reservoir(0.1, 10.0, 20.0, 50.0).unwrap();
        assert!((prep.drug_volume_ml - 0.4).abs() < 1e-9);
        assert!((prep.diluent_volume_ml - 19.6).abs() < 1e-9);
        assert_eq!(prep.reservoir_volume_ml, 20.0);
    }

    #[test]
    fn test_reservoir_capacity_exceeded() {
        // 2.5 * 10 * 20 / 20 = 25 mL, which does not fit in 20 mL
        let result = compute_drug_volume_for_reservoir(2.5, 10.0, 20.0, 20.0);
        match result {
            Err(CalcError::CapacityExceeded {
                drug_volume_ml,
                reservoir_volume_ml,
            }) => {
                assert!((drug_volume_ml - 25.0).abs() < 1e-9);
                assert_eq!(reservoir_volume_ml, 20.0);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_reservoir_exactly_full_is_allowed() {
        let prep = compute_drug_volume_for_reservoir(2.0, 10.0, 20.0, 20.0).unwrap();
        assert!((prep.drug_volume_ml - 20.0).abs() < 1e-9);
        assert!(prep.diluent_volume_ml.abs() < 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(5.166_666), 5.17);
        assert_eq!(round2(15.5), 15.5);
    }
}
