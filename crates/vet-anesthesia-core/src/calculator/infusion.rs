//! Continuous infusion: flow rate, drip rate and duration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    normalize_concentration, normalize_dose, require_non_negative, require_positive, round2,
    CalcError, CalcResult, Concentration, DoseUnit,
};

const MINUTES_PER_HOUR: f64 = 60.0;

/// Infusion set hardware class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverySet {
    /// 20 drops per mL
    #[default]
    Macro,
    /// 60 drops per mL
    Micro,
}

impl DeliverySet {
    /// Drops per millilitre.
    pub fn drop_factor(self) -> u32 {
        match self {
            DeliverySet::Macro => 20,
            DeliverySet::Micro => 60,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeliverySet::Macro => "macro",
            DeliverySet::Micro => "micro",
        }
    }
}

impl fmt::Display for DeliverySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} gtt/mL)", self.as_str(), self.drop_factor())
    }
}

impl FromStr for DeliverySet {
    type Err = CalcError;

    fn from_str(s: &str) -> CalcResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "macro" | "macrodrip" | "macrogotas" | "20" => Ok(DeliverySet::Macro),
            "micro" | "microdrip" | "microgotas" | "60" => Ok(DeliverySet::Micro),
            _ => Err(CalcError::invalid(
                "delivery_set",
                format!("unknown delivery set '{}', expected macro or micro", s),
            )),
        }
    }
}

/// Flow rate (mL/h) of a drug constant-rate infusion.
///
/// The dose is normalized to µg/kg/h and the concentration to µg/mL before
/// `flow = dose * weight / concentration` is applied, so callers may mix
/// mg/kg/min, µg/kg/h and friends freely.
pub fn compute_continuous_infusion_rate(
    weight_kg: f64,
    dose: f64,
    dose_unit: DoseUnit,
    concentration: Concentration,
) -> CalcResult<f64> {
    let weight_kg = require_positive("weight_kg", weight_kg)?;
    let dose = require_non_negative("dose", dose)?;
    require_positive("concentration", concentration.value)?;
    if !dose_unit.is_rate() {
        return Err(CalcError::invalid(
            "dose_unit",
            format!("{} has no time basis; an infusion needs a rate", dose_unit),
        ));
    }

    let normalized_dose = normalize_dose(dose, dose_unit);
    let normalized_concentration = normalize_concentration(concentration);
    let flow_ml_per_hour = normalized_dose.value * weight_kg / normalized_concentration.value;

    tracing::debug!(
        weight_kg,
        dose_ug_per_kg_per_hour = normalized_dose.value,
        concentration_ug_per_ml = normalized_concentration.value,
        flow_ml_per_hour,
        "Computed continuous infusion rate"
    );
    Ok(flow_ml_per_hour)
}

/// Flow rate (mL/h) of a fluid infusion prescribed in mL/kg/h.
pub fn compute_fluid_rate(weight_kg: f64, rate_ml_per_kg_per_hour: f64) -> CalcResult<f64> {
    let weight_kg = require_positive("weight_kg", weight_kg)?;
    let rate = require_positive("rate_ml_per_kg_per_hour", rate_ml_per_kg_per_hour)?;
    Ok(weight_kg * rate)
}

/// Drops per minute for a flow rate on the given set.
pub fn compute_drip_rate(flow_ml_per_hour: f64, delivery_set: DeliverySet) -> f64 {
    flow_ml_per_hour * f64::from(delivery_set.drop_factor()) / MINUTES_PER_HOUR
}

/// Hours until a bag runs dry at the given flow.
pub fn compute_infusion_duration(bag_volume_ml: f64, flow_ml_per_hour: f64) -> CalcResult<f64> {
    if !flow_ml_per_hour.is_finite() || flow_ml_per_hour <= 0.0 {
        return Err(CalcError::DivisionGuard { flow_ml_per_hour });
    }
    let bag_volume_ml = require_positive("bag_volume_ml", bag_volume_ml)?;
    Ok(bag_volume_ml / flow_ml_per_hour)
}

/// Duration split into whole hours and remaining minutes for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfusionDuration {
    pub hours: u64,
    pub minutes: u32,
}

impl InfusionDuration {
    /// `floor(hours)` hours plus `round(fraction * 60)` minutes.
    ///
    /// A fraction that rounds up to 60 minutes carries into the hour.
    pub fn from_hours(duration_hours: f64) -> Self {
        let duration_hours = if duration_hours.is_finite() {
            duration_hours.max(0.0)
        } else {
            0.0
        };
        let whole = duration_hours.floor();
        let minutes = ((duration_hours - whole) * MINUTES_PER_HOUR).round() as u32;
        if minutes >= 60 {
            Self {
                hours: whole as u64 + 1,
                minutes: 0,
            }
        } else {
            Self {
                hours: whole as u64,
                minutes,
            }
        }
    }
}

impl fmt::Display for InfusionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} h {:02} min", self.hours, self.minutes)
    }
}

/// Flow, drip rate and duration for one bag on one set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfusionPlan {
    pub bag_volume_ml: f64,
    pub delivery_set: DeliverySet,
    pub flow_ml_per_hour: f64,
    pub drip_rate_per_minute: f64,
    pub duration_hours: f64,
}

impl InfusionPlan {
    pub fn duration(&self) -> InfusionDuration {
        InfusionDuration::from_hours(self.duration_hours)
    }

    /// Copy with every computed figure rounded to two decimals.
    pub fn rounded(&self) -> Self {
        Self {
            flow_ml_per_hour: round2(self.flow_ml_per_hour),
            drip_rate_per_minute: round2(self.drip_rate_per_minute),
            duration_hours: round2(self.duration_hours),
            ..*self
        }
    }
}

/// Build an [`InfusionPlan`] for a bag delivered at `flow_ml_per_hour`.
pub fn plan_infusion(
    bag_volume_ml: f64,
    flow_ml_per_hour: f64,
    delivery_set: DeliverySet,
) -> CalcResult<InfusionPlan> {
    let duration_hours = compute_infusion_duration(bag_volume_ml, flow_ml_per_hour)?;
    let plan = InfusionPlan {
        bag_volume_ml,
        delivery_set,
        flow_ml_per_hour,
        drip_rate_per_minute: compute_drip_rate(flow_ml_per_hour, delivery_set),
        duration_hours,
    };
    tracing::debug!(?plan, "Planned infusion");
    Ok(plan)
}
