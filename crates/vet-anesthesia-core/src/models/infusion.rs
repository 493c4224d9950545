//! Fluid infusion configuration.

use serde::{Deserialize, Serialize};

use crate::calculator::{
    compute_fluid_rate, plan_infusion, require_positive, CalcResult, DeliverySet, InfusionPlan,
};

/// Default fluid rate, mL/kg/h.
pub const DEFAULT_FLUID_RATE_ML_PER_KG_PER_HOUR: f64 = 1.0;

/// Default bag volume, mL.
pub const DEFAULT_BAG_VOLUME_ML: f64 = 20.0;

/// How infusions are set up when the caller does not say otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfusionSettings {
    #[serde(default = "default_fluid_rate")]
    pub rate_ml_per_kg_per_hour: f64,
    #[serde(default)]
    pub delivery_set: DeliverySet,
    #[serde(default = "default_bag_volume")]
    pub bag_volume_ml: f64,
}

impl Default for InfusionSettings {
    fn default() -> Self {
        Self {
            rate_ml_per_kg_per_hour: DEFAULT_FLUID_RATE_ML_PER_KG_PER_HOUR,
            delivery_set: DeliverySet::default(),
            bag_volume_ml: DEFAULT_BAG_VOLUME_ML,
        }
    }
}

impl InfusionSettings {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("rate_ml_per_kg_per_hour", self.rate_ml_per_kg_per_hour)?;
        require_positive("bag_volume_ml", self.bag_volume_ml)?;
        Ok(())
    }
}

fn default_fluid_rate() -> f64 {
    DEFAULT_FLUID_RATE_ML_PER_KG_PER_HOUR
}

fn default_bag_volume() -> f64 {
    DEFAULT_BAG_VOLUME_ML
}

/// A stored fluid infusion setup for one patient weight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InfusionConfig {
    /// Local UUID
    pub local_id: String,
    /// Patient weight in kg
    pub weight_kg: f64,
    /// Prescribed rate in mL/kg/h
    pub rate_ml_per_kg_per_hour: f64,
    /// Infusion set in use
    pub delivery_set: DeliverySet,
    /// Bag or syringe volume in mL
    pub bag_volume_ml: f64,
    /// Creation timestamp
    pub created_at: String,
}

impl InfusionConfig {
    /// Create a config for the given weight with default settings.
    pub fn new(weight_kg: f64) -> Self {
        Self::with_settings(weight_kg, &InfusionSettings::default())
    }

    pub fn with_settings(weight_kg: f64, settings: &InfusionSettings) -> Self {
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            weight_kg,
            rate_ml_per_kg_per_hour: settings.rate_ml_per_kg_per_hour,
            delivery_set: settings.delivery_set,
            bag_volume_ml: settings.bag_volume_ml,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_positive("weight_kg", self.weight_kg)?;
        require_positive("rate_ml_per_kg_per_hour", self.rate_ml_per_kg_per_hour)?;
        require_positive("bag_volume_ml", self.bag_volume_ml)?;
        Ok(())
    }

    /// Flow rate in mL/h.
    pub fn flow_ml_per_hour(&self) -> CalcResult<f64> {
        compute_fluid_rate(self.weight_kg, self.rate_ml_per_kg_per_hour)
    }

    /// Flow, drip rate and duration of this setup.
    pub fn plan(&self) -> CalcResult<InfusionPlan> {
        plan_infusion(self.bag_volume_ml, self.flow_ml_per_hour()?, self.delivery_set)
    }
}
