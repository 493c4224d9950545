//! Dose and concentration units.
//!
//! Handles:
//! - Label parsing ("mg/kg/min", "µg/kg/h", "mcg/ml", ...)
//! - Mass conversion (mg → µg)
//! - Time conversion (per minute → per hour)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{CalcError, CalcResult};

const MICROGRAMS_PER_MILLIGRAM: f64 = 1000.0;
const MINUTES_PER_HOUR: f64 = 60.0;

/// Mass unit of a dose or concentration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassUnit {
    Milligram,
    Microgram,
}

impl MassUnit {
    /// Multiplier into micrograms.
    pub fn to_micrograms(self) -> f64 {
        match self {
            MassUnit::Milligram => MICROGRAMS_PER_MILLIGRAM,
            MassUnit::Microgram => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MassUnit::Milligram => "mg",
            MassUnit::Microgram => "µg",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "mg" => Some(MassUnit::Milligram),
            "ug" => Some(MassUnit::Microgram),
            _ => None,
        }
    }
}

/// Time basis of a rate dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBasis {
    PerMinute,
    PerHour,
}

impl TimeBasis {
    /// Multiplier into a per-hour rate.
    pub fn to_per_hour(self) -> f64 {
        match self {
            TimeBasis::PerMinute => MINUTES_PER_HOUR,
            TimeBasis::PerHour => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TimeBasis::PerMinute => "min",
            TimeBasis::PerHour => "h",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "min" | "minute" => Some(TimeBasis::PerMinute),
            "h" | "hr" | "hour" => Some(TimeBasis::PerHour),
            _ => None,
        }
    }
}

/// Unit of a reference dose: mass per kilogram, optionally per unit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DoseUnit {
    pub mass: MassUnit,
    /// `None` for a single dose, `Some` for a continuous rate
    pub rate: Option<TimeBasis>,
}

impl DoseUnit {
    pub const MG_PER_KG: DoseUnit = DoseUnit::new(MassUnit::Milligram, None);
    pub const UG_PER_KG: DoseUnit = DoseUnit::new(MassUnit::Microgram, None);
    pub const MG_PER_KG_PER_MIN: DoseUnit =
        DoseUnit::new(MassUnit::Milligram, Some(TimeBasis::PerMinute));
    pub const UG_PER_KG_PER_MIN: DoseUnit =
        DoseUnit::new(MassUnit::Microgram, Some(TimeBasis::PerMinute));
    pub const MG_PER_KG_PER_HOUR: DoseUnit =
        DoseUnit::new(MassUnit::Milligram, Some(TimeBasis::PerHour));
    pub const UG_PER_KG_PER_HOUR: DoseUnit =
        DoseUnit::new(MassUnit::Microgram, Some(TimeBasis::PerHour));

    pub const fn new(mass: MassUnit, rate: Option<TimeBasis>) -> Self {
        Self { mass, rate }
    }

    /// Whether this unit describes a continuous rate.
    pub fn is_rate(&self) -> bool {
        self.rate.is_some()
    }

    /// The canonical unit this one normalizes into.
    pub fn canonical(&self) -> DoseUnit {
        DoseUnit::new(MassUnit::Microgram, self.rate.map(|_| TimeBasis::PerHour))
    }

    /// Multiplier into the canonical unit.
    pub fn to_canonical_factor(&self) -> f64 {
        self.mass.to_micrograms() * self.rate.map_or(1.0, TimeBasis::to_per_hour)
    }
}

impl fmt::Display for DoseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/kg", self.mass.symbol())?;
        if let Some(rate) = self.rate {
            write!(f, "/{}", rate.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for DoseUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> CalcResult<Self> {
        let label = canonical_label(s);
        let mut parts = label.split('/');

        let mass = parts.next().and_then(MassUnit::parse);
        let per_kg = parts.next() == Some("kg");
        let rate = parts.next().map(TimeBasis::parse);
        let trailing = parts.next().is_some();

        match (mass, per_kg, rate, trailing) {
            (Some(mass), true, None, false) => Ok(DoseUnit::new(mass, None)),
            (Some(mass), true, Some(Some(rate)), false) => Ok(DoseUnit::new(mass, Some(rate))),
            _ => Err(CalcError::invalid(
                "dose_unit",
                format!("unrecognized dose unit '{}'", s),
            )),
        }
    }
}

impl TryFrom<String> for DoseUnit {
    type Error = CalcError;

    fn try_from(s: String) -> CalcResult<Self> {
        s.parse()
    }
}

impl From<DoseUnit> for String {
    fn from(unit: DoseUnit) -> Self {
        unit.to_string()
    }
}

/// Unit of a stock concentration: mass per millilitre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConcentrationUnit {
    pub mass: MassUnit,
}

impl ConcentrationUnit {
    pub const MG_PER_ML: ConcentrationUnit = ConcentrationUnit {
        mass: MassUnit::Milligram,
    };
    pub const UG_PER_ML: ConcentrationUnit = ConcentrationUnit {
        mass: MassUnit::Microgram,
    };
}

impl fmt::Display for ConcentrationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/mL", self.mass.symbol())
    }
}

impl FromStr for ConcentrationUnit {
    type Err = CalcError;

    fn from_str(s: &str) -> CalcResult<Self> {
        let label = canonical_label(s);
        match label.split_once('/') {
            Some((mass, "ml")) => MassUnit::parse(mass)
                .map(|mass| ConcentrationUnit { mass })
                .ok_or_else(|| {
                    CalcError::invalid(
                        "concentration_unit",
                        format!("unrecognized concentration unit '{}'", s),
                    )
                }),
            _ => Err(CalcError::invalid(
                "concentration_unit",
                format!("unrecognized concentration unit '{}'", s),
            )),
        }
    }
}

impl TryFrom<String> for ConcentrationUnit {
    type Error = CalcError;

    fn try_from(s: String) -> CalcResult<Self> {
        s.parse()
    }
}

impl From<ConcentrationUnit> for String {
    fn from(unit: ConcentrationUnit) -> Self {
        unit.to_string()
    }
}

/// A stock concentration with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    pub value: f64,
    pub unit: ConcentrationUnit,
}

impl Concentration {
    pub fn new(value: f64, unit: ConcentrationUnit) -> Self {
        Self { value, unit }
    }

    pub fn mg_per_ml(value: f64) -> Self {
        Self::new(value, ConcentrationUnit::MG_PER_ML)
    }

    pub fn ug_per_ml(value: f64) -> Self {
        Self::new(value, ConcentrationUnit::UG_PER_ML)
    }
}

impl fmt::Display for Concentration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// A dose expressed in its canonical unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDose {
    pub value: f64,
    pub unit: DoseUnit,
}

/// Convert a dose into µg/kg (single dose) or µg/kg/h (rate).
pub fn normalize_dose(value: f64, unit: DoseUnit) -> NormalizedDose {
    NormalizedDose {
        value: value * unit.to_canonical_factor(),
        unit: unit.canonical(),
    }
}

/// Convert a concentration into µg/mL.
pub fn normalize_concentration(concentration: Concentration) -> Concentration {
    Concentration::ug_per_ml(concentration.value * concentration.unit.mass.to_micrograms())
}

/// Lowercase, strip whitespace, and fold every microgram spelling into "ug".
fn canonical_label(s: &str) -> String {
    let compact: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    compact
        .replace('\u{00b5}', "u") // micro sign
        .replace('\u{03bc}', "u") // greek small mu
        .replace("mcg", "ug")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dose_units() {
        assert_eq!("mg/kg".parse::<DoseUnit>().unwrap(), DoseUnit::MG_PER_KG);
        assert_eq!("µg/kg".parse::<DoseUnit>().unwrap(), DoseUnit::UG_PER_KG);
        assert_eq!(
            "mg/kg/min".parse::<DoseUnit>().unwrap(),
            DoseUnit::MG_PER_KG_PER_MIN
        );
        assert_eq!(
            "μg/kg/min".parse::<DoseUnit>().unwrap(),
            DoseUnit::UG_PER_KG_PER_MIN
        );
        assert_eq!(
            "mcg/kg/hr".parse::<DoseUnit>().unwrap(),
            DoseUnit::UG_PER_KG_PER_HOUR
        );
        assert_eq!(
            " MG / KG / H ".parse::<DoseUnit>().unwrap(),
            DoseUnit::MG_PER_KG_PER_HOUR
        );
    }

    #[test]
    fn test_parse_dose_unit_rejects_garbage() {
        assert!("mg".parse::<DoseUnit>().is_err());
        assert!("mg/lb".parse::<DoseUnit>().is_err());
        assert!("g/kg".parse::<DoseUnit>().is_err());
        assert!("mg/kg/day".parse::<DoseUnit>().is_err());
        assert!("mg/kg/h/x".parse::<DoseUnit>().is_err());
    }

    #[test]
    fn test_dose_unit_display_round_trips() {
        for unit in [
            DoseUnit::MG_PER_KG,
            DoseUnit::UG_PER_KG,
            DoseUnit::MG_PER_KG_PER_MIN,
            DoseUnit::UG_PER_KG_PER_MIN,
            DoseUnit::MG_PER_KG_PER_HOUR,
            DoseUnit::UG_PER_KG_PER_HOUR,
        ] {
            assert_eq!(unit.to_string().parse::<DoseUnit>().unwrap(), unit);
        }
        assert_eq!(DoseUnit::UG_PER_KG_PER_MIN.to_string(), "µg/kg/min");
    }

    #[test]
    fn test_parse_concentration_units() {
        assert_eq!(
            "mg/mL".parse::<ConcentrationUnit>().unwrap(),
            ConcentrationUnit::MG_PER_ML
        );
        assert_eq!(
            "mcg/ml".parse::<ConcentrationUnit>().unwrap(),
            ConcentrationUnit::UG_PER_ML
        );
        assert!("mg/l".parse::<ConcentrationUnit>().is_err());
        assert!("mg".parse::<ConcentrationUnit>().is_err());
    }

    #[test]
    fn test_normalize_dose() {
        let dose = normalize_dose(0.1, DoseUnit::MG_PER_KG_PER_MIN);
        assert!((dose.value - 6000.0).abs() < 1e-9); // 0.1 * 1000 * 60
        assert_eq!(dose.unit, DoseUnit::UG_PER_KG_PER_HOUR);

        let dose = normalize_dose(4.0, DoseUnit::MG_PER_KG);
        assert_eq!(dose.value, 4000.0);
        assert_eq!(dose.unit, DoseUnit::UG_PER_KG);
    }

    #[test]
    fn test_normalize_is_noop_on_canonical_units() {
        let dose = normalize_dose(5.0, DoseUnit::UG_PER_KG_PER_HOUR);
        assert_eq!(dose.value, 5.0);
        assert_eq!(dose.unit, DoseUnit::UG_PER_KG_PER_HOUR);

        let concentration = normalize_concentration(Concentration::ug_per_ml(500.0));
        assert_eq!(concentration, Concentration::ug_per_ml(500.0));
    }

    #[test]
    fn test_normalize_concentration() {
        let concentration = normalize_concentration(Concentration::mg_per_ml(0.5));
        assert_eq!(concentration.value, 500.0);
        assert_eq!(concentration.unit, ConcentrationUnit::UG_PER_ML);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&DoseUnit::MG_PER_KG_PER_MIN).unwrap();
        assert_eq!(json, "\"mg/kg/min\"");
        let unit: DoseUnit = serde_json::from_str("\"ug/kg/h\"").unwrap();
        assert_eq!(unit, DoseUnit::UG_PER_KG_PER_HOUR);
        assert!(serde_json::from_str::<DoseUnit>("\"furlongs\"").is_err());
    }
}
