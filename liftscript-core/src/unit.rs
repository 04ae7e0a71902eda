//! Weight units and the weight quantity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pounds per kilogram
pub const LB_PER_KG: f64 = 2.204_622_621_85;

/// Tolerance used when comparing weights after unit normalization
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// Error type for unit parsing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("Unknown unit: {0}")]
    Unknown(String),
}

/// Unit system for weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Lb,
    Kg,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Lb => "lb",
            Unit::Kg => "kg",
        }
    }

    /// Recognize a literal suffix (`lb`, `lbs`, `kg`)
    pub fn from_suffix(s: &str) -> Option<Unit> {
        match s {
            "lb" | "lbs" => Some(Unit::Lb),
            "kg" => Some(Unit::Kg),
            _ => None,
        }
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::from_suffix(&s.trim().to_ascii_lowercase())
            .ok_or_else(|| UnitError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A magnitude tagged with a unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: Unit,
}

impl Weight {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn lb(value: f64) -> Self {
        Self::new(value, Unit::Lb)
    }

    pub fn kg(value: f64) -> Self {
        Self::new(value, Unit::Kg)
    }

    /// Express this weight in another unit
    pub fn convert_to(&self, unit: Unit) -> Weight {
        let value = match (self.unit, unit) {
            (Unit::Lb, Unit::Lb) | (Unit::Kg, Unit::Kg) => self.value,
            (Unit::Kg, Unit::Lb) => self.value * LB_PER_KG,
            (Unit::Lb, Unit::Kg) => self.value / LB_PER_KG,
        };
        Weight::new(value, unit)
    }

    /// Compare two weights after converting `other` into this unit
    pub fn approx_eq(&self, other: &Weight) -> bool {
        let other = other.convert_to(self.unit);
        let scale = self.value.abs().max(other.value.abs()).max(1.0);
        (self.value - other.value).abs() <= WEIGHT_EPSILON * scale
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    /// Apply a function to the magnitude, keeping the unit
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Weight {
        Weight::new(f(self.value), self.unit)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_magnitude(self.value), self.unit)
    }
}

/// Render a float without a trailing `.0` for whole values
pub fn format_magnitude(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.6}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_round_trip() {
        let w = Weight::kg(100.0);
        let back = w.convert_to(Unit::Lb).convert_to(Unit::Kg);
        assert!((back.value - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_approx_eq_across_units() {
        assert!(Weight::kg(1.0).approx_eq(&Weight::lb(LB_PER_KG)));
        assert!(!Weight::kg(1.0).approx_eq(&Weight::lb(2.0)));
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("KG".parse::<Unit>(), Ok(Unit::Kg));
        assert_eq!("lbs".parse::<Unit>(), Ok(Unit::Lb));
        assert!("stone".parse::<Unit>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Weight::lb(135.0).to_string(), "135lb");
        assert_eq!(Weight::kg(62.5).to_string(), "62.5kg");
    }
}
