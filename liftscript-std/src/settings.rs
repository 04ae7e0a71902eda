//! User settings relevant to script evaluation
//!
//! Mirrors what the app stores: the active unit system, the plates the
//! user owns and the bar weights. Every field has a default so partial
//! JSON documents load.

use liftscript_core::{Unit, Weight};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A stack of identical plates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub weight: Weight,
    /// Total number of plates (both sides of the bar)
    pub num: u32,
}

impl Plate {
    pub fn new(weight: Weight, num: u32) -> Self {
        Self { weight, num }
    }
}

/// Bar weight per unit system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bars {
    pub lb: Weight,
    pub kg: Weight,
}

impl Bars {
    pub fn for_unit(&self, unit: Unit) -> Weight {
        match unit {
            Unit::Lb => self.lb,
            Unit::Kg => self.kg,
        }
    }
}

impl Default for Bars {
    fn default() -> Self {
        Self { lb: Weight::lb(45.0), kg: Weight::kg(20.0) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub units: Unit,
    pub plates: Vec<Plate>,
    pub bars: Bars,
}

impl Default for Settings {
    fn default() -> Self {
        let lb = [45.0, 25.0, 10.0, 5.0, 2.5].map(|w| Plate::new(Weight::lb(w), 4));
        let kg = [20.0, 10.0, 5.0, 2.5, 1.25].map(|w| Plate::new(Weight::kg(w), 4));
        Self {
            units: Unit::Lb,
            plates: lb.into_iter().chain(kg).collect(),
            bars: Bars::default(),
        }
    }
}

impl Settings {
    pub fn with_units(mut self, units: Unit) -> Self {
        self.units = units;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Plates usable in `unit`
    pub fn plates_for(&self, unit: Unit) -> impl Iterator<Item = &Plate> {
        self.plates.iter().filter(move |p| p.weight.unit == unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{"units": "kg"}"#).unwrap();
        assert_eq!(s.units, Unit::Kg);
        assert_eq!(s.bars.kg, Weight::kg(20.0));
        assert_eq!(s.plates_for(Unit::Kg).count(), 5);
    }

    #[test]
    fn test_custom_plates() {
        let s = Settings::from_json(r#"{
            "units": "lb",
            "plates": [{"weight": {"value": 45, "unit": "lb"}, "num": 2}],
            "bars": {"lb": {"value": 35, "unit": "lb"}, "kg": {"value": 15, "unit": "kg"}}
        }"#).unwrap();
        assert_eq!(s.plates.len(), 1);
        assert_eq!(s.bars.for_unit(Unit::Lb), Weight::lb(35.0));
        assert_eq!(s.plates_for(Unit::Kg).count(), 0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Settings::from_json("{"), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::load("/nonexistent/liftscript.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/liftscript.json"));
    }
}
