//! Sensor readings and the request boundary
//!
//! Raw JSON from the sensor provider is turned into typed `ParameterReading`s
//! here, before anything reaches the pure engine. Everything downstream can
//! assume a known parameter name and a finite number.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};
use crate::rulebook::Rulebook;

/// Soil/climate parameter measured by a field sensor.
///
/// Declaration order is the canonical evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Ph,
    Nitrogen,
    Phosphorus,
    Potassium,
    Moisture,
    Temperature,
    Humidity,
}

impl Parameter {
    pub const ALL: [Parameter; 7] = [
        Parameter::Ph,
        Parameter::Nitrogen,
        Parameter::Phosphorus,
        Parameter::Potassium,
        Parameter::Moisture,
        Parameter::Temperature,
        Parameter::Humidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Nitrogen => "nitrogen",
            Parameter::Phosphorus => "phosphorus",
            Parameter::Potassium => "potassium",
            Parameter::Moisture => "moisture",
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
        }
    }

    /// Human-facing name, e.g. "pH"
    pub fn label(&self) -> &'static str {
        match self {
            Parameter::Ph => "pH",
            Parameter::Nitrogen => "Nitrogen",
            Parameter::Phosphorus => "Phosphorus",
            Parameter::Potassium => "Potassium",
            Parameter::Moisture => "Soil moisture",
            Parameter::Temperature => "Soil temperature",
            Parameter::Humidity => "Humidity",
        }
    }

    /// Position in the canonical evaluation order
    pub fn rank(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Parameter::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| EngineError::validation(s, "unknown soil parameter"))
    }
}

/// One captured sensor value. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterReading {
    pub parameter: Parameter,
    pub value: f64,
}

impl ParameterReading {
    pub fn new(parameter: Parameter, value: f64) -> Self {
        Self { parameter, value }
    }
}

/// Display language for rule text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// Resolve a language code, falling back to English for anything unsupported
    pub fn resolve(code: Option<&str>) -> Self {
        match code.map(|c| c.trim().to_ascii_lowercase()) {
            None => Language::En,
            Some(c) if c == "en" || c.is_empty() => Language::En,
            Some(c) if c == "hi" => Language::Hi,
            Some(other) => {
                tracing::warn!("Unsupported language '{}', using en", other);
                Language::En
            }
        }
    }
}

/// Soil improvement request as received from the caller
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SoilImprovementRequest {
    #[serde(default)]
    pub field_id: Option<String>,
    #[serde(default)]
    pub sensor_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub language: Option<String>,
}

impl SoilImprovementRequest {
    pub fn from_json(raw: &str) -> EngineResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| EngineError::validation("request", format!("malformed JSON: {}", e)))
    }

    pub fn language(&self) -> Language {
        Language::resolve(self.language.as_deref())
    }

    /// Typed readings in canonical evaluation order
    pub fn readings(&self) -> EngineResult<Vec<ParameterReading>> {
        let data = self
            .sensor_data
            .as_ref()
            .ok_or_else(|| EngineError::validation("sensor_data", "is required"))?;
        readings_from_map(data)
    }
}

/// Convert a `parameter -> number` JSON object into typed readings.
///
/// Unknown keys and non-numeric values reject the whole map.
pub fn readings_from_map(data: &Map<String, Value>) -> EngineResult<Vec<ParameterReading>> {
    if data.is_empty() {
        return Err(EngineError::validation(
            "sensor_data",
            "must contain at least one reading",
        ));
    }

    let mut readings = Vec::with_capacity(data.len());
    let mut seen = FxHashSet::default();

    for (key, raw) in data {
        let parameter: Parameter = key.parse()?;
        let value = raw
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| EngineError::validation(key.as_str(), "must be a number"))?;

        // "PH" and "ph" both map to the same parameter
        if !seen.insert(parameter) {
            return Err(EngineError::validation(key.as_str(), "duplicate reading"));
        }
        readings.push(ParameterReading::new(parameter, value));
    }

    readings.sort_by_key(|r| r.parameter.rank());
    Ok(readings)
}

/// Check every reading against its absolute valid range.
///
/// The engine performs the same check during evaluation; this lets ingestion
/// reject a snapshot before storing it.
pub fn validate_sensor_reading(
    readings: &[ParameterReading],
    rulebook: &Rulebook,
) -> EngineResult<()> {
    for reading in readings {
        let threshold = rulebook.threshold(reading.parameter)?;
        threshold.check_absolute(reading.value)?;
    }
    Ok(())
}
