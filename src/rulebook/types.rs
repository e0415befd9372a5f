//! Rulebook record types
//!
//! These mirror the JSON layout of `data/chilli_rulebook.json` one to one.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::readings::{Language, Parameter};

/// Text with an English base and optional translations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi: Option<String>,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>) -> Self {
        Self { en: en.into(), hi: None }
    }

    /// Text in `language`, or the English base when no translation exists
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Hi => self.hi.as_deref().unwrap_or(&self.en),
            Language::En => &self.en,
        }
    }
}

/// Which side of the optimal band a rule remediates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Low,
    High,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Low => "low",
            Direction::High => "high",
        }
    }
}

/// Rule urgency tier. Variant order is the sort order (high first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn action_urgency(&self) -> &'static str {
        match self {
            Priority::High => "apply within 7 days",
            Priority::Medium => "apply within 14 days",
            Priority::Low => "apply within 30 days",
        }
    }
}

/// Crop requirement bands for one parameter.
///
/// `absolute_min <= low_bound <= optimal_min < optimal_max <= high_bound <= absolute_max`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub parameter: Parameter,
    #[serde(default)]
    pub unit: String,
    /// Physically valid sensor range; anything outside is rejected
    pub absolute_min: f64,
    /// Below this a deficit is critical
    pub low_bound: f64,
    pub optimal_min: f64,
    pub optimal_max: f64,
    /// Above this an excess is critical
    pub high_bound: f64,
    pub absolute_max: f64,
}

impl Threshold {
    pub fn band_width(&self) -> f64 {
        self.optimal_max - self.optimal_min
    }

    pub fn midpoint(&self) -> f64 {
        (self.optimal_min + self.optimal_max) / 2.0
    }

    pub fn check_absolute(&self, value: f64) -> EngineResult<()> {
        if !value.is_finite() {
            return Err(EngineError::validation(self.parameter.as_str(), "must be a finite number"));
        }
        if value < self.absolute_min || value > self.absolute_max {
            return Err(EngineError::validation(
                self.parameter.as_str(),
                format!(
                    "{} out of valid range ({}-{})",
                    value, self.absolute_min, self.absolute_max
                ),
            ));
        }
        Ok(())
    }

    /// Outside the acceptable band around the optimum
    pub fn is_critical(&self, value: f64) -> bool {
        value < self.low_bound || value > self.high_bound
    }

    /// E.g. "100-150 ppm", "5.5-7.5"
    pub fn target_range(&self) -> String {
        if self.unit.is_empty() {
            format!("{}-{}", self.optimal_min, self.optimal_max)
        } else if self.unit == "%" {
            format!("{}-{}%", self.optimal_min, self.optimal_max)
        } else {
            format!("{}-{} {}", self.optimal_min, self.optimal_max, self.unit)
        }
    }

    pub(crate) fn check_ordering(&self) -> EngineResult<()> {
        let chain = [
            self.absolute_min,
            self.low_bound,
            self.optimal_min,
            self.optimal_max,
            self.high_bound,
            self.absolute_max,
        ];
        if chain.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::configuration(format!(
                "threshold for {} has non-finite bounds",
                self.parameter
            )));
        }
        if chain.windows(2).any(|w| w[0] > w[1]) || self.band_width() <= 0.0 {
            return Err(EngineError::configuration(format!(
                "threshold bounds for {} are not ordered",
                self.parameter
            )));
        }
        // Deficit/excess percentages divide by these
        if self.low_bound <= 0.0 || self.high_bound <= 0.0 {
            return Err(EngineError::configuration(format!(
                "threshold for {} needs positive low/high bounds",
                self.parameter
            )));
        }
        Ok(())
    }
}

/// Remediation rule for one (parameter, direction) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub parameter: Parameter,
    pub direction: Direction,
    pub issue: LocalizedText,
    pub solution: LocalizedText,
    pub dosage: String,
    #[serde(default)]
    pub timeline: String,
    pub organic_alternative: String,
    pub cost_estimate: String,
    pub priority: Priority,
}

/// Overall feasibility band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeasibilityStatus {
    ReadyForSowing,
    RequiresMinorAdjustments,
    NeedsSignificantImprovement,
}

impl FeasibilityStatus {
    pub fn display_text(&self) -> &'static str {
        match self {
            FeasibilityStatus::ReadyForSowing => "Ready for sowing",
            FeasibilityStatus::RequiresMinorAdjustments => "Requires minor adjustments",
            FeasibilityStatus::NeedsSignificantImprovement => "Needs significant improvement",
        }
    }
}

/// Score cut-offs for the feasibility bands (policy, not arithmetic)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityBands {
    pub ready_min: f64,
    pub minor_adjustments_min: f64,
}

impl Default for FeasibilityBands {
    fn default() -> Self {
        Self {
            ready_min: 75.0,
            minor_adjustments_min: 50.0,
        }
    }
}

impl FeasibilityBands {
    pub fn classify(&self, score: f64) -> FeasibilityStatus {
        if score >= self.ready_min {
            FeasibilityStatus::ReadyForSowing
        } else if score >= self.minor_adjustments_min {
            FeasibilityStatus::RequiresMinorAdjustments
        } else {
            FeasibilityStatus::NeedsSignificantImprovement
        }
    }
}

/// One fertilizer in a schedule stage, dosed per hectare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerDose {
    pub name: String,
    pub dosage_per_ha: f64,
    pub unit: String,
}

/// Crop lifecycle stage with its fertilizer applications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FertilizerStage {
    pub stage: LocalizedText,
    /// Days after transplanting
    pub day: u32,
    pub fertilizers: Vec<FertilizerDose>,
    pub application_method: String,
}
