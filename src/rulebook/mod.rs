//! Crop Rulebook
//!
//! Constant tables driving the engine: per-parameter thresholds, remediation
//! rules, aggregation weights, feasibility bands and the fertilizer schedule.
//!
//! The tables are data, not code. A default chilli rulebook is embedded from
//! `data/chilli_rulebook.json`; a corrected copy can be supplied by path at
//! startup without touching the engine. Once built a `Rulebook` is never
//! mutated and is shared by reference across threads.

pub mod types;

pub use types::{
    Direction, FeasibilityBands, FeasibilityStatus, FertilizerDose, FertilizerStage,
    LocalizedText, Priority, Rule, Threshold,
};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::readings::Parameter;

const BUILTIN_CHILLI_RULEBOOK: &str = include_str!("../../data/chilli_rulebook.json");

/// Tolerance for the weights-sum-to-one check
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// On-disk layout
#[derive(Debug, Deserialize)]
struct RulebookFile {
    crop: String,
    thresholds: Vec<Threshold>,
    weights: FxHashMap<Parameter, f64>,
    #[serde(default)]
    bands: FeasibilityBands,
    rules: Vec<Rule>,
    #[serde(default)]
    fertilizer_schedule: Vec<FertilizerStage>,
}

/// Validated, indexed rulebook for one crop
#[derive(Debug, Clone)]
pub struct Rulebook {
    crop: String,
    thresholds: FxHashMap<Parameter, Threshold>,
    weights: FxHashMap<Parameter, f64>,
    bands: FeasibilityBands,
    rules: FxHashMap<(Parameter, Direction), Rule>,
    fertilizer_schedule: Vec<FertilizerStage>,
}

impl Rulebook {
    /// Embedded chilli rulebook
    pub fn builtin() -> EngineResult<Self> {
        Self::from_json_str(BUILTIN_CHILLI_RULEBOOK)
    }

    /// Load a rulebook from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rulebook file: {:?}", path))?;

        let rulebook = Self::from_json_str(&contents)
            .with_context(|| format!("Invalid rulebook: {:?}", path))?;

        Ok(rulebook)
    }

    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let file: RulebookFile = serde_json::from_str(raw)
            .map_err(|e| EngineError::configuration(format!("malformed rulebook JSON: {}", e)))?;
        Self::build(file)
    }

    fn build(file: RulebookFile) -> EngineResult<Self> {
        let mut thresholds = FxHashMap::default();
        for threshold in file.thresholds {
            threshold.check_ordering()?;
            let parameter = threshold.parameter;
            if thresholds.insert(parameter, threshold).is_some() {
                return Err(EngineError::configuration(format!(
                    "duplicate threshold for {}",
                    parameter
                )));
            }
        }

        let mut weight_sum = 0.0;
        for (parameter, weight) in &file.weights {
            if !weight.is_finite() || *weight < 0.0 || *weight > 1.0 {
                return Err(EngineError::configuration(format!(
                    "weight for {} must lie in [0, 1], got {}",
                    parameter, weight
                )));
            }
            if !thresholds.contains_key(parameter) {
                return Err(EngineError::configuration(format!(
                    "weight given for {} but it has no threshold",
                    parameter
                )));
            }
            weight_sum += weight;
        }
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::configuration(format!(
                "feasibility weights sum to {}, expected 1.0",
                weight_sum
            )));
        }

        let bands = file.bands;
        if !(0.0..=100.0).contains(&bands.minor_adjustments_min)
            || !(0.0..=100.0).contains(&bands.ready_min)
            || bands.minor_adjustments_min > bands.ready_min
        {
            return Err(EngineError::configuration(format!(
                "feasibility bands out of order: ready={} minor={}",
                bands.ready_min, bands.minor_adjustments_min
            )));
        }

        let mut rules = FxHashMap::default();
        for rule in file.rules {
            let key = (rule.parameter, rule.direction);
            if rules.insert(key, rule).is_some() {
                return Err(EngineError::configuration(format!(
                    "duplicate rule for {} ({})",
                    key.0,
                    key.1.as_str()
                )));
            }
        }

        let rulebook = Self {
            crop: file.crop,
            thresholds,
            weights: file.weights,
            bands,
            rules,
            fertilizer_schedule: file.fertilizer_schedule,
        };

        // Gaps only fail when the missing status is actually observed
        for (parameter, direction) in rulebook.coverage_gaps() {
            tracing::warn!(
                "Rulebook '{}' has no rule for {} ({})",
                rulebook.crop,
                parameter,
                direction.as_str()
            );
        }

        Ok(rulebook)
    }

    pub fn crop(&self) -> &str {
        &self.crop
    }

    pub fn bands(&self) -> FeasibilityBands {
        self.bands
    }

    pub fn threshold(&self, parameter: Parameter) -> EngineResult<&Threshold> {
        self.thresholds.get(&parameter).ok_or_else(|| {
            EngineError::configuration(format!("no threshold registered for {}", parameter))
        })
    }

    /// Thresholds in canonical parameter order
    pub fn thresholds(&self) -> impl Iterator<Item = &Threshold> {
        Parameter::ALL.iter().filter_map(move |p| self.thresholds.get(p))
    }

    pub fn rule(&self, parameter: Parameter, direction: Direction) -> Option<&Rule> {
        self.rules.get(&(parameter, direction))
    }

    /// Weight for a parameter; parameters without a weight count as 0
    pub fn weight(&self, parameter: Parameter) -> f64 {
        self.weights.get(&parameter).copied().unwrap_or(0.0)
    }

    pub fn weights(&self) -> &FxHashMap<Parameter, f64> {
        &self.weights
    }

    pub fn fertilizer_schedule(&self) -> &[FertilizerStage] {
        &self.fertilizer_schedule
    }

    /// (parameter, direction) pairs with a threshold but no remediation rule
    pub fn coverage_gaps(&self) -> Vec<(Parameter, Direction)> {
        let mut gaps = Vec::new();
        for parameter in Parameter::ALL {
            if !self.thresholds.contains_key(&parameter) {
                continue;
            }
            for direction in [Direction::Low, Direction::High] {
                if !self.rules.contains_key(&(parameter, direction)) {
                    gaps.push((parameter, direction));
                }
            }
        }
        gaps
    }
}
