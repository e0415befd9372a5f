//! Feasibility check
//!
//! Scores every reading, aggregates the weighted score and bands it.

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::engine::aggregator::{aggregate, round2};
use crate::engine::evaluator::{evaluate, Status};
use crate::error::{EngineError, EngineResult};
use crate::readings::{Parameter, ParameterReading};
use crate::rulebook::{FeasibilityStatus, Rulebook};

/// Per-parameter line of the feasibility breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterBreakdown {
    pub parameter: Parameter,
    pub value: f64,
    pub required_min: f64,
    pub required_max: f64,
    pub score: f64,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityReport {
    pub crop_type: String,
    pub feasibility_score: f64,
    pub status: FeasibilityStatus,
    pub status_text: &'static str,
    pub breakdown: Vec<ParameterBreakdown>,
}

/// Optimal band per parameter, as exposed by the crop requirements lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropRequirement {
    pub parameter: Parameter,
    pub optimal_min: f64,
    pub optimal_max: f64,
    pub unit: String,
    pub weight: f64,
}

pub fn check_feasibility(
    rulebook: &Rulebook,
    readings: &[ParameterReading],
) -> EngineResult<FeasibilityReport> {
    let mut scores = FxHashMap::default();
    let mut breakdown = Vec::with_capacity(readings.len());

    for reading in readings {
        let threshold = rulebook.threshold(reading.parameter)?;
        let evaluation = evaluate(threshold, reading.value)?;

        if scores.insert(reading.parameter, evaluation.score).is_some() {
            return Err(EngineError::validation(
                reading.parameter.as_str(),
                "duplicate reading",
            ));
        }

        breakdown.push(ParameterBreakdown {
            parameter: reading.parameter,
            value: reading.value,
            required_min: threshold.optimal_min,
            required_max: threshold.optimal_max,
            score: round2(evaluation.score),
            status: evaluation.status,
        });
    }

    let score = round2(aggregate(&scores, rulebook.weights()));
    let status = rulebook.bands().classify(score);

    tracing::debug!(
        "Feasibility for {}: {:.2} ({})",
        rulebook.crop(),
        score,
        status.display_text()
    );

    Ok(FeasibilityReport {
        crop_type: rulebook.crop().to_string(),
        feasibility_score: score,
        status,
        status_text: status.display_text(),
        breakdown,
    })
}

pub fn crop_requirements(rulebook: &Rulebook) -> Vec<CropRequirement> {
    rulebook
        .thresholds()
        .map(|t| CropRequirement {
            parameter: t.parameter,
            optimal_min: t.optimal_min,
            optimal_max: t.optimal_max,
            unit: t.unit.clone(),
            weight: rulebook.weight(t.parameter),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_midpoints_are_ready() {
        let rulebook = Rulebook::builtin().unwrap();
        let readings: Vec<ParameterReading> = rulebook
            .thresholds()
            .map(|t| ParameterReading::new(t.parameter, t.midpoint()))
            .collect();

        let report = check_feasibility(&rulebook, &readings).unwrap();
        assert_relative_eq!(report.feasibility_score, 100.0);
        assert_eq!(report.status, FeasibilityStatus::ReadyForSowing);
        assert_eq!(report.breakdown.len(), 7);
    }

    #[test]
    fn test_missing_ph_weight_is_wasted() {
        let rulebook = Rulebook::builtin().unwrap();
        let readings: Vec<ParameterReading> = rulebook
            .thresholds()
            .filter(|t| t.parameter != Parameter::Ph)
            .map(|t| ParameterReading::new(t.parameter, t.midpoint()))
            .collect();

        let report = check_feasibility(&rulebook, &readings).unwrap();
        assert_relative_eq!(report.feasibility_score, 75.0);
        assert_eq!(report.status, FeasibilityStatus::ReadyForSowing);
    }

    #[test]
    fn test_poor_soil_needs_improvement() {
        let rulebook = Rulebook::builtin().unwrap();
        let readings = vec![
            ParameterReading::new(Parameter::Ph, 4.2),
            ParameterReading::new(Parameter::Nitrogen, 20.0),
            ParameterReading::new(Parameter::Moisture, 20.0),
        ];
        let report = check_feasibility(&rulebook, &readings).unwrap();
        assert_eq!(report.status, FeasibilityStatus::NeedsSignificantImprovement);
        assert!(report.breakdown.iter().all(|b| b.status == Status::Low));
    }

    #[test]
    fn test_requirements_listed_in_order() {
        let rulebook = Rulebook::builtin().unwrap();
        let reqs = crop_requirements(&rulebook);
        assert_eq!(reqs.len(), 7);
        assert_eq!(reqs[0].parameter, Parameter::Ph);
        assert_relative_eq!(reqs[0].weight, 0.25);
        assert_relative_eq!(reqs[6].weight, 0.0);
    }
}
