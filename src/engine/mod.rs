//! Soil Engine - coordinator for the recommendation pipeline
//!
//! reading set -> evaluator -> rule selector -> aggregator / assembler
//!
//! The engine owns nothing mutable. It holds the rulebook behind an `Arc`
//! so clones are cheap and any number of threads can score in parallel.

pub mod aggregator;
pub mod assembler;
pub mod evaluator;
pub mod feasibility;
pub mod selector;

pub use aggregator::{aggregate, round2};
pub use assembler::{assemble, Alert, Recommendation, RecommendationReport, RecommendationSummary};
pub use evaluator::{evaluate, Evaluation, Status};
pub use feasibility::{check_feasibility, CropRequirement, FeasibilityReport, ParameterBreakdown};
pub use selector::select_rule;

use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::readings::{Language, Parameter, ParameterReading, SoilImprovementRequest};
use crate::rulebook::{Rule, Rulebook};

#[derive(Debug, Clone)]
pub struct SoilEngine {
    rulebook: Arc<Rulebook>,
}

/// Latest readings for one field, as returned by the sensor store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub field_id: String,
    pub readings: Vec<ParameterReading>,
}

/// Outcome for one field in a batch assessment
#[derive(Debug, Clone, Serialize)]
pub struct FieldAssessment {
    pub field_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feasibility: Option<FeasibilityReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvements: Option<RecommendationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SoilEngine {
    pub fn new(rulebook: Rulebook) -> Self {
        Self {
            rulebook: Arc::new(rulebook),
        }
    }

    pub fn with_shared(rulebook: Arc<Rulebook>) -> Self {
        Self { rulebook }
    }

    pub fn rulebook(&self) -> &Rulebook {
        &self.rulebook
    }

    pub fn evaluate(&self, parameter: Parameter, value: f64) -> EngineResult<Evaluation> {
        evaluate(self.rulebook.threshold(parameter)?, value)
    }

    pub fn select_rule(&self, parameter: Parameter, status: Status) -> EngineResult<Option<&Rule>> {
        select_rule(&self.rulebook, parameter, status)
    }

    /// Aggregate with the rulebook's weights
    pub fn aggregate(&self, scores: &FxHashMap<Parameter, f64>) -> f64 {
        aggregate(scores, self.rulebook.weights())
    }

    pub fn assemble(
        &self,
        readings: &[ParameterReading],
        language: Language,
    ) -> EngineResult<RecommendationReport> {
        assemble(&self.rulebook, readings, language)
    }

    pub fn check_feasibility(&self, readings: &[ParameterReading]) -> EngineResult<FeasibilityReport> {
        check_feasibility(&self.rulebook, readings)
    }

    pub fn crop_requirements(&self) -> Vec<CropRequirement> {
        feasibility::crop_requirements(&self.rulebook)
    }

    /// Validate a raw soil improvement request and assemble its recommendations
    pub fn handle_request(&self, request: &SoilImprovementRequest) -> EngineResult<RecommendationReport> {
        let readings = request.readings()?;
        let report = self.assemble(&readings, request.language())?;

        tracing::info!(
            "Soil improvements for field {}: {} recommendation(s)",
            request.field_id.as_deref().unwrap_or("-"),
            report.count
        );
        Ok(report)
    }

    /// Feasibility + improvements for many fields in parallel.
    ///
    /// Fields fail independently; output order matches input order.
    pub fn assess_fields(&self, fields: &[FieldSnapshot], language: Language) -> Vec<FieldAssessment> {
        fields
            .par_iter()
            .map(|field| {
                let outcome = self
                    .check_feasibility(&field.readings)
                    .and_then(|f| Ok((f, self.assemble(&field.readings, language)?)));

                match outcome {
                    Ok((feasibility, improvements)) => FieldAssessment {
                        field_id: field.field_id.clone(),
                        feasibility: Some(feasibility),
                        improvements: Some(improvements),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!("Assessment failed for field {}: {}", field.field_id, e);
                        FieldAssessment {
                            field_id: field.field_id.clone(),
                            feasibility: None,
                            improvements: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SoilEngine {
        SoilEngine::new(Rulebook::builtin().unwrap())
    }

    #[test]
    fn test_handle_request_from_json() {
        let request = SoilImprovementRequest::from_json(
            r#"{"field_id": "f-1", "sensor_data": {"ph": 8.2}, "language": "xx"}"#,
        )
        .unwrap();
        let report = engine().handle_request(&request).unwrap();
        assert_eq!(report.count, 1);
        assert_eq!(report.language, Language::En);
    }

    #[test]
    fn test_assess_fields_keeps_order_and_isolates_failures() {
        let fields = vec![
            FieldSnapshot {
                field_id: "good".to_string(),
                readings: vec![ParameterReading::new(Parameter::Ph, 6.5)],
            },
            FieldSnapshot {
                field_id: "broken".to_string(),
                readings: vec![ParameterReading::new(Parameter::Ph, 12.0)],
            },
            FieldSnapshot {
                field_id: "acidic".to_string(),
                readings: vec![ParameterReading::new(Parameter::Ph, 5.0)],
            },
        ];

        let results = engine().assess_fields(&fields, Language::En);
        let ids: Vec<&str> = results.iter().map(|r| r.field_id.as_str()).collect();
        assert_eq!(ids, vec!["good", "broken", "acidic"]);

        assert!(results[0].error.is_none());
        assert!(results[1].error.as_ref().unwrap().contains("ph"));
        assert_eq!(results[2].improvements.as_ref().unwrap().count, 1);
    }

    #[test]
    fn test_engine_clones_share_rulebook() {
        let a = engine();
        let b = a.clone();
        assert!(std::ptr::eq(a.rulebook(), b.rulebook()));
    }
}
