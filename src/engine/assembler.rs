//! Recommendation Assembler
//!
//! Turns a validated reading set into an ordered list of remediation steps.
//! Either every reading evaluates cleanly or the whole call fails; there is
//! no partial recommendation list.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::engine::aggregator::round2;
use crate::engine::evaluator::{evaluate, Evaluation, Status};
use crate::engine::selector::select_rule;
use crate::error::{EngineError, EngineResult};
use crate::readings::{Language, Parameter, ParameterReading};
use crate::rulebook::{Direction, Priority, Rule, Rulebook, Threshold};

/// One remediation step, decorated for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub parameter: Parameter,
    pub status: Status,
    pub issue: String,
    pub solution: String,
    pub dosage: String,
    pub timeline: String,
    pub organic_alternative: String,
    pub estimated_cost: String,
    pub priority: Priority,
    pub current_value: f64,
    pub target_range: String,
    pub deviation: f64,
    /// Deviation relative to the crossed reference threshold, in percent
    pub severity_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excess_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deficit_percentage: Option<f64>,
    /// Value lies beyond the low/high bound, not just outside the optimum
    pub critical: bool,
    pub action_urgency: &'static str,
    /// 1-based position after priority sort
    pub order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RecommendationSummary {
    pub optimal_parameters: usize,
    pub attention_needed: usize,
    pub critical_issues: usize,
}

/// Response payload for a soil improvement request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationReport {
    pub status: &'static str,
    pub crop_type: String,
    pub language: Language,
    pub count: usize,
    pub recommendations: Vec<Recommendation>,
    pub summary: RecommendationSummary,
}

/// Critical condition raised from a recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub parameter: Parameter,
    pub status: Status,
    pub current_value: f64,
    pub message: String,
}

impl RecommendationReport {
    /// One alert per critical recommendation, in recommendation order
    pub fn alerts(&self) -> Vec<Alert> {
        self.recommendations
            .iter()
            .filter(|r| r.critical)
            .map(|r| Alert {
                parameter: r.parameter,
                status: r.status,
                current_value: r.current_value,
                message: format!(
                    "{} critically {}: {:.1} (target {})",
                    r.parameter.label(),
                    r.status.as_str(),
                    r.current_value,
                    r.target_range
                ),
            })
            .collect()
    }
}

/// Evaluate, select and order recommendations for a reading set.
///
/// `readings` are evaluated in the order given; that order breaks priority
/// ties.
pub fn assemble(
    rulebook: &Rulebook,
    readings: &[ParameterReading],
    language: Language,
) -> EngineResult<RecommendationReport> {
    let mut seen = FxHashSet::default();
    let mut summary = RecommendationSummary::default();
    let mut recommendations = Vec::new();

    for reading in readings {
        if !seen.insert(reading.parameter) {
            return Err(EngineError::validation(
                reading.parameter.as_str(),
                "duplicate reading",
            ));
        }

        let threshold = rulebook.threshold(reading.parameter)?;
        let evaluation = evaluate(threshold, reading.value)?;
        tracing::debug!(
            "{} = {} -> {} (score {:.1})",
            reading.parameter,
            reading.value,
            evaluation.status.as_str(),
            evaluation.score
        );

        let Some(rule) = select_rule(rulebook, reading.parameter, evaluation.status)? else {
            summary.optimal_parameters += 1;
            continue;
        };

        let recommendation = decorate(rule, threshold, &evaluation, language);
        summary.attention_needed += 1;
        if recommendation.critical {
            summary.critical_issues += 1;
        }
        recommendations.push(recommendation);
    }

    // Stable: equal priorities keep evaluation order
    recommendations.sort_by_key(|r| r.priority.rank());
    for (idx, rec) in recommendations.iter_mut().enumerate() {
        rec.order = idx + 1;
    }

    Ok(RecommendationReport {
        status: "success",
        crop_type: rulebook.crop().to_string(),
        language,
        count: recommendations.len(),
        recommendations,
        summary,
    })
}

fn decorate(
    rule: &Rule,
    threshold: &Threshold,
    evaluation: &Evaluation,
    language: Language,
) -> Recommendation {
    let reference = match rule.direction {
        Direction::High => threshold.high_bound,
        Direction::Low => threshold.low_bound,
    };
    let severity = round2(evaluation.deviation / reference * 100.0);

    let (excess_percentage, deficit_percentage) = match rule.direction {
        Direction::High => (Some(severity), None),
        Direction::Low => (None, Some(severity)),
    };

    Recommendation {
        parameter: evaluation.parameter,
        status: evaluation.status,
        issue: rule.issue.get(language).to_string(),
        solution: rule.solution.get(language).to_string(),
        dosage: rule.dosage.clone(),
        timeline: rule.timeline.clone(),
        organic_alternative: rule.organic_alternative.clone(),
        estimated_cost: rule.cost_estimate.clone(),
        priority: rule.priority,
        current_value: evaluation.value,
        target_range: threshold.target_range(),
        deviation: round2(evaluation.deviation),
        severity_percentage: severity,
        excess_percentage,
        deficit_percentage,
        critical: threshold.is_critical(evaluation.value),
        action_urgency: rule.priority.action_urgency(),
        order: 0,
    }
}
