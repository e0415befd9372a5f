//! Threshold Evaluator
//!
//! Places a reading relative to the crop's optimal band and scores it.
//! Same shape as an envelope comparison: below / within / above, plus the
//! distance from the nearest edge.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::readings::Parameter;
use crate::rulebook::{Direction, Threshold};

/// Where a reading sits relative to the optimal band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Low,
    Optimal,
    High,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Low => "low",
            Status::Optimal => "optimal",
            Status::High => "high",
        }
    }

    /// Side of the band needing remediation; `None` when optimal
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Status::Low => Some(Direction::Low),
            Status::Optimal => None,
            Status::High => Some(Direction::High),
        }
    }
}

/// Result of evaluating one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub parameter: Parameter,
    pub value: f64,
    pub status: Status,
    /// 0-100, 100 inside the band
    pub score: f64,
    /// Distance outside the band, 0 inside it
    pub deviation: f64,
}

/// Evaluate a value against a threshold.
///
/// Values outside the absolute sensor range are rejected, never clamped.
pub fn evaluate(threshold: &Threshold, value: f64) -> EngineResult<Evaluation> {
    threshold.check_absolute(value)?;

    let (status, deviation) = if value < threshold.optimal_min {
        (Status::Low, threshold.optimal_min - value)
    } else if value > threshold.optimal_max {
        (Status::High, value - threshold.optimal_max)
    } else {
        (Status::Optimal, 0.0)
    };

    Ok(Evaluation {
        parameter: threshold.parameter,
        value,
        status,
        score: deviation_score(deviation, threshold.band_width()),
        deviation,
    })
}

/// Linear penalty: one full band width away from the band scores 0
pub fn deviation_score(deviation: f64, band_width: f64) -> f64 {
    if deviation <= 0.0 {
        return 100.0;
    }
    (100.0 - deviation / band_width * 100.0).clamp(0.0, 100.0)
}
