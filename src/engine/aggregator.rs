//! Weighted Aggregator
//!
//! Combines per-parameter scores into a single feasibility score.
//! A parameter missing from `scores` contributes nothing; its weight is not
//! redistributed over the others.

use rustc_hash::FxHashMap;

use crate::readings::Parameter;

/// Weighted sum of scores, clamped to [0, 100].
///
/// Summed in canonical parameter order so the result does not depend on map
/// iteration order.
pub fn aggregate(scores: &FxHashMap<Parameter, f64>, weights: &FxHashMap<Parameter, f64>) -> f64 {
    let total: f64 = Parameter::ALL
        .iter()
        .filter_map(|p| {
            let weight = weights.get(p)?;
            let score = scores.get(p).copied().unwrap_or(0.0);
            Some(score.clamp(0.0, 100.0) * weight)
        })
        .sum();

    if total.is_finite() {
        total.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Two-decimal rounding for display
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
