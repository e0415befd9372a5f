//! Classifier Output Interpretation
//!
//! Post-processing of the disease classifier's softmax output. The model runs
//! elsewhere; this module only turns its probability vector into a detection
//! summary.

use serde::{Deserialize, Serialize};

use super::DiseaseBook;
use crate::engine::round2;
use crate::error::{EngineError, EngineResult};

/// Confidence above which a detection is reported as critical
const CRITICAL_CONFIDENCE: f64 = 0.95;
/// Confidence above which the class's baseline severity applies
const BASELINE_CONFIDENCE: f64 = 0.85;
const MEDIUM_CONFIDENCE: f64 = 0.70;
/// Affected area is never reported above this percentage
const MAX_AFFECTED_AREA: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

/// One catalogued remedy for a disease class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassTreatment {
    /// Chemical, Fungicide, Organic, Cultural, ...
    pub kind: String,
    pub name: String,
    pub description: String,
    pub dosage: String,
    pub frequency: String,
}

/// One output class of the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseClass {
    pub index: usize,
    pub name: String,
    pub scientific_name: String,
    pub baseline_severity: SeverityLevel,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub causes: Vec<String>,
    #[serde(default)]
    pub treatments: Vec<ClassTreatment>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Key of the severity-tiered treatment rule covering this class, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_key: Option<String>,
}

impl DiseaseClass {
    /// Severity scaled by confidence; a healthy class never escalates
    pub fn severity_for(&self, confidence: f64) -> SeverityLevel {
        if self.baseline_severity == SeverityLevel::None {
            return SeverityLevel::None;
        }
        if confidence > CRITICAL_CONFIDENCE {
            SeverityLevel::Critical
        } else if confidence > BASELINE_CONFIDENCE {
            self.baseline_severity
        } else if confidence > MEDIUM_CONFIDENCE {
            SeverityLevel::Medium
        } else {
            SeverityLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub disease_class: usize,
    pub disease_name: String,
    pub scientific_name: String,
    pub confidence: f64,
    pub severity: SeverityLevel,
    pub affected_area_percentage: f64,
    /// Confidence fell under the configured model threshold
    pub below_threshold: bool,
    pub description: String,
    pub symptoms: Vec<String>,
    pub causes: Vec<String>,
    pub treatments: Vec<ClassTreatment>,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_key: Option<String>,
}

/// Interpret a probability vector against the book's class catalog.
///
/// Ties resolve to the lowest class index.
pub fn interpret_prediction(
    book: &DiseaseBook,
    probabilities: &[f64],
    confidence_threshold: f64,
) -> EngineResult<Detection> {
    let classes = book.classes();
    if probabilities.len() != classes.len() {
        return Err(EngineError::validation(
            "probabilities",
            format!("expected {} class scores, got {}", classes.len(), probabilities.len()),
        ));
    }
    if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(EngineError::validation(
            "probabilities",
            "must be finite and non-negative",
        ));
    }

    let (class_id, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (idx, p)| {
            if p > best.1 {
                (idx, p)
            } else {
                best
            }
        });

    let class = classes
        .get(class_id)
        .ok_or_else(|| EngineError::validation("probabilities", "empty prediction"))?;

    let detection = Detection {
        disease_class: class_id,
        disease_name: class.name.clone(),
        scientific_name: class.scientific_name.clone(),
        confidence: (confidence * 10_000.0).round() / 10_000.0,
        severity: class.severity_for(confidence),
        affected_area_percentage: round2((confidence * 100.0).min(MAX_AFFECTED_AREA)),
        below_threshold: confidence < confidence_threshold,
        description: class.description.clone(),
        symptoms: class.symptoms.clone(),
        causes: class.causes.clone(),
        treatments: class.treatments.clone(),
        recommendations: class.recommendations.clone(),
        treatment_key: class.treatment_key.clone(),
    };

    tracing::info!(
        "Detected {} ({:.2}% confidence, {:?})",
        detection.disease_name,
        confidence * 100.0,
        detection.severity
    );

    Ok(detection)
}
