//! Disease advisory integration tests
//!
//! Classifier output -> detection -> treatment plan, using the built-in book.

use soil_advisor::config::DEFAULT_CONFIDENCE_THRESHOLD;
use soil_advisor::treatments::{interpret_prediction, SeverityLevel};
use soil_advisor::{DiseaseBook, EngineError, Language, TreatmentSeverity};

#[test]
fn test_detection_to_treatment() {
    let book = DiseaseBook::builtin().unwrap();

    let detection = interpret_prediction(
        &book,
        &[0.01, 0.97, 0.01, 0.0, 0.01, 0.0],
        DEFAULT_CONFIDENCE_THRESHOLD,
    )
    .unwrap();
    assert_eq!(detection.disease_name, "Cercospora Leaf Spot");
    assert_eq!(detection.severity, SeverityLevel::Critical);
    assert!(!detection.below_threshold);

    assert_eq!(detection.treatments[0].name, "Mancozeb");
    assert!(!detection.recommendations.is_empty());

    let severity = if detection.severity >= SeverityLevel::High {
        TreatmentSeverity::High
    } else {
        TreatmentSeverity::Low
    };
    let key = detection.treatment_key.as_deref().unwrap();
    let advice = book.recommend_treatment(key, severity, Language::En).unwrap();
    assert_eq!(advice.disease, "Leaf Spot");
    assert_eq!(advice.severity, TreatmentSeverity::High);
    assert!(!advice.prevention.is_empty());
}

#[test]
fn test_every_listed_disease_has_both_plans() {
    let book = DiseaseBook::builtin().unwrap();
    for disease in book.diseases() {
        for severity in [TreatmentSeverity::Low, TreatmentSeverity::High] {
            let advice = book.recommend_treatment(disease, severity, Language::Hi).unwrap();
            assert!(!advice.treatment.is_empty());
            assert!(!advice.disease.is_empty());
        }
    }
}

#[test]
fn test_treatment_errors() {
    let book = DiseaseBook::builtin().unwrap();

    let blank = book.recommend_treatment("  ", TreatmentSeverity::Low, Language::En);
    assert!(blank.unwrap_err().is_validation());

    let unknown = book.recommend_treatment("blight", TreatmentSeverity::Low, Language::En);
    assert!(matches!(unknown, Err(EngineError::UnknownDisease(_))));
}
