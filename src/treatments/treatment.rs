use serde::{Deserialize, Serialize};

use super::DiseaseBook;
use crate::error::{EngineError, EngineResult};
use crate::readings::Language;
use crate::rulebook::LocalizedText;

/// Treatment steps for one severity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub treatment: String,
    pub chemical: String,
    pub organic: String,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentRule {
    pub disease: LocalizedText,
    pub severity_low: TreatmentPlan,
    pub severity_high: TreatmentPlan,
    pub prevention: String,
    pub cost_estimate: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentSeverity {
    #[default]
    Low,
    High,
}

impl TreatmentSeverity {
    /// Unknown severities fall back to the low-severity plan
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("high") => TreatmentSeverity::High,
            _ => TreatmentSeverity::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentAdvice {
    pub disease: String,
    pub severity: TreatmentSeverity,
    pub treatment: String,
    pub chemical_option: String,
    pub organic_option: String,
    pub frequency: String,
    pub prevention: String,
    pub estimated_cost: String,
}

/// "Powdery Mildew" -> "powdery_mildew"
pub fn disease_key(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

impl DiseaseBook {
    pub fn recommend_treatment(
        &self,
        disease_name: &str,
        severity: TreatmentSeverity,
        language: Language,
    ) -> EngineResult<TreatmentAdvice> {
        if disease_name.trim().is_empty() {
            return Err(EngineError::validation("disease_name", "is required"));
        }

        let rule = self
            .treatment(disease_name)
            .ok_or_else(|| EngineError::UnknownDisease(disease_name.to_string()))?;

        let plan = match severity {
            TreatmentSeverity::Low => &rule.severity_low,
            TreatmentSeverity::High => &rule.severity_high,
        };

        Ok(TreatmentAdvice {
            disease: rule.disease.get(language).to_string(),
            severity,
            treatment: plan.treatment.clone(),
            chemical_option: plan.chemical.clone(),
            organic_option: plan.organic.clone(),
            frequency: plan.frequency.clone(),
            prevention: rule.prevention.clone(),
            estimated_cost: rule.cost_estimate.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_normalization() {
        assert_eq!(disease_key("Powdery Mildew"), "powdery_mildew");
        assert_eq!(disease_key("  leaf_spot "), "leaf_spot");
    }

    #[test]
    fn test_high_severity_plan() {
        let book = DiseaseBook::builtin().unwrap();
        let advice = book
            .recommend_treatment("Anthracnose", TreatmentSeverity::High, Language::En)
            .unwrap();
        assert_eq!(advice.treatment, "Remove and destroy infected plants");
        assert_eq!(advice.estimated_cost, "₹800-1,500");
    }

    #[test]
    fn test_severity_fallback() {
        assert_eq!(TreatmentSeverity::resolve(Some("HIGH")), TreatmentSeverity::High);
        assert_eq!(TreatmentSeverity::resolve(Some("moderate")), TreatmentSeverity::Low);
        assert_eq!(TreatmentSeverity::resolve(None), TreatmentSeverity::Low);
    }

    #[test]
    fn test_unknown_disease() {
        let book = DiseaseBook::builtin().unwrap();
        let err = book
            .recommend_treatment("rust", TreatmentSeverity::Low, Language::En)
            .unwrap_err();
        assert_eq!(err, EngineError::UnknownDisease("rust".to_string()));
    }

    #[test]
    fn test_hindi_disease_name() {
        let book = DiseaseBook::builtin().unwrap();
        let advice = book
            .recommend_treatment("leaf spot", TreatmentSeverity::Low, Language::Hi)
            .unwrap();
        assert_eq!(advice.disease, "पत्ती धब्बा");
    }
}
