//! Disease treatment tables
//!
//! Companion to the soil rulebook for the disease side of the advisory:
//! - `treatment.rs` - severity-specific treatment lookup by disease name
//! - `classification.rs` - interpretation of the external classifier's
//!   probability vector (argmax, severity, affected area)
//!
//! Inference itself happens outside this crate.

pub mod classification;
pub mod treatment;

pub use classification::{
    interpret_prediction, ClassTreatment, DiseaseClass, Detection, SeverityLevel,
};
pub use treatment::{TreatmentAdvice, TreatmentPlan, TreatmentRule, TreatmentSeverity};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};

const BUILTIN_DISEASE_BOOK: &str = include_str!("../../data/disease_book.json");

#[derive(Debug, Deserialize)]
struct DiseaseBookFile {
    treatments: FxHashMap<String, TreatmentRule>,
    classes: Vec<DiseaseClass>,
}

/// Treatment rules and classifier class catalog
#[derive(Debug, Clone)]
pub struct DiseaseBook {
    treatments: FxHashMap<String, TreatmentRule>,
    /// Indexed by classifier output position
    classes: Vec<DiseaseClass>,
}

impl DiseaseBook {
    pub fn builtin() -> EngineResult<Self> {
        Self::from_json_str(BUILTIN_DISEASE_BOOK)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read disease book: {:?}", path))?;
        let book = Self::from_json_str(&contents)
            .with_context(|| format!("Invalid disease book: {:?}", path))?;
        Ok(book)
    }

    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let file: DiseaseBookFile = serde_json::from_str(raw).map_err(|e| {
            EngineError::configuration(format!("malformed disease book JSON: {}", e))
        })?;

        let mut classes = file.classes;
        classes.sort_by_key(|c| c.index);
        for (position, class) in classes.iter().enumerate() {
            if class.index != position {
                return Err(EngineError::configuration(format!(
                    "disease classes must be numbered 0..{} without gaps (found {} at position {})",
                    classes.len(),
                    class.index,
                    position
                )));
            }
        }

        // Lookup keys are normalized the same way as incoming names
        let treatments: FxHashMap<String, TreatmentRule> = file
            .treatments
            .into_iter()
            .map(|(key, rule)| (treatment::disease_key(&key), rule))
            .collect();

        for class in &mut classes {
            if let Some(key) = class.treatment_key.as_mut() {
                *key = treatment::disease_key(key);
                if !treatments.contains_key(key.as_str()) {
                    return Err(EngineError::configuration(format!(
                        "class '{}' links to unknown treatment '{}'",
                        class.name, key
                    )));
                }
            }
        }

        Ok(Self { treatments, classes })
    }

    pub fn treatment(&self, disease_name: &str) -> Option<&TreatmentRule> {
        self.treatments.get(&treatment::disease_key(disease_name))
    }

    pub fn classes(&self) -> &[DiseaseClass] {
        &self.classes
    }

    /// Case-insensitive lookup by display name, e.g. "white spot"
    pub fn class_by_name(&self, name: &str) -> Option<&DiseaseClass> {
        let wanted = name.trim();
        self.classes
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
    }

    /// Severity-tiered treatment rule linked to a classifier class
    pub fn treatment_for_class(&self, class: &DiseaseClass) -> Option<&TreatmentRule> {
        class
            .treatment_key
            .as_deref()
            .and_then(|key| self.treatments.get(key))
    }

    /// Registered treatment keys, sorted
    pub fn diseases(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.treatments.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
