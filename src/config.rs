//! Advisor configuration
//!
//! Read once at startup from environment variables, then passed explicitly.
//! Nothing in the engine reads the environment on its own.
//!
//! | Variable                     | Default            |
//! |------------------------------|--------------------|
//! | `SOIL_RULEBOOK_PATH`         | built-in chilli    |
//! | `DISEASE_BOOK_PATH`          | built-in           |
//! | `DEFAULT_LANGUAGE`           | `en`               |
//! | `MODEL_CONFIDENCE_THRESHOLD` | `0.80`             |

use std::path::PathBuf;

use anyhow::Result;

use crate::engine::SoilEngine;
use crate::readings::Language;
use crate::rulebook::Rulebook;
use crate::treatments::DiseaseBook;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.80;

#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub rulebook_path: Option<PathBuf>,
    pub disease_book_path: Option<PathBuf>,
    pub default_language: Language,
    pub confidence_threshold: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            rulebook_path: None,
            disease_book_path: None,
            default_language: Language::En,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; invalid values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let confidence_threshold = match non_empty("MODEL_CONFIDENCE_THRESHOLD") {
            None => DEFAULT_CONFIDENCE_THRESHOLD,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if (0.0..=1.0).contains(&v) => v,
                _ => {
                    tracing::warn!(
                        "Ignoring MODEL_CONFIDENCE_THRESHOLD={}, using {}",
                        raw,
                        DEFAULT_CONFIDENCE_THRESHOLD
                    );
                    DEFAULT_CONFIDENCE_THRESHOLD
                }
            },
        };

        Self {
            rulebook_path: non_empty("SOIL_RULEBOOK_PATH").map(PathBuf::from),
            disease_book_path: non_empty("DISEASE_BOOK_PATH").map(PathBuf::from),
            default_language: Language::resolve(non_empty("DEFAULT_LANGUAGE").as_deref()),
            confidence_threshold,
        }
    }

    pub fn load_rulebook(&self) -> Result<Rulebook> {
        match &self.rulebook_path {
            Some(path) => {
                tracing::info!("Loading rulebook from {:?}", path);
                Rulebook::load(path)
            }
            None => Ok(Rulebook::builtin()?),
        }
    }

    pub fn build_engine(&self) -> Result<SoilEngine> {
        let rulebook = self.load_rulebook()?;
        tracing::info!(
            "Rulebook ready: crop={}, {} thresholds",
            rulebook.crop(),
            rulebook.thresholds().count()
        );
        Ok(SoilEngine::new(rulebook))
    }

    pub fn load_disease_book(&self) -> Result<DiseaseBook> {
        match &self.disease_book_path {
            Some(path) => DiseaseBook::load(path),
            None => Ok(DiseaseBook::builtin()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AdvisorConfig::from_lookup(|_| None);
        assert_eq!(config, AdvisorConfig::default());
    }

    #[test]
    fn test_values_read() {
        let config = AdvisorConfig::from_lookup(lookup_from(&[
            ("SOIL_RULEBOOK_PATH", "/etc/advisor/rulebook.json"),
            ("DEFAULT_LANGUAGE", "hi"),
            ("MODEL_CONFIDENCE_THRESHOLD", "0.9"),
        ]));
        assert_eq!(
            config.rulebook_path,
            Some(PathBuf::from("/etc/advisor/rulebook.json"))
        );
        assert_eq!(config.default_language, Language::Hi);
        assert_eq!(config.confidence_threshold, 0.9);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AdvisorConfig::from_lookup(lookup_from(&[
            ("DEFAULT_LANGUAGE", "de"),
            ("MODEL_CONFIDENCE_THRESHOLD", "1.7"),
            ("DISEASE_BOOK_PATH", "  "),
        ]));
        assert_eq!(config.default_language, Language::En);
        assert_eq!(config.confidence_threshold, DEFAULT_CONFIDENCE_THRESHOLD);
        assert!(config.disease_book_path.is_none());
    }

    #[test]
    fn test_builtin_engine_builds() {
        let engine = AdvisorConfig::default().build_engine().unwrap();
        assert_eq!(engine.rulebook().crop(), "chilli");
    }
}
