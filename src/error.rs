//! Engine error taxonomy
//!
//! Two failure classes cross the engine boundary:
//! - `Validation`: the caller sent something malformed or out of range.
//!   The whole request is rejected, nothing partial is returned.
//! - `Configuration`: the constant tables are inconsistent (missing rule,
//!   bad weights, unordered thresholds). A defect in the rulebook, surfaced
//!   to the caller and never papered over.
//!
//! An unsupported language code is not an error (see `Language::resolve`).

use thiserror::Error;

use crate::readings::Parameter;
use crate::rulebook::Direction;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed or out-of-range input, tagged with the offending field
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Constant tables are missing an entry or are internally inconsistent
    #[error("rulebook configuration error: {0}")]
    Configuration(String),

    /// Treatment lookup for a disease with no registered rule
    #[error("treatment information not available for {0}")]
    UnknownDisease(String),
}

impl EngineError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        EngineError::Configuration(message.into())
    }

    /// Missing remediation rule for a status that actually occurred
    pub fn missing_rule(parameter: Parameter, direction: Direction) -> Self {
        EngineError::Configuration(format!(
            "no rule registered for {} ({})",
            parameter.as_str(),
            direction.as_str()
        ))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = EngineError::validation("ph", "must be a number");
        assert_eq!(err.to_string(), "invalid ph: must be a number");
        assert!(err.is_validation());
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_missing_rule_is_configuration() {
        let err = EngineError::missing_rule(Parameter::Humidity, Direction::High);
        assert!(err.is_configuration());
        assert!(err.to_string().contains("humidity (high)"));
    }
}
