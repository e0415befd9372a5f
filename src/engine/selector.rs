//! Rule Selector
//!
//! Maps an evaluated status to its remediation rule. A missing rule for a
//! status that actually occurred is a rulebook defect and fails the call.

use crate::engine::evaluator::Status;
use crate::error::{EngineError, EngineResult};
use crate::readings::Parameter;
use crate::rulebook::{Rule, Rulebook};

/// `Ok(None)` for optimal readings, the registered rule otherwise
pub fn select_rule<'a>(
    rulebook: &'a Rulebook,
    parameter: Parameter,
    status: Status,
) -> EngineResult<Option<&'a Rule>> {
    let Some(direction) = status.direction() else {
        return Ok(None);
    };

    match rulebook.rule(parameter, direction) {
        Some(rule) => Ok(Some(rule)),
        None => {
            tracing::error!(
                "Rulebook '{}' is missing the {} rule for {}",
                rulebook.crop(),
                direction.as_str(),
                parameter
            );
            Err(EngineError::missing_rule(parameter, direction))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rulebook::{Direction, Priority};
    use serde_json::Value;

    #[test]
    fn test_optimal_selects_nothing() {
        let rulebook = Rulebook::builtin().unwrap();
        assert!(select_rule(&rulebook, Parameter::Ph, Status::Optimal)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_each_direction_has_its_own_rule() {
        let rulebook = Rulebook::builtin().unwrap();
        let low = select_rule(&rulebook, Parameter::Nitrogen, Status::Low)
            .unwrap()
            .unwrap();
        let high = select_rule(&rulebook, Parameter::Nitrogen, Status::High)
            .unwrap()
            .unwrap();

        assert_eq!(low.direction, Direction::Low);
        assert_eq!(high.direction, Direction::High);
        assert!(low.issue.en.contains("deficiency"));
        assert!(high.issue.en.contains("Excess"));
    }

    #[test]
    fn test_ph_high_is_high_priority() {
        let rulebook = Rulebook::builtin().unwrap();
        let rule = select_rule(&rulebook, Parameter::Ph, Status::High)
            .unwrap()
            .unwrap();
        assert_eq!(rule.priority, Priority::High);
        assert!(rule.issue.en.contains("alkaline"));
    }

    #[test]
    fn test_missing_rule_fails_loudly() {
        let mut raw: Value =
            serde_json::from_str(include_str!("../../data/chilli_rulebook.json")).unwrap();
        raw["rules"]
            .as_array_mut()
            .unwrap()
            .retain(|r| r["parameter"] != "potassium");
        let rulebook = Rulebook::from_json_str(&raw.to_string()).unwrap();

        let err = select_rule(&rulebook, Parameter::Potassium, Status::Low).unwrap_err();
        assert!(err.is_configuration());

        // Not observed, not an error
        assert!(select_rule(&rulebook, Parameter::Potassium, Status::Optimal).is_ok());
    }
}
