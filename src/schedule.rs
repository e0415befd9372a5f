//! Fertilizer schedule
//!
//! Scales the rulebook's per-hectare lifecycle schedule to a field's area.

use serde::Serialize;

use crate::engine::round2;
use crate::error::{EngineError, EngineResult};
use crate::readings::Language;
use crate::rulebook::Rulebook;

/// Largest field accepted, in hectares
pub const MAX_FIELD_AREA_HA: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledFertilizer {
    pub name: String,
    pub dosage_per_ha: f64,
    pub unit: String,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledStage {
    pub stage: String,
    pub day: u32,
    pub fertilizers: Vec<ScheduledFertilizer>,
    pub application_method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerSchedule {
    pub crop_type: String,
    pub field_area: f64,
    pub schedule: Vec<ScheduledStage>,
}

pub fn fertilizer_schedule(
    rulebook: &Rulebook,
    field_area: f64,
    language: Language,
) -> EngineResult<FertilizerSchedule> {
    if !field_area.is_finite() || field_area <= 0.0 || field_area > MAX_FIELD_AREA_HA {
        return Err(EngineError::validation(
            "field_area",
            format!("must be between 0 and {} hectares", MAX_FIELD_AREA_HA),
        ));
    }

    let schedule = rulebook
        .fertilizer_schedule()
        .iter()
        .map(|stage| ScheduledStage {
            stage: stage.stage.get(language).to_string(),
            day: stage.day,
            fertilizers: stage
                .fertilizers
                .iter()
                .map(|f| ScheduledFertilizer {
                    name: f.name.clone(),
                    dosage_per_ha: f.dosage_per_ha,
                    unit: f.unit.clone(),
                    total_quantity: round2(f.dosage_per_ha * field_area),
                })
                .collect(),
            application_method: stage.application_method.clone(),
        })
        .collect();

    Ok(FertilizerSchedule {
        crop_type: rulebook.crop().to_string(),
        field_area,
        schedule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scaled_to_area() {
        let rulebook = Rulebook::builtin().unwrap();
        let plan = fertilizer_schedule(&rulebook, 1.5, Language::En).unwrap();

        assert_eq!(plan.schedule.len(), 3);
        let sowing = &plan.schedule[0];
        assert_eq!(sowing.day, 0);
        assert_eq!(sowing.fertilizers[0].name, "Urea");
        assert_relative_eq!(sowing.fertilizers[0].total_quantity, 37.5);
        assert_relative_eq!(sowing.fertilizers[1].total_quantity, 90.0);
    }

    #[test]
    fn test_area_validation() {
        let rulebook = Rulebook::builtin().unwrap();
        for area in [0.0, -2.0, 1000.5, f64::NAN] {
            assert!(fertilizer_schedule(&rulebook, area, Language::En)
                .unwrap_err()
                .is_validation());
        }
        assert!(fertilizer_schedule(&rulebook, 1000.0, Language::En).is_ok());
    }

    #[test]
    fn test_stage_names_localized() {
        let rulebook = Rulebook::builtin().unwrap();
        let plan = fertilizer_schedule(&rulebook, 1.0, Language::Hi).unwrap();
        assert_eq!(plan.schedule[0].stage, "बुवाई के समय");
    }
}
