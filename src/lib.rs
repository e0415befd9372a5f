//! Soil Advisor
//!
//! Rule engine behind the chilli advisory service: turns soil sensor readings
//! into a feasibility score and an ordered list of improvement actions.
//!
//! Module layout:
//! - `readings`: parameters, typed readings, request parsing and validation
//! - `rulebook/`: thresholds, weights, banding and remediation rules (JSON)
//! - `engine/`: evaluator, rule selector, aggregator, assembler, feasibility
//! - `schedule`: fertilizer schedule scaled to field area
//! - `treatments/`: disease treatment lookup and classifier post-processing
//! - `config`: environment configuration
//! - `error`: engine error type
//!
//! Everything is synchronous and pure; a `SoilEngine` can be shared across
//! threads freely.

pub mod config;
pub mod engine;
pub mod error;
pub mod readings;
pub mod rulebook;
pub mod schedule;
pub mod treatments;

// Re-export commonly used types
pub use config::AdvisorConfig;
pub use engine::{
    FeasibilityReport, FieldAssessment, FieldSnapshot, Recommendation, RecommendationReport,
    SoilEngine, Status,
};
pub use error::{EngineError, EngineResult};
pub use readings::{Language, Parameter, ParameterReading, SoilImprovementRequest};
pub use rulebook::Rulebook;
pub use schedule::{fertilizer_schedule, FertilizerSchedule};
pub use treatments::{DiseaseBook, TreatmentSeverity};
