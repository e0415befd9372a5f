// Soil advisor command line
//
// Usage: soil_advisor recommend field.json
//        soil_advisor schedule --area 2.5 --language hi

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soil_advisor::readings::validate_sensor_reading;
use soil_advisor::treatments::interpret_prediction;
use soil_advisor::{
    fertilizer_schedule, AdvisorConfig, FieldSnapshot, Language, SoilImprovementRequest,
    TreatmentSeverity,
};

#[derive(Debug, Parser)]
#[command(name = "soil_advisor", version, about = "Soil feasibility and recommendation engine")]
struct Cli {
    /// Response language (en, hi); defaults to DEFAULT_LANGUAGE
    #[arg(long, global = true)]
    language: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ordered improvement recommendations for one field snapshot
    Recommend { snapshot: PathBuf },
    /// Weighted feasibility score for one field snapshot
    Feasibility { snapshot: PathBuf },
    /// Feasibility and recommendations for a JSON array of field snapshots
    Assess { fields: PathBuf },
    /// Optimal band and weight per parameter
    Requirements,
    /// Treatment plan for a named disease
    Treatment {
        disease: String,
        #[arg(long, default_value = "low")]
        severity: String,
    },
    /// Fertilizer schedule scaled to a field area in hectares
    Schedule {
        #[arg(long)]
        area: f64,
    },
    /// Interpret a classifier probability vector
    Classify {
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        probabilities: Vec<f64>,
    },
}

/// CLI output wrapper; the engine's own reports carry no timestamp
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    timestamp: DateTime<Utc>,
    result: T,
}

fn emit<T: Serialize>(body: T) -> Result<()> {
    let envelope = Envelope {
        timestamp: Utc::now(),
        result: body,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn read_request(path: &Path) -> Result<SoilImprovementRequest> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot: {:?}", path))?;
    let request = SoilImprovementRequest::from_json(&raw)
        .with_context(|| format!("Invalid snapshot: {:?}", path))?;
    Ok(request)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soil_advisor=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AdvisorConfig::from_env();
    let language = match cli.language.as_deref() {
        Some(code) => Language::resolve(Some(code)),
        None => config.default_language,
    };

    tracing::debug!("Configuration: {:?}", config);

    match cli.command {
        Command::Recommend { snapshot } => {
            let engine = config.build_engine()?;
            let mut request = read_request(&snapshot)?;
            if request.language.is_none() || cli.language.is_some() {
                request.language = Some(language.code().to_string());
            }
            let readings = request.readings()?;
            validate_sensor_reading(&readings, engine.rulebook())?;
            emit(engine.handle_request(&request)?)
        }
        Command::Feasibility { snapshot } => {
            let engine = config.build_engine()?;
            let readings = read_request(&snapshot)?.readings()?;
            validate_sensor_reading(&readings, engine.rulebook())?;
            emit(engine.check_feasibility(&readings)?)
        }
        Command::Assess { fields } => {
            let engine = config.build_engine()?;
            let raw = fs::read_to_string(&fields)
                .with_context(|| format!("Failed to read field snapshots: {:?}", fields))?;
            let snapshots: Vec<FieldSnapshot> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid field snapshots: {:?}", fields))?;
            tracing::info!("Assessing {} field(s)", snapshots.len());
            emit(engine.assess_fields(&snapshots, language))
        }
        Command::Requirements => {
            let engine = config.build_engine()?;
            emit(engine.crop_requirements())
        }
        Command::Treatment { disease, severity } => {
            let book = config.load_disease_book()?;
            let severity = TreatmentSeverity::resolve(Some(severity.as_str()));
            emit(book.recommend_treatment(&disease, severity, language)?)
        }
        Command::Schedule { area } => {
            let rulebook = config.load_rulebook()?;
            emit(fertilizer_schedule(&rulebook, area, language)?)
        }
        Command::Classify { probabilities } => {
            let book = config.load_disease_book()?;
            emit(interpret_prediction(
                &book,
                &probabilities,
                config.confidence_threshold,
            )?)
        }
    }
}
