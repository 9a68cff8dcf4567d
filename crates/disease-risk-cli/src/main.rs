mod render;
mod settings;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use disease_risk_core::{FeatureInput, FeatureVector, FileClassifier, RiskAssessor, RuleTable};
use render::{render_report, render_rules, OutputFormat};
use settings::Settings;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "disease-risk",
    author,
    version,
    about = "Diabetes risk assessment from eight health measurements"
)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON) with `model_path` / `rules_path`
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Classifier model artifact, overrides configuration
    #[arg(long = "model", value_name = "FILE", global = true)]
    model: Option<PathBuf>,

    /// Rule table (yaml, yml, json or json5), overrides configuration
    #[arg(long = "rules", value_name = "FILE", global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assess one patient and print the risk report
    Assess {
        /// Eight values: pregnancies glucose blood_pressure skin_thickness insulin bmi
        /// diabetes_pedigree_function age
        #[arg(value_name = "VALUE", allow_negative_numbers = true)]
        values: Vec<String>,

        /// JSON input file (array or named record); `-` reads stdin
        #[arg(long, value_name = "FILE", conflicts_with = "values")]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// List the active rule table
    ListRules {
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,
    },
    /// Load the classifier artifact and report whether it is usable
    Health,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?.with_overrides(cli.model, cli.rules);
    debug!(?settings, "resolved settings");
    match cli.command.unwrap_or(Commands::ListRules {
        format: OutputFormat::Human,
    }) {
        Commands::Assess {
            values,
            input,
            format,
        } => assess(&settings, &values, input.as_deref(), format)?,
        Commands::ListRules { format } => list_rules(&settings, format)?,
        Commands::Health => health(&settings)?,
    }
    Ok(())
}

fn assess(
    settings: &Settings,
    values: &[String],
    input: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let features = read_features(values, input)?;
    let rules = load_rules(settings)?;
    let classifier = Arc::new(FileClassifier::new(&settings.model_path));
    let assessor = RiskAssessor::with_rules(classifier, rules);
    let report = assessor
        .build_report_for(&features)
        .context("risk assessment failed")?;
    print!("{}", render_report(&report, format)?);
    Ok(())
}

fn read_features(values: &[String], input: Option<&Path>) -> Result<FeatureVector> {
    let features = match input {
        Some(path) => {
            let raw = if path == Path::new("-") {
                let mut raw = String::new();
                io::stdin()
                    .read_to_string(&mut raw)
                    .context("failed to read input from stdin")?;
                raw
            } else {
                fs::read_to_string(path)
                    .with_context(|| format!("failed to read input file {}", path.display()))?
            };
            FeatureInput::from_json(&raw).and_then(FeatureInput::into_vector)
        }
        None if values.is_empty() => {
            bail!("provide eight values or --input <FILE>")
        }
        None => FeatureVector::parse(values),
    };
    features.context("invalid input")
}

fn load_rules(settings: &Settings) -> Result<RuleTable> {
    match &settings.rules_path {
        Some(path) => RuleTable::from_path(path),
        None => Ok(RuleTable::default()),
    }
}

fn list_rules(settings: &Settings, format: OutputFormat) -> Result<()> {
    let table = load_rules(settings)?;
    print!("{}", render_rules(&table, format)?);
    Ok(())
}

fn health(settings: &Settings) -> Result<()> {
    println!("Checking model {}", settings.model_path.display());
    let classifier = FileClassifier::new(&settings.model_path);
    let model = classifier.model()?;
    println!(
        "ok: {} ({} features, threshold {})",
        model.model_version.as_deref().unwrap_or("unversioned"),
        model.feature_names.len(),
        model.threshold
    );
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}
