//! Grid Fault - Command Line Entry Point

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};

use grid_fault_core::constants::{APP_NAME, APP_VERSION};
use grid_fault_core::logic::alert::AlertSummary;
use grid_fault_core::logic::config::{Config, RunMode};
use grid_fault_core::logic::dataset::{
    create_file, generate, load_labeled, timestamped_path, write_alerts, write_labeled, write_scored,
    LabeledReading,
};
use grid_fault_core::logic::features::{column_statistics, preprocess};
use grid_fault_core::logic::model::{save_model, train_models, TrainedModels};
use grid_fault_core::logic::pipeline;
use grid_fault_core::logic::source::open_source;
use grid_fault_core::logic::telemetry::RawReading;
use grid_fault_core::logic::validation::validate;

#[derive(Parser)]
#[command(name = "grid-fault")]
#[command(about = "Grid telemetry anomaly detection and fault classification", long_about = None)]
struct Cli {
    /// Override GRID_MODE (simulation, realtime)
    #[arg(long, global = true)]
    mode: Option<RunMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic labeled data set
    Generate {
        /// Number of readings (default: GRID_SAMPLE_SIZE)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Output CSV (default: GRID_DATA_PATH)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train both models and write their artifacts
    Train {
        /// Labeled CSV (default: GRID_DATA_PATH, generated if absent)
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Run the full pipeline on one batch
    Run {
        /// Input CSV (default: configured source)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory for the annotated batch and alert exports
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Alerts to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Score and classify a single reading
    Predict {
        #[arg(short, long, default_value = "Nord")]
        zone: String,

        /// Voltage (V)
        #[arg(short, long)]
        voltage: f64,

        /// Current (A)
        #[arg(short, long)]
        current: f64,
    },
}

/// Labeled training data: the configured CSV if readable, generated otherwise
fn training_set(config: &Config, data: Option<&PathBuf>) -> Vec<LabeledReading> {
    let path = data.unwrap_or(&config.data_path);
    if path.exists() {
        match load_labeled(path) {
            Ok(rows) if !rows.is_empty() => {
                log::info!("Training on {} ({} rows)", path.display(), rows.len());
                return rows;
            }
            Ok(_) => log::warn!("{} holds no labeled rows, generating", path.display()),
            Err(e) => log::warn!("Cannot use {} for training ({}), generating", path.display(), e),
        }
    }
    generate(config.sample_size, config.seed)
}

fn run_generate(config: &Config, count: Option<usize>, output: Option<PathBuf>) -> anyhow::Result<()> {
    let count = count.unwrap_or(config.sample_size);
    let output = output.unwrap_or_else(|| config.data_path.clone());

    let rows = generate(count, config.seed);
    let faults = rows.iter().filter(|r| r.is_fault()).count();
    write_labeled(create_file(&output)?, &rows)
        .with_context(|| format!("writing {}", output.display()))?;

    println!("{} readings ({} faults) written to {}", rows.len(), faults, output.display());
    Ok(())
}

fn run_train(config: &Config, data: Option<PathBuf>) -> anyhow::Result<()> {
    let rows = training_set(config, data.as_ref());
    let models = train_models(&rows, config.seed)?;
    let fault_rows = rows.iter().filter(|r| r.is_fault()).count();

    save_model(&models.scorer, rows.len(), &config.scorer_model_path)
        .with_context(|| format!("saving {}", config.scorer_model_path.display()))?;
    save_model(&models.classifier, fault_rows, &config.classifier_model_path)
        .with_context(|| format!("saving {}", config.classifier_model_path.display()))?;

    println!("Scorer     -> {}", config.scorer_model_path.display());
    println!("Classifier -> {} ({} fault rows)", config.classifier_model_path.display(), fault_rows);
    Ok(())
}

fn run_pipeline(
    config: &Config,
    input: Option<PathBuf>,
    export: Option<PathBuf>,
    limit: usize,
) -> anyhow::Result<()> {
    let raw = match input {
        Some(path) => grid_fault_core::logic::dataset::load_raw_batch(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => open_source(config)?.fetch()?,
    };

    let models = TrainedModels::load_or_train(config, || training_set(config, None))?;
    if !models.is_verified() {
        println!("Note: models were trained in this run and are not validated yet");
    }

    let output = pipeline::run(&raw, &models.scorer, &models.classifier)?;

    if !output.quality_issues.is_empty() {
        println!("Data quality:");
        for issue in &output.quality_issues {
            println!("  - {}", issue);
        }
    }

    println!("\n{}", output.kpis());

    let clean = preprocess(&validate(&raw)?);
    for (column, stats) in column_statistics(&clean) {
        println!(
            "  {:<10} mean={:>8.2} std={:>6.2} min={:>8.2} max={:>8.2} median={:>8.2}",
            column, stats.mean, stats.std, stats.min, stats.max, stats.median
        );
    }

    let summary = AlertSummary::from_alerts(&output.alerts);
    if output.alerts.is_empty() {
        println!("\nNo alert: grid nominal");
    } else {
        println!(
            "\n{} alert(s): {} critical, {} high, {} moderate",
            summary.total, summary.critical, summary.high, summary.moderate
        );
        for alert in output.alerts.iter().take(limit) {
            println!(
                "  [{:<8}] {:<7} {:<13} {}",
                alert.criticality.label_fr(),
                alert.zone,
                alert.fault_type.label_fr(),
                alert.timestamp.format("%Y-%m-%d %H:%M")
            );
        }
        if output.alerts.len() > limit {
            println!("  ... {} more", output.alerts.len() - limit);
        }
    }

    if let Some(dir) = export {
        let now = Utc::now();
        let scored_path = timestamped_path(&dir, "predictions", now);
        let alerts_path = timestamped_path(&dir, "alerts", now);
        write_scored(create_file(&scored_path)?, &output.scored)?;
        write_alerts(create_file(&alerts_path)?, &output.alerts)?;
        println!("\nExported {} and {}", scored_path.display(), alerts_path.display());
    }

    Ok(())
}

fn run_predict(config: &Config, zone: String, voltage: f64, current: f64) -> anyhow::Result<()> {
    let models = TrainedModels::load_or_train(config, || training_set(config, None))?;
    let service = models.into_service(config.history_capacity);

    let record = service.predict(&RawReading::new(zone, voltage, current));
    println!("{}", serde_json::to_string_pretty(&record)?);

    if !record.is_success() {
        bail!(
            "prediction failed: {}",
            record.error_message.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }

    log::info!("Starting {} v{} ({} mode)", APP_NAME, APP_VERSION, config.mode);

    match cli.command {
        Commands::Generate { count, output } => run_generate(&config, count, output),
        Commands::Train { data } => run_train(&config, data),
        Commands::Run { input, export, limit } => run_pipeline(&config, input, export, limit),
        Commands::Predict { zone, voltage, current } => run_predict(&config, zone, voltage, current),
    }
}
