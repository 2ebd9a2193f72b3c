//! Configuration module
//!
//! Read from environment variables with typed fallbacks.
//! The binary loads `.env` first (dotenvy), library code never does.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    APP_NAME, CLASSIFIER_MODEL_FILE, DEFAULT_DATA_PATH, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_SAMPLE_SIZE, DEFAULT_SEED, SCORER_MODEL_FILE,
};

/// Where batches come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Simulated data set (CSV on disk or generated)
    Simulation,
    /// Live SCADA acquisition
    Realtime,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Simulation => "simulation",
            RunMode::Realtime => "realtime",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulation" | "sim" => Ok(RunMode::Simulation),
            "realtime" | "real-time" | "live" => Ok(RunMode::Realtime),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Batch source mode
    pub mode: RunMode,

    /// Simulation data set (CSV)
    pub data_path: PathBuf,

    /// Anomaly scorer artifact
    pub scorer_model_path: PathBuf,

    /// Fault classifier artifact
    pub classifier_model_path: PathBuf,

    /// Prediction service rolling history size
    pub history_capacity: usize,

    /// Number of readings the simulated source generates
    pub sample_size: usize,

    /// Seed for training and simulation
    pub seed: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let model_dir = default_model_dir();

        Self {
            mode: env::var("GRID_MODE")
                .ok()
                .and_then(|m| match m.parse() {
                    Ok(mode) => Some(mode),
                    Err(e) => {
                        log::warn!("GRID_MODE ignored: {}", e);
                        None
                    }
                })
                .unwrap_or(RunMode::Simulation),

            data_path: env::var("GRID_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),

            scorer_model_path: env::var("GRID_SCORER_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| model_dir.join(SCORER_MODEL_FILE)),

            classifier_model_path: env::var("GRID_CLASSIFIER_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| model_dir.join(CLASSIFIER_MODEL_FILE)),

            history_capacity: env::var("GRID_HISTORY_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|c| *c > 0)
                .unwrap_or(DEFAULT_HISTORY_CAPACITY),

            sample_size: env::var("GRID_SAMPLE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SAMPLE_SIZE),

            seed: env::var("GRID_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_SEED),
        }
    }

    /// Check if running against live acquisition
    pub fn is_realtime(&self) -> bool {
        self.mode == RunMode::Realtime
    }
}

impl Default for Config {
    fn default() -> Self {
        let model_dir = default_model_dir();
        Self {
            mode: RunMode::Simulation,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            scorer_model_path: model_dir.join(SCORER_MODEL_FILE),
            classifier_model_path: model_dir.join(CLASSIFIER_MODEL_FILE),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

/// Default directory for model artifacts
pub fn default_model_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("models")
}
