//! Central Configuration Constants
//!
//! Single source of truth for physical limits and pipeline defaults.
//! To change a default, only edit this file.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name (also used as the data directory name)
pub const APP_NAME: &str = "grid-fault";

// ============================================
// Physical limits
// ============================================

/// Lowest acceptable voltage (V), network tolerance
pub const VOLTAGE_MIN: f64 = 180.0;

/// Highest acceptable voltage (V)
pub const VOLTAGE_MAX: f64 = 250.0;

/// Lowest acceptable current (A)
pub const CURRENT_MIN: f64 = 0.0;

/// Highest acceptable current (A), standard breaker rating
pub const CURRENT_MAX: f64 = 30.0;

// ============================================
// Detection
// ============================================

/// Anomaly score below this value flags the reading
pub const ANOMALY_SCORE_THRESHOLD: f64 = -0.5;

/// Confidence reported when the classifier has no probabilistic output
pub const FALLBACK_CONFIDENCE: f64 = 0.7;

/// Std deviation under which a sensor column is reported as stale
pub const LOW_VARIANCE_STD: f64 = 0.1;

/// Tolerance used when checking the power invariant
pub const POWER_EPSILON: f64 = 1e-9;

// ============================================
// Prediction service
// ============================================

/// Rolling history capacity of the prediction service
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

// ============================================
// Training / simulation
// ============================================

/// Default seed for model training and the simulated source
pub const DEFAULT_SEED: u64 = 42;

/// Default number of simulated readings
pub const DEFAULT_SAMPLE_SIZE: usize = 500;

/// Share of simulated readings carrying a fault
pub const DEFAULT_FAULT_RATE: f64 = 0.08;

/// Zones used by the simulated source
pub const ZONES: &[&str] = &["Nord", "Sud", "Est", "Ouest", "Centre"];

/// Spacing between simulated readings (minutes)
pub const SIMULATION_STEP_MINUTES: i64 = 5;

// ============================================
// Paths
// ============================================

/// Default simulation dataset
pub const DEFAULT_DATA_PATH: &str = "data/data.csv";

/// Anomaly scorer artifact file name
pub const SCORER_MODEL_FILE: &str = "anomaly_detector.json";

/// Fault classifier artifact file name
pub const CLASSIFIER_MODEL_FILE: &str = "classifier.json";
