//! Grid Fault Core
//!
//! Anomaly detection and fault classification over electrical-grid
//! telemetry: validation, feature derivation, isolation-forest scoring,
//! random-forest fault typing and prioritized alerts.
//!
//! ## Usage
//! ```ignore
//! use grid_fault_core::logic::{pipeline, model::training::TrainedModels};
//!
//! let models = TrainedModels::load_or_train(&config, training_data)?;
//! let output = pipeline::run(&raw_batch, &models.scorer, &models.classifier)?;
//! for alert in &output.alerts {
//!     println!("{} {} {}", alert.zone, alert.fault_type, alert.criticality);
//! }
//! ```

pub mod constants;
pub mod logic;

pub use logic::error::{PipelineError, PipelineResult};
