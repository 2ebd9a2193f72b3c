//! Prediction Module
//!
//! Single-reading and streaming inference over both stages, with a
//! bounded history and windowed statistics.

pub mod types;
pub mod history;
pub mod stats;
pub mod service;

pub use types::{PredictionRecord, PredictionStatus};
pub use history::PredictionHistory;
pub use stats::PredictionStatistics;
pub use service::PredictionService;
