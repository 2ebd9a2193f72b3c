//! Alert Module
//!
//! Derives operator alerts from a scored batch.

pub mod types;
pub mod engine;

pub use types::{Alert, Criticality};
pub use engine::{criticality_for, generate_alerts, AlertSummary};
