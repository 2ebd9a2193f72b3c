//! Telemetry Module
//!
//! Grid readings and batches, the data shape every pipeline stage consumes.
//!
//! ## Structure
//! - `reading.rs` - `Reading` / `RawReading` + power and range helpers
//! - `batch.rs` - `Batch` / `RawBatch` + declared `Column` schema

pub mod reading;
pub mod batch;

pub use reading::{compute_power, current_in_range, voltage_in_range, RawReading, Reading};
pub use batch::{Batch, Column, RawBatch};
