//! Logic Module - Pipeline & Engines
//!
//! Data flows strictly:
//! raw readings -> validation -> features -> model (scorer) -> fault
//! (classifier) -> alert.
//!
//! ## Structure
//! - `telemetry/` - Reading and batch types
//! - `validation/` - Range checks, cleaning, data-quality issues
//! - `features/` - Feature layout, vectors, preprocessing, summaries
//! - `model/` - Isolation forest, random forest, artifacts, training
//! - `fault/` - Fault types, tagged confidence, classification stage
//! - `alert/` - Criticality mapping and alert generation
//! - `pipeline/` - Batch orchestration
//! - `prediction/` - Stateful single-reading service with rolling history
//! - `dataset/` - Synthetic generator and CSV I/O
//! - `source/` - Batch sources (simulation, CSV)

pub mod config;
pub mod error;

pub mod telemetry;
pub mod validation;
pub mod features;
pub mod model;
pub mod fault;
pub mod alert;
pub mod pipeline;
pub mod prediction;
pub mod dataset;
pub mod source;
