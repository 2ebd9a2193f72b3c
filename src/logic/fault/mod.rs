//! Fault Module
//!
//! Stage 2 of the cascade: label anomalous readings with a fault kind.
//!
//! ## Structure
//! - `types`: FaultType, Confidence, FaultClassification
//! - `classifier`: gate + classification logic
//!
//! ## Usage
//! ```ignore
//! use crate::logic::fault::{classify_verdict, FaultType};
//!
//! let result = classify_verdict(&classifier, &verdict, &features);
//! if result.fault_type == FaultType::ShortCircuit {
//!     // dispatch a crew
//! }
//! ```

pub mod types;
pub mod classifier;

pub use types::{Confidence, FaultClassification, FaultType};
pub use classifier::{classify, classify_verdict, try_classify};
