//! Validation Module
//!
//! First pipeline stage: owns the cleaning decision for a batch.
//!
//! - `validate`: range checks, power/timestamp completion, row drops
//! - `quality`: advisory data-quality issues

pub mod validate;
pub mod quality;

pub use validate::{validate, validate_at, ValidationError};
pub use quality::{detect_quality_issues, IssueKind, QualityIssue};
