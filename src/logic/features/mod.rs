//! Features Module - Feature Derivation
//!
//! Turns clean readings into the model input. Owns derived-feature
//! recomputation so the power invariant holds for every consumer.

pub mod layout;
pub mod vector;
pub mod preprocess;
pub mod summary;

#[cfg(test)]
mod tests;

pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{batch_matrix, feature_matrix, FeatureVector};
pub use preprocess::preprocess;
pub use summary::{column_statistics, ColumnStats};
