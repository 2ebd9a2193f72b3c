//! Dataset Module - Training Data & CSV Exchange
//!
//! - `record`: labeled reading for training
//! - `generator`: seeded synthetic grid data
//! - `csv_io`: batch input, labeled sets, annotated batch / alert export

pub mod record;
pub mod generator;
pub mod csv_io;

pub use record::LabeledReading;
pub use generator::{generate, generate_at};
pub use csv_io::{
    create_file, load_labeled, load_raw_batch, read_labeled, read_raw_batch, timestamped_path,
    write_alerts, write_labeled, write_scored, DatasetError,
};
