//! Source Module - Where Batches Come From
//!
//! Simulation mode reads the configured CSV data set, or generates one
//! when the file does not exist. Live SCADA acquisition is not provided
//! here: realtime mode fails at the boundary with `SourceError::Unavailable`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::logic::config::Config;
use crate::logic::dataset::{generator, load_raw_batch, DatasetError};
use crate::logic::telemetry::{RawBatch, RawReading};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Source read failed: {0}")]
    Read(#[from] DatasetError),
}

/// Anything that can hand the pipeline a raw batch
pub trait BatchSource: Send {
    fn name(&self) -> &str;

    fn fetch(&mut self) -> Result<RawBatch, SourceError>;
}

// ============================================================================
// SIMULATED
// ============================================================================

/// Synthetic readings, a new seed on every fetch
pub struct SimulatedSource {
    sample_size: usize,
    seed: u64,
}

impl SimulatedSource {
    pub fn new(sample_size: usize, seed: u64) -> Self {
        Self { sample_size, seed }
    }
}

impl BatchSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    fn fetch(&mut self) -> Result<RawBatch, SourceError> {
        let readings: Vec<RawReading> = generator::generate(self.sample_size, self.seed)
            .into_iter()
            .map(|l| RawReading::from(l.reading))
            .collect();
        self.seed = self.seed.wrapping_add(1);
        Ok(RawBatch::new(readings))
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Batch read from a CSV file on every fetch
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&mut self) -> Result<RawBatch, SourceError> {
        let batch = load_raw_batch(&self.path)?;
        log::debug!("Loaded {} readings from {}", batch.len(), self.path.display());
        Ok(batch)
    }
}

/// Source for the configured mode
pub fn open_source(config: &Config) -> Result<Box<dyn BatchSource>, SourceError> {
    if config.is_realtime() {
        return Err(SourceError::Unavailable(
            "realtime acquisition needs an external SCADA connector".to_string(),
        ));
    }

    if config.data_path.exists() {
        log::info!("Simulation data: {}", config.data_path.display());
        return Ok(Box::new(CsvSource::new(&config.data_path)));
    }

    log::info!(
        "No data set at {}, generating {} readings",
        config.data_path.display(),
        config.sample_size
    );
    Ok(Box::new(SimulatedSource::new(config.sample_size, config.seed)))
}
