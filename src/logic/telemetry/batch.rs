//! Batches
//!
//! Ordered collections of readings. Insertion order is temporal order
//! (most recent last).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::reading::{RawReading, Reading};

// ============================================================================
// COLUMNS
// ============================================================================

/// Columns a batch source can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Zone,
    Voltage,
    Current,
    Power,
    Timestamp,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Zone,
        Column::Voltage,
        Column::Current,
        Column::Power,
        Column::Timestamp,
    ];

    /// Columns a batch must declare to be validated
    pub const MANDATORY: [Column; 3] = [Column::Voltage, Column::Current, Column::Zone];

    /// External column name
    pub fn name(&self) -> &'static str {
        match self {
            Column::Zone => "zone",
            Column::Voltage => "tension",
            Column::Current => "courant",
            Column::Power => "puissance",
            Column::Timestamp => "timestamp",
        }
    }

    /// Resolve a header name (external name or English alias)
    pub fn from_name(name: &str) -> Option<Column> {
        match name.trim().to_lowercase().as_str() {
            "zone" => Some(Column::Zone),
            "tension" | "voltage" => Some(Column::Voltage),
            "courant" | "current" => Some(Column::Current),
            "puissance" | "power" => Some(Column::Power),
            "timestamp" | "horodatage" => Some(Column::Timestamp),
            _ => None,
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// RAW BATCH
// ============================================================================

/// Batch as delivered by a source, with its declared schema
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    columns: BTreeSet<Column>,
    readings: Vec<RawReading>,
}

impl RawBatch {
    /// In-memory batch, every column is declared
    pub fn new(readings: Vec<RawReading>) -> Self {
        Self {
            columns: Column::ALL.into_iter().collect(),
            readings,
        }
    }

    /// Batch with an explicit schema (e.g. from a CSV header)
    pub fn with_columns(columns: impl IntoIterator<Item = Column>, readings: Vec<RawReading>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
            readings,
        }
    }

    pub fn columns(&self) -> &BTreeSet<Column> {
        &self.columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub(crate) fn declare(&mut self, column: Column) {
        self.columns.insert(column);
    }

    pub fn readings(&self) -> &[RawReading] {
        &self.readings
    }

    pub fn into_readings(self) -> Vec<RawReading> {
        self.readings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawReading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl From<&Batch> for RawBatch {
    fn from(batch: &Batch) -> Self {
        RawBatch::new(batch.iter().map(RawReading::from).collect())
    }
}

// ============================================================================
// BATCH
// ============================================================================

/// Clean batch, every reading complete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    readings: Vec<Reading>,
}

impl Batch {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn push(&mut self, reading: Reading) {
        self.readings.push(reading);
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn into_readings(self) -> Vec<Reading> {
        self.readings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reading> {
        self.readings.iter()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl From<Vec<Reading>> for Batch {
    fn from(readings: Vec<Reading>) -> Self {
        Self::new(readings)
    }
}

impl FromIterator<Reading> for Batch {
    fn from_iter<I: IntoIterator<Item = Reading>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Reading;
    type IntoIter = std::slice::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.readings.iter()
    }
}
