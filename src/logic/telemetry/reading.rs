//! Grid Readings
//!
//! One timestamped voltage/current/power sample from a zone.
//! `RawReading` is what a source hands over (any field may be missing),
//! `Reading` is what the pipeline scores (every field present).
//!
//! Serialized column names follow the source data set:
//! `tension` (V), `courant` (A), `puissance` (kW).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{CURRENT_MAX, CURRENT_MIN, POWER_EPSILON, VOLTAGE_MAX, VOLTAGE_MIN};

// ============================================================================
// PHYSICS
// ============================================================================

/// Power in kW from voltage (V) and current (A)
pub fn compute_power(voltage: f64, current: f64) -> f64 {
    voltage * current / 1000.0
}

/// Voltage inside [180, 250] V
pub fn voltage_in_range(voltage: f64) -> bool {
    (VOLTAGE_MIN..=VOLTAGE_MAX).contains(&voltage)
}

/// Current inside [0, 30] A
pub fn current_in_range(current: f64) -> bool {
    (CURRENT_MIN..=CURRENT_MAX).contains(&current)
}

// ============================================================================
// READING
// ============================================================================

/// Complete reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub zone: String,
    #[serde(rename = "tension")]
    pub voltage: f64,
    #[serde(rename = "courant")]
    pub current: f64,
    #[serde(rename = "puissance")]
    pub power: f64,
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Build a reading, power is always derived
    pub fn new(zone: impl Into<String>, voltage: f64, current: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            zone: zone.into(),
            voltage,
            current,
            power: compute_power(voltage, current),
            timestamp,
        }
    }

    /// Power matches voltage x current / 1000
    pub fn is_power_consistent(&self) -> bool {
        (self.power - compute_power(self.voltage, self.current)).abs() < POWER_EPSILON
    }

    /// Voltage and current inside their physical ranges
    pub fn is_in_range(&self) -> bool {
        voltage_in_range(self.voltage) && current_in_range(self.current)
    }
}

// ============================================================================
// RAW READING
// ============================================================================

/// Reading as delivered by a source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub zone: Option<String>,
    #[serde(rename = "tension")]
    pub voltage: Option<f64>,
    #[serde(rename = "courant")]
    pub current: Option<f64>,
    #[serde(rename = "puissance")]
    pub power: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawReading {
    pub fn new(zone: impl Into<String>, voltage: f64, current: f64) -> Self {
        Self {
            zone: Some(zone.into()),
            voltage: Some(voltage),
            current: Some(current),
            power: None,
            timestamp: None,
        }
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = Some(power);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Every field present
    pub fn is_complete(&self) -> bool {
        self.zone.is_some()
            && self.voltage.is_some()
            && self.current.is_some()
            && self.power.is_some()
            && self.timestamp.is_some()
    }

    /// Convert to a complete reading, `None` if any field is missing
    pub fn to_reading(&self) -> Option<Reading> {
        Some(Reading {
            zone: self.zone.clone()?,
            voltage: self.voltage?,
            current: self.current?,
            power: self.power?,
            timestamp: self.timestamp?,
        })
    }
}

impl From<Reading> for RawReading {
    fn from(r: Reading) -> Self {
        Self {
            zone: Some(r.zone),
            voltage: Some(r.voltage),
            current: Some(r.current),
            power: Some(r.power),
            timestamp: Some(r.timestamp),
        }
    }
}

impl From<&Reading> for RawReading {
    fn from(r: &Reading) -> Self {
        r.clone().into()
    }
}
