use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::fault::FaultType;

/// Operator triage priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criticality {
    Critical,
    High,
    Moderate,
}

impl Criticality {
    /// Higher = more urgent
    pub fn level(&self) -> u8 {
        match self {
            Criticality::Critical => 3,
            Criticality::High => 2,
            Criticality::Moderate => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::Critical => "Critical",
            Criticality::High => "High",
            Criticality::Moderate => "Moderate",
        }
    }

    pub fn label_fr(&self) -> &'static str {
        match self {
            Criticality::Critical => "Critique",
            Criticality::High => "Élevée",
            Criticality::Moderate => "Modérée",
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Alert raised for one anomalous reading. Rebuilt on every run, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub zone: String,
    pub fault_type: FaultType,
    pub criticality: Criticality,
    /// Position of the reading in the scored batch
    pub reading_index: usize,
    pub timestamp: DateTime<Utc>,
}
