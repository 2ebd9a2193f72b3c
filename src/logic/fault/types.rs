//! Fault Types
//!
//! Core types for fault classification.
//! No logic here, only data structures.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// FAULT TYPE
// ============================================================================

/// Kind of electrical fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FaultType {
    /// No fault (reading not anomalous)
    #[serde(rename = "OK")]
    Ok,
    ShortCircuit,
    Overload,
    LineCut,
    /// Classifier could not decide
    Unknown,
    /// Inference failed for this reading
    Error,
}

impl FaultType {
    /// Fault labels a classifier can be trained on
    pub const FAULTS: [FaultType; 3] = [FaultType::ShortCircuit, FaultType::Overload, FaultType::LineCut];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaultType::Ok => "OK",
            FaultType::ShortCircuit => "ShortCircuit",
            FaultType::Overload => "Overload",
            FaultType::LineCut => "LineCut",
            FaultType::Unknown => "Unknown",
            FaultType::Error => "Error",
        }
    }

    /// Label used by the field data sets
    pub fn label_fr(&self) -> &'static str {
        match self {
            FaultType::Ok => "OK",
            FaultType::ShortCircuit => "Court-circuit",
            FaultType::Overload => "Surcharge",
            FaultType::LineCut => "Ligne coupée",
            FaultType::Unknown => "Inconnu",
            FaultType::Error => "Erreur",
        }
    }

    pub fn is_fault(&self) -> bool {
        !matches!(self, FaultType::Ok)
    }
}

impl std::fmt::Display for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FaultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let fault = match label.to_lowercase().as_str() {
            "ok" | "normal" => FaultType::Ok,
            "court-circuit" | "shortcircuit" | "short-circuit" | "short_circuit" => FaultType::ShortCircuit,
            "surcharge" | "overload" => FaultType::Overload,
            "ligne coupée" | "ligne coupee" | "linecut" | "line-cut" | "line_cut" => FaultType::LineCut,
            "inconnu" | "unknown" => FaultType::Unknown,
            "erreur" | "error" => FaultType::Error,
            _ => return Err(format!("unknown fault label '{}'", label)),
        };
        Ok(fault)
    }
}

// ============================================================================
// CONFIDENCE
// ============================================================================

/// Confidence of a fault label, tagged by where it came from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Confidence {
    /// Max class-membership probability of the classifier
    Calibrated(f64),
    /// Placeholder when no probabilities are available (or on failure)
    Fallback(f64),
}

impl Confidence {
    pub fn value(&self) -> f64 {
        match self {
            Confidence::Calibrated(p) | Confidence::Fallback(p) => *p,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, Confidence::Calibrated(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Confidence::Calibrated(_) => "calibrated",
            Confidence::Fallback(_) => "fallback",
        }
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

/// Fault label of one reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultClassification {
    pub fault_type: FaultType,
    /// Absent for non-anomalous readings
    pub confidence: Option<Confidence>,
}

impl FaultClassification {
    /// Non-anomalous reading
    pub fn ok() -> Self {
        Self {
            fault_type: FaultType::Ok,
            confidence: None,
        }
    }

    /// Classifier failed, label undecided
    pub fn unknown() -> Self {
        Self {
            fault_type: FaultType::Unknown,
            confidence: Some(Confidence::Fallback(0.0)),
        }
    }

    /// Inference failed before classification
    pub fn error() -> Self {
        Self {
            fault_type: FaultType::Error,
            confidence: Some(Confidence::Fallback(0.0)),
        }
    }
}

impl Default for FaultClassification {
    fn default() -> Self {
        Self::ok()
    }
}
