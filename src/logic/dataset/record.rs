use serde::{Deserialize, Serialize};

use crate::logic::fault::FaultType;
use crate::logic::telemetry::Reading;

/// Reading with its ground-truth fault label, used for training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledReading {
    pub reading: Reading,
    pub fault: FaultType,
}

impl LabeledReading {
    pub fn new(reading: Reading, fault: FaultType) -> Self {
        Self { reading, fault }
    }

    pub fn is_fault(&self) -> bool {
        self.fault.is_fault()
    }
}
