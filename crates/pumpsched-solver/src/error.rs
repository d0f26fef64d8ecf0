//! Per-probe error taxonomy. Unlike `pumpsched_core::CoreError`, these
//! never abort the search: the driver downgrades every variant here to an
//! infeasible node and continues.

use thiserror::Error;

/// The hydraulic simulator failed to converge, or referenced an identifier
/// that does not exist in the network model, while evaluating a probe.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("simulation failed at hour {hour}: {reason}")]
pub struct SimulationError {
    pub hour: usize,
    pub reason: String,
}

impl SimulationError {
    pub fn new(hour: usize, reason: impl Into<String>) -> Self {
        Self {
            hour,
            reason: reason.into(),
        }
    }
}
