//! Fatal-at-startup error taxonomy.
//!
//! Everything in this enum aborts the search before it begins; nodes are
//! never downgraded to these at probe time. Compare with
//! `pumpsched_solver::error::SimulationError`, which *is* a per-probe,
//! recoverable failure.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("pump not found in network model: {0}")]
    MissingPump(String),

    #[error("tank not found in network model: {0}")]
    MissingTank(String),

    #[error("node not found in network model: {0}")]
    MissingNode(String),

    #[error("required pattern not found in network model: {0}")]
    MissingPricePattern(String),

    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),

    #[error("invalid actuation cap: {0}")]
    InvalidActuationCap(String),
}
