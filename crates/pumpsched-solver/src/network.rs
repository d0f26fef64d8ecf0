//! The subset of the network model the core needs exposed, independent of
//! whatever backend owns the real model. Kept deliberately thin: the
//! backend crate owns `.inp` parsing and pattern storage.

use pumpsched_core::PumpSet;

/// Per-tank bounds taken from the `.INP` file. `init_level` doubles as the
/// terminal-stability floor.
#[derive(Debug, Clone, PartialEq)]
pub struct TankConfig {
    pub id: String,
    pub init_level: f64,
    pub min_level: f64,
    pub max_level: f64,
}

/// Everything the core needs to know about the network beyond the pump
/// set: used by `pumpsched_solver::feasibility` and as a constructor
/// argument for a `SimulatorAdapter::Model`.
pub trait NetworkModel {
    fn pumps(&self) -> &PumpSet;
    fn tanks(&self) -> &[TankConfig];
}
