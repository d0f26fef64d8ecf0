//! # pumpsched-solver
//!
//! Branch-and-bound search engine for the hourly pump-activation problem.
//!
//! This crate implements C1 (the `SimulatorAdapter` trait only; concrete
//! backends live elsewhere, e.g. `pumpsched-epanet`) through C6:
//!
//! - [`simulator`]: the `SimulatorAdapter` trait and `SimResult` (C1)
//! - [`cost`]: the pump-energy cost formula, generic over any `SimResult`
//! - [`feasibility`]: pressure / tank-level / stability predicates (C2)
//! - [`assigner`]: count -> per-pump activation translation (C3)
//! - [`counter`]: the iterative lexicographic search counter (C4)
//! - [`driver`]: the outer B&B loop and incumbent tracking (C5)
//! - [`orchestrator`]: task splitting and the parallel worker pool (C6)
//!
//! See `DESIGN.md` at the workspace root for the full module contracts.

pub mod assigner;
pub mod cost;
pub mod counter;
pub mod driver;
pub mod error;
pub mod feasibility;
pub mod network;
pub mod orchestrator;
pub mod simulator;

pub use assigner::{apply_actuation, AssignError};
pub use cost::{pump_cost, CostConfig, PumpEfficiency};
pub use counter::SearchCounter;
pub use driver::{run_search, BbDriver};
pub use error::SimulationError;
pub use feasibility::{
    pressure_feasible, stability_feasible, tank_level_feasible, ConstraintConfig, TankConfig,
};
pub use network::NetworkModel;
pub use orchestrator::{BbTask, ParallelOrchestrator};
pub use simulator::{PumpTimestepSample, SimResult, SimulatorAdapter};

pub use pumpsched_core::{
    ActivationMatrix, ActuationProfile, CoreError, CountVector, Horizon, Incumbent, NoopObserver,
    PruneReason, PumpId, PumpSet, SearchObserver, SearchOutcome, SharedIncumbent, TracingObserver,
};
