//! C1, Simulator Adapter.
//!
//! The hydraulic engine itself is an external collaborator; this trait is
//! the contract the driver programs against. A concrete implementation
//! (e.g. `pumpsched-epanet::EpanetAdapter`) owns the actual simulator
//! handle and translates `write_activations`/`run_up_to` into calls against
//! it. Tests in this crate use a hand-rolled `FakeSimulatorAdapter`.

use std::collections::HashMap;

use crate::error::SimulationError;
use pumpsched_core::{ActivationMatrix, Horizon};

/// One pump's flow and head samples for a single simulated timestep `t`,
/// as needed by the cost integral: `energy(pump, t) = flowrate *
/// (head_end - head_start) * rho * g / efficiency`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpTimestepSample {
    /// Flowrate through the pump during timestep `t`, m^3/s.
    pub flowrate: f64,
    /// Head at the start of the timestep, m.
    pub head_start: f64,
    /// Head at the end of the timestep, m.
    pub head_end: f64,
}

/// Result of running the hydraulic simulation up to hour `h`. Indexed by
/// entity identifier; values are the simulation state at
/// simulation time `3600 * h` except `pump_samples`, which carries one
/// entry per reported timestep `t < h` for every pump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimResult {
    pub hour: Horizon,
    /// `pressure[node_id]` at `t = 3600h`, m.
    pub pressures: HashMap<String, f64>,
    /// `head[tank_id]` at `t = 3600h`, m (the tank level).
    pub tank_heads: HashMap<String, f64>,
    /// `pump_id -> per-timestep samples`, length `h` for every pump.
    pub pump_samples: HashMap<String, Vec<PumpTimestepSample>>,
}

impl SimResult {
    pub fn pressure(&self, node_id: &str) -> Option<f64> {
        self.pressures.get(node_id).copied()
    }

    pub fn tank_head(&self, tank_id: &str) -> Option<f64> {
        self.tank_heads.get(tank_id).copied()
    }
}

/// C1's contract: write a hypothesized activation prefix into the model,
/// run the hydraulic simulation up to hour `h`, and report the result.
///
/// `Model` is the concrete network-model representation owned by the
/// backend (e.g. an open EPANET project handle, or a fixture struct in
/// tests); the solver core never inspects it directly.
pub trait SimulatorAdapter {
    type Model;

    /// Overwrite the model's per-pump pattern multiplier arrays at
    /// positions `0..h` with `x`'s rows `1..=h`. Positions `h..H` retain
    /// whatever value they held before; the simulator never reads them
    /// for an `h`-hour run.
    fn write_activations(&self, model: &mut Self::Model, x: &ActivationMatrix, h: Horizon);

    /// Run a steady-state hydraulic simulation with duration `3600 * h`
    /// seconds and report pressures, tank heads, and per-pump samples.
    fn run_up_to(
        &mut self,
        model: &mut Self::Model,
        h: Horizon,
    ) -> Result<SimResult, SimulationError>;
}
