//! `SearchObserver`: the collaborator interface carved out of the original
//! rich-table/plotting code so the driver stays free of presentation
//! concerns. The no-op implementation is used whenever tracing is disabled
//! (and by every test); `TracingObserver` is the ambient-logging
//! instantiation used by the CLI.

use std::fmt;

/// Why a branch was abandoned, passed to `SearchObserver::on_prune` so a
/// host can report pruning statistics without the driver knowing how they
/// are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneReason {
    /// Realized cost already meets or exceeds the incumbent.
    Cost,
    /// `PressureFeasible` failed.
    Pressure,
    /// `TankLevelFeasible` failed.
    TankLevel,
    /// Terminal `StabilityFeasible` failed.
    Stability,
    /// C3's actuation-cap rejection.
    ActuationCap,
    /// The hydraulic simulator reported a failure for this probe.
    SimulationFailed,
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cost => "cost",
            Self::Pressure => "pressure",
            Self::TankLevel => "tank-level",
            Self::Stability => "stability",
            Self::ActuationCap => "actuation-cap",
            Self::SimulationFailed => "simulation-failed",
        };
        f.write_str(label)
    }
}

/// Observer hooks invoked by C5 (and, transitively, C6). Implementations
/// must be cheap and must not block: they are called once per probe on the
/// worker's own thread.
pub trait SearchObserver: Send + Sync {
    /// A node was visited: hour `h`, count-vector prefix `y`, realized cost.
    fn on_probe(&self, _h: usize, _y: &[usize], _cost: f64) {}

    /// A branch was pruned for `reason` at hour `h`.
    fn on_prune(&self, _h: usize, _reason: PruneReason) {}

    /// A new incumbent was recorded.
    fn on_incumbent(&self, _cost: f64) {}
}

/// Default observer: does nothing. Used by every test and by the solver
/// crate's public API default so depending on `pumpsched-solver` alone never
/// pulls in a logging backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Logs probes at `trace`, prunes at `debug`, and incumbent updates at
/// `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_probe(&self, h: usize, y: &[usize], cost: f64) {
        tracing::trace!(hour = h, y = ?y, cost, "probe");
    }

    fn on_prune(&self, h: usize, reason: PruneReason) {
        tracing::debug!(hour = h, %reason, "prune");
    }

    fn on_incumbent(&self, cost: f64) {
        tracing::info!(cost, "new incumbent");
    }
}
