//! B&B Driver. Composes C1-C4 into the outer search loop: asks the counter
//! for the next candidate, synthesizes the hour's activation row through
//! C3, runs the simulator, and applies the prune chain (cost, pressure,
//! level, terminal stability) before updating the incumbent. Instrumented
//! through `SearchObserver` rather than inline printing.

use pumpsched_core::{
    ActivationMatrix, ActuationProfile, Horizon, PruneReason, PumpSet, SearchObserver,
    SharedIncumbent,
};

use crate::assigner::apply_actuation_at;
use crate::cost::{pump_cost, CostConfig};
use crate::counter::SearchCounter;
use crate::feasibility::{
    pressure_feasible, stability_feasible, tank_level_feasible, ConstraintConfig,
};
use crate::simulator::SimulatorAdapter;

/// Everything the driver needs beyond the simulator and the counter: the
/// pump set (for sizing `X`/`A`), the per-pump actuation cap, and the
/// feasibility/cost configuration.
#[derive(Debug, Clone)]
pub struct BbDriver {
    pub pumps: PumpSet,
    pub actuation_cap: u32,
    pub constraints: ConstraintConfig,
    pub cost_config: CostConfig,
}

/// Run one full branch-and-bound search over `counter`'s box against the
/// shared incumbent, returning the exhausted counter (useful only for
/// diagnostics/tests; the incumbent itself is read back from `incumbent`
/// once every worker has returned).
///
/// `incumbent` is shared rather than owned so the same function serves
/// both the single-worker entry point and each orchestrator worker: a
/// worker that finds a better schedule publishes it immediately, so
/// sibling workers' cost prunes benefit from it on their very next probe.
pub fn run_search<A: SimulatorAdapter>(
    driver: &BbDriver,
    adapter: &mut A,
    model: &mut A::Model,
    mut counter: SearchCounter,
    incumbent: &SharedIncumbent,
    observer: &dyn SearchObserver,
) -> SearchCounter {
    let num_pumps = driver.pumps.len();
    let mut x = ActivationMatrix::new(counter.horizon(), num_pumps);
    let mut actuations = ActuationProfile::new(num_pumps);

    let mut feasible = true;
    if counter.take_pending_probe() {
        feasible = probe(
            driver,
            adapter,
            model,
            &mut counter,
            &mut x,
            &mut actuations,
            incumbent,
            observer,
        );
    }

    while counter.update(feasible) {
        feasible = probe(
            driver,
            adapter,
            model,
            &mut counter,
            &mut x,
            &mut actuations,
            incumbent,
            observer,
        );
    }

    counter
}

/// Evaluate the node the counter currently points at and return the
/// feasibility verdict `update` should be called with next (the outer
/// loop's body, extracted so both the pending-probe case and the
/// steady-state loop share it). Predicate order is cost, then pressure,
/// then level, then (terminal only) stability.
#[allow(clippy::too_many_arguments)]
fn probe<A: SimulatorAdapter>(
    driver: &BbDriver,
    adapter: &mut A,
    model: &mut A::Model,
    counter: &mut SearchCounter,
    x: &mut ActivationMatrix,
    actuations: &mut ActuationProfile,
    incumbent: &SharedIncumbent,
    observer: &dyn SearchObserver,
) -> bool {
    let h: Horizon = counter.h();
    let y_new = counter.y().get(h);
    let y_old = if h == 0 { 0 } else { counter.y().get(h - 1) };

    if h > 0 {
        actuations.recompute(x, h - 1);
        if apply_actuation_at(x, h, y_new, y_old, actuations, driver.actuation_cap).is_err() {
            observer.on_prune(h, PruneReason::ActuationCap);
            return false;
        }
        actuations.recompute(x, h);
    }

    adapter.write_activations(model, x, h);
    let result = match adapter.run_up_to(model, h) {
        Ok(result) => result,
        Err(_) => {
            observer.on_prune(h, PruneReason::SimulationFailed);
            return false;
        }
    };

    let cost = pump_cost(&result, &driver.cost_config);
    observer.on_probe(h, counter.y().prefix(h), cost);

    if cost >= incumbent.best_cost() {
        counter.jump_to_end(h);
        observer.on_prune(h, PruneReason::Cost);
        return false;
    }

    if !pressure_feasible(&result, &driver.constraints) {
        observer.on_prune(h, PruneReason::Pressure);
        return false;
    }
    if !tank_level_feasible(&result, &driver.constraints) {
        observer.on_prune(h, PruneReason::TankLevel);
        return false;
    }

    if h == counter.horizon() {
        if !stability_feasible(&result, &driver.constraints) {
            observer.on_prune(h, PruneReason::Stability);
            return false;
        }
        if incumbent.update_if_better(cost, counter.y().prefix(h)) {
            observer.on_incumbent(cost);
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::simulator::{PumpTimestepSample, SimResult};
    use crate::{cost::PumpEfficiency, network::TankConfig};
    use pumpsched_core::NoopObserver;
    use std::collections::HashMap;

    /// A table-driven stand-in for the hydraulic engine, an external
    /// collaborator this crate never implements directly. `Model` is the
    /// full activation-matrix prefix the driver has written so far, exactly
    /// as `write_activations` leaves it; `run_up_to` reads hour `h`'s row
    /// directly off it rather than through a side channel, so the fixture's
    /// behavior is driven only by the trait contract.
    struct FakeSimulatorAdapter {
        /// One pump, one critical node, one tank. `pressure_when_off`
        /// applies whenever the pump's row-`h` bit is `false`; otherwise
        /// the node is always comfortably above threshold.
        pressure_when_off: f64,
        pressure_when_on: f64,
        tank_head: f64,
        on_cost_per_hour: f64,
    }

    impl SimulatorAdapter for FakeSimulatorAdapter {
        type Model = ActivationMatrix;

        fn write_activations(&self, model: &mut Self::Model, x: &ActivationMatrix, h: Horizon) {
            for k in 0..h {
                model.set_row(k + 1, x.row(k + 1));
            }
        }

        fn run_up_to(
            &mut self,
            model: &mut Self::Model,
            h: Horizon,
        ) -> Result<SimResult, SimulationError> {
            // Pressure at the critical node reflects whether the tank was
            // refilled during hour 1; once the pump has run that hour,
            // pressure stays comfortable for the rest of the horizon
            // regardless of later hours' activation.
            let refilled = model.row(1)[0];
            let pressure = if refilled {
                self.pressure_when_on
            } else {
                self.pressure_when_off
            };

            let samples: Vec<PumpTimestepSample> = (1..=h)
                .map(|k| {
                    let on = model.row(k)[0];
                    PumpTimestepSample {
                        flowrate: if on { 0.05 } else { 0.0 },
                        head_start: 0.0,
                        head_end: if on { self.on_cost_per_hour } else { 0.0 },
                    }
                })
                .collect();

            Ok(SimResult {
                hour: h,
                pressures: HashMap::from([("55".to_string(), pressure)]),
                tank_heads: HashMap::from([("T1".to_string(), self.tank_head)]),
                pump_samples: HashMap::from([("pump-0".to_string(), samples)]),
            })
        }
    }

    fn constraints(pressure_min: f64) -> ConstraintConfig {
        ConstraintConfig {
            pressure_minima: HashMap::from([("55".to_string(), pressure_min)]),
            tanks: vec![TankConfig {
                id: "T1".to_string(),
                init_level: 0.0,
                min_level: -1e9,
                max_level: 1e9,
            }],
        }
    }

    fn driver(cap: u32, prices: Vec<f64>, pressure_min: f64) -> BbDriver {
        BbDriver {
            pumps: PumpSet::new(vec!["pump-0".to_string()]),
            actuation_cap: cap,
            constraints: constraints(pressure_min),
            cost_config: CostConfig {
                prices_cents_per_kwh: prices,
                efficiency: PumpEfficiency::Constant(1.0),
            },
        }
    }

    /// Trivial feasibility: no constraints bind, pump-off costs nothing,
    /// so the optimum is to never turn anything on.
    #[test]
    fn all_off_is_optimal_when_nothing_binds() {
        let mut adapter = FakeSimulatorAdapter {
            pressure_when_off: 1000.0,
            pressure_when_on: 1000.0,
            tank_head: 10.0,
            on_cost_per_hour: 10.0,
        };
        let d = driver(1, vec![1.0], -1e9);
        let counter = SearchCounter::new(1, 1);
        let incumbent = SharedIncumbent::new();
        let mut model = ActivationMatrix::new(1, 1);
        run_search(&d, &mut adapter, &mut model, counter, &incumbent, &NoopObserver);
        let snapshot = incumbent.snapshot();
        assert_eq!(snapshot.best_y, vec![0, 0]);
        assert_eq!(snapshot.best_cost, 0.0);
    }

    /// Cost-forced activation: pressure at hour 1 is only feasible with
    /// the pump on, so the incumbent must pay that hour's energy cost.
    #[test]
    fn pump_runs_when_required_for_pressure_despite_its_cost() {
        let mut adapter = FakeSimulatorAdapter {
            pressure_when_off: 0.0,
            pressure_when_on: 1000.0,
            tank_head: 10.0,
            on_cost_per_hour: 10.0,
        };
        let d = driver(1, vec![1.0, 1.0], 42.0);
        let counter = SearchCounter::new(2, 1);
        let incumbent = SharedIncumbent::new();
        let mut model = ActivationMatrix::new(2, 1);
        run_search(&d, &mut adapter, &mut model, counter, &incumbent, &NoopObserver);
        let snapshot = incumbent.snapshot();
        assert_eq!(snapshot.best_y, vec![0, 1, 0]);
        assert!(snapshot.best_cost > 0.0);
    }

    /// Stability guard: the only feasible path ends with the tank below
    /// its initial level, so no terminal visit is ever accepted.
    #[test]
    fn schedule_ending_below_initial_tank_level_is_rejected() {
        let mut adapter = FakeSimulatorAdapter {
            pressure_when_off: 1000.0,
            pressure_when_on: 1000.0,
            tank_head: -1.0, // always below init_level = 0.0
            on_cost_per_hour: 10.0,
        };
        let d = driver(1, vec![1.0], -1e9);
        let counter = SearchCounter::new(1, 1);
        let incumbent = SharedIncumbent::new();
        let mut model = ActivationMatrix::new(1, 1);
        run_search(&d, &mut adapter, &mut model, counter, &incumbent, &NoopObserver);
        assert!(!incumbent.snapshot().is_set());
    }
}
