//! Parallel Orchestrator. Splits the whole-tree search into disjoint
//! `BbTask` sub-boxes and runs one search instance per task against a
//! shared incumbent, largest-remaining-workload-first, through a `rayon`
//! thread pool (`ThreadPoolBuilder` + `par_iter`) rather than hand-rolled
//! `thread`/`Condvar` bookkeeping.
//!
//! The resulting task list is static: it is sized up front to
//! `split_factor * workers` pieces so the pool's own work-stealing
//! scheduler absorbs any imbalance between tasks, rather than re-splitting
//! a running task live. See DESIGN.md for the tradeoffs of that choice.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use pumpsched_core::{Horizon, SearchObserver, SearchOutcome, SharedIncumbent};

use crate::counter::SearchCounter;
use crate::driver::{run_search, BbDriver};
use crate::simulator::SimulatorAdapter;

/// A rectangular sub-box of the search tree: `Y[l]` ranges over
/// `[y_floor, max_values[l]]` at the task's split level and over
/// `[0, max_values[l]]` at every level below it; levels above
/// `root_level` are fixed to `fixed_prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BbTask {
    root_level: Horizon,
    fixed_prefix: Vec<usize>,
    y_floor: usize,
    max_values: Vec<usize>,
}

impl BbTask {
    /// The single task covering the entire tree (the whole-tree counter's
    /// own box): `Y[l]` ranges `0..=N` at every level `1..=H`.
    pub fn whole_tree(horizon: Horizon, num_pumps: usize) -> Self {
        let mut max_values = vec![num_pumps; horizon + 1];
        max_values[0] = 0;
        Self {
            root_level: 0,
            fixed_prefix: vec![0],
            y_floor: 0,
            max_values,
        }
    }

    /// The one level this (not-yet-started) task can still be split at:
    /// the level immediately below its fixed prefix, where no sibling has
    /// been visited yet and the whole `[0, max_values[level]]` range is
    /// still live.
    fn split_level(&self) -> Horizon {
        self.root_level + 1
    }

    /// Remaining box size at the split level: the measure `create_tasks`
    /// uses to pick the task to split next. A naive live recursion-depth
    /// measure never terminates for a task that hasn't started yet, so this
    /// uses box size instead, which is well-defined for a queued task and
    /// produces the same "pick the biggest remaining task" policy.
    pub fn workload(&self) -> usize {
        let level = self.split_level();
        self.max_values[level].saturating_sub(self.y_floor) + 1
    }

    /// Splitting protocol: bisect the remaining range at the split level,
    /// `mid = ceil((y_floor + max) / 2)`, always `> y_floor`.
    /// Shrinks `self`'s ceiling to `mid - 1` and returns the upper half as
    /// a new task. `None` once the range is a single point.
    pub fn split(&mut self) -> Option<BbTask> {
        let level = self.split_level();
        let max = self.max_values[level];
        if self.y_floor >= max {
            return None;
        }
        let mid = (self.y_floor + max + 1) / 2;
        let mid = mid.max(self.y_floor + 1);
        if mid > max {
            return None;
        }
        let child = BbTask {
            root_level: self.root_level,
            fixed_prefix: self.fixed_prefix.clone(),
            y_floor: mid,
            max_values: self.max_values.clone(),
        };
        self.max_values[level] = mid - 1;
        Some(child)
    }

    fn into_counter(self, horizon: Horizon) -> SearchCounter {
        SearchCounter::for_task(horizon, &self.fixed_prefix, self.y_floor, self.max_values)
    }
}

impl PartialOrd for BbTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BbTask {
    /// Tasks compare by workload only, giving `create_tasks` the
    /// largest-first selection it needs.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.workload().cmp(&other.workload())
    }
}

/// Split `root` into up to `target_count` disjoint tasks by repeatedly
/// bisecting whichever task currently has the largest remaining workload.
/// Stops early if no task can be split further (e.g. `target_count`
/// exceeds the number of distinct counts a single hour can take).
fn create_tasks(root: BbTask, target_count: usize) -> Vec<BbTask> {
    let mut tasks = vec![root];
    while tasks.len() < target_count {
        let (idx, _) = tasks
            .iter()
            .enumerate()
            .max_by_key(|(_, t)| t.workload())
            .expect("tasks is never empty");
        match tasks[idx].split() {
            Some(child) => tasks.push(child),
            None => break,
        }
    }
    tasks
}

/// Runs C5 over disjoint task boxes in parallel and consolidates their
/// incumbents into one result.
pub struct ParallelOrchestrator {
    pub workers: usize,
    /// How many tasks to pre-split into per worker (default 4): more tasks
    /// than workers lets rayon's scheduler rebalance if some boxes turn
    /// out to be much cheaper to exhaust than others.
    pub split_factor: usize,
}

impl ParallelOrchestrator {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            split_factor: 4,
        }
    }

    /// Run the full search. `make_worker` constructs one `(adapter, model)`
    /// pair per task: each worker owns a private deep copy of the network
    /// model, built fresh per task rather than shared or cloned from a
    /// template held across threads.
    ///
    /// A worker closure that panics is caught at its boundary and logged;
    /// it contributes nothing to the result, and every other task still
    /// runs to completion.
    pub fn run<A, F>(
        &self,
        driver: &BbDriver,
        horizon: Horizon,
        num_pumps: usize,
        make_worker: F,
        observer: &dyn SearchObserver,
    ) -> SearchOutcome
    where
        A: SimulatorAdapter,
        F: Fn() -> (A, A::Model) + Sync,
    {
        let root = BbTask::whole_tree(horizon, num_pumps);
        let tasks = create_tasks(root, self.workers * self.split_factor.max(1));
        let incumbent = SharedIncumbent::new();

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .expect("building the orchestrator's rayon thread pool");

        pool.install(|| {
            tasks.into_par_iter().for_each(|task| {
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    let (mut adapter, mut model) = make_worker();
                    let counter = task.into_counter(horizon);
                    run_search(driver, &mut adapter, &mut model, counter, &incumbent, observer);
                }));
                if outcome.is_err() {
                    tracing::error!("worker panicked while processing a search task");
                }
            });
        });

        let best = incumbent.snapshot();
        if best.is_set() {
            SearchOutcome::FeasibleSchedule {
                best_cost: best.best_cost,
                best_y: best.best_y,
                best_x: rebuild_activation_matrix(driver, horizon, num_pumps, &best.best_y),
            }
        } else {
            SearchOutcome::Infeasible
        }
    }
}

/// The incumbent's `X*` is fully determined by replaying C3 along
/// `best_y` from the all-off initial row. Used once, at the very end, to
/// hand the caller a complete schedule rather than just the count vector.
fn rebuild_activation_matrix(
    driver: &BbDriver,
    horizon: Horizon,
    num_pumps: usize,
    best_y: &[usize],
) -> pumpsched_core::ActivationMatrix {
    let mut x = pumpsched_core::ActivationMatrix::new(horizon, num_pumps);
    let mut actuations = pumpsched_core::ActuationProfile::new(num_pumps);
    for h in 1..best_y.len() {
        actuations.recompute(&x, h - 1);
        let y_old = best_y[h - 1];
        let y_new = best_y[h];
        crate::assigner::apply_actuation_at(&mut x, h, y_new, y_old, &actuations, driver.actuation_cap)
            .expect("incumbent's own Y must still satisfy the actuation cap it was found under");
    }
    x
}
