//! # pumpsched-core
//!
//! Data model and error taxonomy shared by the pumpsched search engine.
//!
//! This crate provides:
//! - The horizon/pump/activation/count/actuation types that make up a
//!   search node (`Horizon`, `PumpId`, `ActivationMatrix`, `CountVector`,
//!   `ActuationProfile`)
//! - `Incumbent`/`SharedIncumbent`, the best-known feasible schedule and
//!   its synchronized wrapper
//! - `CoreError`, the fatal-at-startup error taxonomy
//! - `SearchObserver`, the collaborator interface that the driver and
//!   orchestrator report probes, prunes, and incumbent updates through
//!
//! Everything here is plain data; the search algorithm itself lives in
//! `pumpsched-solver`.

pub mod error;
pub mod observer;

pub use error::CoreError;
pub use observer::{NoopObserver, PruneReason, SearchObserver, TracingObserver};

/// Number of hourly slots in the planning horizon, numbered 1..=H. Hour 0 is
/// the initial network state and is never decided.
pub type Horizon = usize;

/// Index of a pump within the ordered `PumpSet`.
pub type PumpId = usize;

/// An ordered set of pump identifiers, small (N is typically 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PumpSet {
    ids: Vec<String>,
}

impl PumpSet {
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn name(&self, pump: PumpId) -> Option<&str> {
        self.ids.get(pump).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Binary activation matrix `X` of shape `(H+1) x N`. Row 0 is always all
/// zeros (the initial state); row `h` is the activation vector for hour `h`.
///
/// Invariant: `Y[h] == sum(X[h])` for every row that has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationMatrix {
    num_pumps: usize,
    rows: Vec<Vec<bool>>,
}

impl ActivationMatrix {
    pub fn new(horizon: Horizon, num_pumps: usize) -> Self {
        Self {
            num_pumps,
            rows: vec![vec![false; num_pumps]; horizon + 1],
        }
    }

    pub fn num_pumps(&self) -> usize {
        self.num_pumps
    }

    pub fn row(&self, h: Horizon) -> &[bool] {
        &self.rows[h]
    }

    pub fn row_mut(&mut self, h: Horizon) -> &mut [bool] {
        &mut self.rows[h]
    }

    pub fn set_row(&mut self, h: Horizon, row: &[bool]) {
        debug_assert_eq!(row.len(), self.num_pumps);
        self.rows[h].copy_from_slice(row);
    }

    /// Count of active pumps in row `h`, i.e. `Y[h]`.
    pub fn count(&self, h: Horizon) -> usize {
        self.rows[h].iter().filter(|&&b| b).count()
    }
}

/// Sequence `Y[0..=H]` of per-hour active-pump counts. `Y[0] = 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountVector {
    values: Vec<usize>,
}

impl CountVector {
    pub fn new(horizon: Horizon) -> Self {
        Self {
            values: vec![0; horizon + 1],
        }
    }

    pub fn get(&self, h: Horizon) -> usize {
        self.values[h]
    }

    pub fn set(&mut self, h: Horizon, count: usize) {
        self.values[h] = count;
    }

    /// The meaningful prefix `Y[0..=h]`; entries above `h` are stale.
    pub fn prefix(&self, h: Horizon) -> &[usize] {
        &self.values[..=h]
    }
}

/// Cumulative 0->1 transition count per pump, `A[j] <= A_max`.
///
/// Derived from `X[0..h]` each time the hour advances; not rolled back on
/// backtracking because the counter only ever exposes hours at or below its
/// current pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActuationProfile {
    counts: Vec<u32>,
}

impl ActuationProfile {
    pub fn new(num_pumps: usize) -> Self {
        Self {
            counts: vec![0; num_pumps],
        }
    }

    pub fn get(&self, pump: PumpId) -> u32 {
        self.counts[pump]
    }

    /// Recompute from scratch by scanning `X[0..=h]` for 0->1 transitions.
    /// O(h * N); called once per hour advance, never per sibling.
    pub fn recompute(&mut self, matrix: &ActivationMatrix, h: Horizon) {
        for count in &mut self.counts {
            *count = 0;
        }
        for k in 1..=h {
            let prev = matrix.row(k - 1);
            let cur = matrix.row(k);
            for pump in 0..self.counts.len() {
                if !prev[pump] && cur[pump] {
                    self.counts[pump] += 1;
                }
            }
        }
    }
}

/// Best feasible schedule found so far, or none yet (`best_cost = +inf`).
///
/// Shared across workers; `pumpsched-solver` wraps this in a mutex and only
/// ever writes to it inside the critical section.
#[derive(Debug, Clone, PartialEq)]
pub struct Incumbent {
    pub best_cost: f64,
    pub best_y: Vec<usize>,
}

impl Incumbent {
    pub fn none() -> Self {
        Self {
            best_cost: f64::INFINITY,
            best_y: Vec::new(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.best_cost.is_finite()
    }
}

impl Default for Incumbent {
    fn default() -> Self {
        Self::none()
    }
}

/// Synchronized `Incumbent`: a lock-free `best_cost` for the prune check
/// every probe performs, and a mutex around the pair for the rarer write
/// that also needs `best_y`. Readers use an acquire load; writers take the
/// mutex and only then publish the new cost, keeping to the "only writes
/// inside the mutex" rule.
///
/// Single-worker search and the multi-worker orchestrator share this type
/// so the driver's probe loop doesn't need two code paths.
#[derive(Debug)]
pub struct SharedIncumbent {
    best_cost_bits: std::sync::atomic::AtomicU64,
    inner: std::sync::Mutex<Incumbent>,
}

impl SharedIncumbent {
    pub fn new() -> Self {
        Self {
            best_cost_bits: std::sync::atomic::AtomicU64::new(f64::INFINITY.to_bits()),
            inner: std::sync::Mutex::new(Incumbent::none()),
        }
    }

    /// Cheap, lock-free read of the current best cost, used on the hot
    /// path of every probe's cost-prune check.
    pub fn best_cost(&self) -> f64 {
        f64::from_bits(self.best_cost_bits.load(std::sync::atomic::Ordering::Acquire))
    }

    /// Replace the incumbent if `cost` is strictly better, inside the
    /// mutex. Returns whether the replacement happened.
    pub fn update_if_better(&self, cost: f64, best_y: &[usize]) -> bool {
        let mut guard = self.inner.lock().expect("incumbent mutex poisoned");
        if cost < guard.best_cost {
            guard.best_cost = cost;
            guard.best_y = best_y.to_vec();
            self.best_cost_bits
                .store(cost.to_bits(), std::sync::atomic::Ordering::Release);
            true
        } else {
            false
        }
    }

    /// A consistent snapshot of `(best_cost, best_y)` under the mutex, for
    /// the orchestrator to read once all workers have finished.
    pub fn snapshot(&self) -> Incumbent {
        self.inner.lock().expect("incumbent mutex poisoned").clone()
    }
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a completed search: either a feasible schedule, or a
/// confirmed absence of one. Never a partial schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    FeasibleSchedule {
        best_cost: f64,
        best_y: Vec<usize>,
        best_x: ActivationMatrix,
    },
    Infeasible,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_matrix_row_zero_is_zero() {
        let matrix = ActivationMatrix::new(3, 2);
        assert_eq!(matrix.row(0), &[false, false]);
        assert_eq!(matrix.count(0), 0);
    }

    #[test]
    fn actuation_profile_counts_only_rising_edges() {
        let mut matrix = ActivationMatrix::new(2, 2);
        matrix.set_row(1, &[true, false]);
        matrix.set_row(2, &[true, true]);
        let mut profile = ActuationProfile::new(2);
        profile.recompute(&matrix, 2);
        assert_eq!(profile.get(0), 1);
        assert_eq!(profile.get(1), 1);
    }

    #[test]
    fn actuation_profile_does_not_count_deactivation() {
        let mut matrix = ActivationMatrix::new(2, 1);
        matrix.set_row(1, &[true]);
        matrix.set_row(2, &[false]);
        let mut profile = ActuationProfile::new(1);
        profile.recompute(&matrix, 2);
        assert_eq!(profile.get(0), 1);
    }

    #[test]
    fn incumbent_none_is_infinite_and_unset() {
        let incumbent = Incumbent::none();
        assert!(!incumbent.is_set());
        assert_eq!(incumbent.best_cost, f64::INFINITY);
    }

    #[test]
    fn shared_incumbent_only_accepts_strict_improvements() {
        let shared = SharedIncumbent::new();
        assert_eq!(shared.best_cost(), f64::INFINITY);
        assert!(shared.update_if_better(10.0, &[1, 0]));
        assert_eq!(shared.best_cost(), 10.0);
        assert!(!shared.update_if_better(10.0, &[0, 1]));
        assert!(shared.update_if_better(5.0, &[0, 0]));
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.best_cost, 5.0);
        assert_eq!(snapshot.best_y, vec![0, 0]);
    }

    #[test]
    fn shared_incumbent_is_send_and_sync_across_threads() {
        use std::sync::Arc;
        let shared = Arc::new(SharedIncumbent::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    shared.update_if_better(100.0 - i as f64, &[i]);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.best_cost(), 97.0);
    }
}
