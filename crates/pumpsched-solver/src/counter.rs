//! Search Counter. Iterates the lexicographic tree of per-hour counts with
//! an explicit level pointer rather than recursion, generalized with a
//! per-level cap and a relocatable root so the same type also drives a
//! `BbTask`'s restricted sub-box.

use pumpsched_core::{CountVector, Horizon};

/// Outcome of the most recent `update` call, reported for diagnostics only;
/// `update`'s return value is what the driver actually branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    Initial,
    Advanced,
    Retreated,
    Terminal,
}

/// C4's mutable search state: level pointer `h`, the count-vector prefix
/// `Y[0..=h]`, and the per-level ceiling `Y[l] <= max_values[l]`.
///
/// `entry_level` is the deepest level the counter will never reset or back
/// out past: for the whole-tree counter this is hour 0 (`Y[0] = 0`, fixed
/// by definition, never a real decision); for a `BBTask`'s sub-counter it
/// is one level above the task's own inherited prefix, so `update` backing
/// out to `entry_level` is exactly "this task's box is exhausted".
#[derive(Debug, Clone)]
pub struct SearchCounter {
    horizon: Horizon,
    entry_level: Horizon,
    max_values: Vec<usize>,
    h: Horizon,
    y: CountVector,
    state: CounterState,
    /// Set by `for_task`: the counter is pre-positioned at a real decision
    /// node (`Y[entry_level + 1] = y_floor`) that the caller must evaluate
    /// directly, since `update` only ever reports states *after* the one it
    /// was constructed with. Cleared by the first `take_pending_probe` call.
    pending_probe: bool,
}

impl SearchCounter {
    /// The whole-tree counter: uniform cap `N` at every hour, starting from
    /// the trivial `Y[0] = 0` state (never itself a probe: the first real
    /// node comes from the first `update(true)` call).
    pub fn new(horizon: Horizon, num_pumps: usize) -> Self {
        let mut max_values = vec![num_pumps; horizon + 1];
        max_values[0] = 0;
        Self {
            horizon,
            entry_level: 0,
            max_values,
            h: 0,
            y: CountVector::new(horizon),
            state: CounterState::Initial,
            pending_probe: false,
        }
    }

    /// A counter restricted to a `BBTask`'s rectangular sub-box.
    ///
    /// `fixed_prefix` is `Y[0..=entry_level]`, already decided by the
    /// parent task and copied in verbatim; `entry_level` is
    /// `fixed_prefix.len() - 1` and is never revisited. Enumeration starts
    /// one level deeper, at `Y[entry_level + 1] = y_floor` (the task's
    /// `Y_lo` for that level), capped per level by `max_values` (the
    /// task's `Y_hi`, length `horizon + 1`).
    ///
    /// Because `Y[entry_level + 1] = y_floor` is a real decision the
    /// counter was constructed with rather than one `update` produced, the
    /// caller must consume it via `take_pending_probe` before entering the
    /// normal `update` loop.
    pub fn for_task(
        horizon: Horizon,
        fixed_prefix: &[usize],
        y_floor: usize,
        max_values: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(max_values.len(), horizon + 1);
        debug_assert!(!fixed_prefix.is_empty());
        let entry_level = fixed_prefix.len() - 1;
        let mut y = CountVector::new(horizon);
        for (h, &value) in fixed_prefix.iter().enumerate() {
            y.set(h, value);
        }
        y.set(entry_level + 1, y_floor);
        Self {
            horizon,
            entry_level,
            max_values,
            h: entry_level + 1,
            y,
            state: CounterState::Initial,
            pending_probe: true,
        }
    }

    pub fn h(&self) -> Horizon {
        self.h
    }

    /// The fixed horizon `H` this counter was constructed with. Hour `H`
    /// itself is the terminal level (the stability predicate applies only
    /// there).
    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn y(&self) -> &CountVector {
        &self.y
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    pub fn entry_level(&self) -> Horizon {
        self.entry_level
    }

    pub fn max_value(&self, h: Horizon) -> usize {
        self.max_values[h]
    }

    /// Consume the pending initial probe set up by `for_task`, if any. The
    /// driver must call this once before its first `update` call; for a
    /// whole-tree counter it is always `false` and a no-op.
    pub fn take_pending_probe(&mut self) -> bool {
        std::mem::replace(&mut self.pending_probe, false)
    }

    /// `update(feasible) -> bool`. Four cases, checked in order:
    ///
    /// 1. At `entry_level` with an infeasible probe: exhausted.
    /// 2. Feasible and not yet at the horizon: descend to `h + 1`, reset
    ///    `Y[h+1] = 0`.
    /// 3. This hour's count has exhausted `0..=max_values[h]`: reset it,
    ///    back up one hour, and retry as if infeasible (a loop rather than
    ///    recursion, since the retry can cross multiple exhausted levels in
    ///    a single call).
    /// 4. Otherwise: advance to the next sibling count at this hour.
    pub fn update(&mut self, feasible: bool) -> bool {
        let mut feasible = feasible;
        loop {
            if self.h == self.entry_level && !feasible {
                self.state = CounterState::Terminal;
                return false;
            }

            if feasible && self.h < self.horizon {
                self.h += 1;
                self.y.set(self.h, 0);
                self.state = CounterState::Advanced;
                return true;
            }

            if self.y.get(self.h) == self.max_values[self.h] {
                self.y.set(self.h, 0);
                self.h -= 1;
                feasible = false;
                continue;
            }

            self.y.set(self.h, self.y.get(self.h) + 1);
            self.state = CounterState::Retreated;
            return true;
        }
    }

    /// `jump_to_end(h)`: sets `Y[h]` to its ceiling so the next
    /// `update(false)` backs out of hour `h` and every remaining sibling at
    /// that hour. Used for cost-based level pruning, since cost is
    /// monotone in the prefix: there is no point trying larger counts at
    /// `h` once the current one already exceeds the incumbent.
    pub fn jump_to_end(&mut self, h: Horizon) {
        self.y.set(h, self.max_values[h]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Enumerate every prefix visited for a small `(H, N)` pair by always
    /// reporting feasible, and check it matches lexicographic order over
    /// `{0..N}^H` plus the exhaustion count `(N+1)^H`.
    #[test]
    fn visits_full_lexicographic_tree_in_order() {
        let (h_max, n) = (2usize, 2usize);
        let mut counter = SearchCounter::new(h_max, n);
        let mut visited = Vec::new();
        let mut feasible = true;
        while counter.update(feasible) {
            if counter.h() == h_max {
                visited.push(counter.y().prefix(h_max)[1..].to_vec());
            }
            feasible = true;
        }
        let expected: Vec<Vec<usize>> = (0..=n)
            .flat_map(|a| (0..=n).map(move |b| vec![a, b]))
            .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn exhausts_after_at_most_pow_n_plus_one_h() {
        let (h_max, n) = (3usize, 2usize);
        let mut counter = SearchCounter::new(h_max, n);
        let mut probes = 0u64;
        let mut feasible = true;
        while counter.update(feasible) {
            probes += 1;
            feasible = true;
        }
        // one probe per node in the full (N+1)-ary tree, root excluded
        let bound: u64 = (0..=h_max).map(|k| (n as u64 + 1).pow(k as u32)).sum();
        assert!(probes <= bound);
        assert_eq!(probes, bound - 1); // root (h=0) is never counted as a probe
    }

    #[test]
    fn jump_to_end_skips_remaining_siblings() {
        let mut counter = SearchCounter::new(3, 2);
        assert!(counter.update(true)); // h=1, y[1]=0
        assert!(counter.update(true)); // h=2, y[2]=0
        assert_eq!(counter.h(), 2);
        counter.jump_to_end(2);
        // next update(false) should back out of hour 2 entirely, landing on
        // hour 1's next sibling rather than visiting y[2]=1 or y[2]=2.
        assert!(counter.update(false));
        assert_eq!(counter.h(), 1);
        assert_eq!(counter.y().get(1), 1);
    }

    #[test]
    fn root_infeasible_is_terminal() {
        let mut counter = SearchCounter::new(1, 1);
        // Drain the tree until the root itself is rejected.
        let mut feasible = true;
        while counter.update(feasible) {
            feasible = false;
        }
        assert_eq!(counter.state(), CounterState::Terminal);
    }

    /// A task counter restricted to `Y[1] in [1, 2]` (out of `0..=2`) must
    /// never visit `Y[1] = 0`, and must terminate once `Y[1]` exhausts its
    /// own ceiling rather than backing out past its inherited prefix.
    #[test]
    fn task_counter_respects_floor_and_ceiling() {
        let horizon = 1;
        let max_values = vec![0, 2]; // entry_level 0 unused; hour 1 capped at 2
        let mut counter = SearchCounter::for_task(horizon, &[0], 1, max_values);

        assert!(counter.take_pending_probe());
        assert_eq!(counter.h(), 1);
        assert_eq!(counter.y().get(1), 1);

        let mut seen = vec![counter.y().get(1)];
        let mut feasible = false; // this first node was (hypothetically) rejected
        while counter.update(feasible) {
            seen.push(counter.y().get(1));
            feasible = false;
        }
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(counter.state(), CounterState::Terminal);
    }

    /// A single-point box (`y_floor == max_values[h]`) is exhausted after
    /// exactly one rejected probe.
    #[test]
    fn task_counter_single_value_box_exhausts_immediately() {
        let mut counter = SearchCounter::for_task(1, &[0], 2, vec![0, 2]);
        assert!(counter.take_pending_probe());
        assert!(!counter.update(false));
        assert_eq!(counter.state(), CounterState::Terminal);
    }
}
