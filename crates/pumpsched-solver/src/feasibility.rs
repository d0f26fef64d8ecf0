//! C2, Feasibility Checker. Three independent predicates against a
//! `SimResult`. Order (cost, pressure, level, then terminal stability) is
//! enforced by the driver, not here; these functions only need to be
//! correct in isolation.

use std::collections::HashMap;

use crate::network::TankConfig;
use crate::simulator::SimResult;

/// Configuration external to the search itself: critical-node pressure
/// minima and tank bounds, both sourced from configuration rather than
/// hard-coded.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintConfig {
    pub pressure_minima: HashMap<String, f64>,
    pub tanks: Vec<TankConfig>,
}

/// For each `(node_id, p_min)`, `pressure[node_id] >= p_min`. A node named
/// in the config but missing from the result is infeasible.
pub fn pressure_feasible(result: &SimResult, config: &ConstraintConfig) -> bool {
    config.pressure_minima.iter().all(|(node_id, &p_min)| {
        result
            .pressure(node_id)
            .is_some_and(|pressure| pressure >= p_min)
    })
}

/// For each `(tank_id, [L_min, L_max])`, `L_min <= head[tank_id] <= L_max`.
/// A tank missing from the result is infeasible.
pub fn tank_level_feasible(result: &SimResult, config: &ConstraintConfig) -> bool {
    config.tanks.iter().all(|tank| {
        result
            .tank_head(&tank.id)
            .is_some_and(|head| head >= tank.min_level && head <= tank.max_level)
    })
}

/// Terminal-only: every tank's head at the horizon must be at or above its
/// initial level, so the schedule is sustainable over repeated days.
pub fn stability_feasible(result: &SimResult, config: &ConstraintConfig) -> bool {
    config.tanks.iter().all(|tank| {
        result
            .tank_head(&tank.id)
            .is_some_and(|head| head >= tank.init_level)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> ConstraintConfig {
        ConstraintConfig {
            pressure_minima: HashMap::from([("55".to_string(), 42.0)]),
            tanks: vec![TankConfig {
                id: "T1".to_string(),
                init_level: 10.0,
                min_level: 5.0,
                max_level: 20.0,
            }],
        }
    }

    fn result(pressure: f64, head: f64) -> SimResult {
        SimResult {
            hour: 1,
            pressures: HashMap::from([("55".to_string(), pressure)]),
            tank_heads: HashMap::from([("T1".to_string(), head)]),
            pump_samples: HashMap::new(),
        }
    }

    #[rstest]
    #[case(40.0, false)]
    #[case(41.99, false)]
    #[case(42.0, true)]
    #[case(100.0, true)]
    fn pressure_feasible_at_the_minimum_boundary(#[case] pressure: f64, #[case] expected: bool) {
        assert_eq!(pressure_feasible(&result(pressure, 10.0), &config()), expected);
    }

    #[test]
    fn missing_node_is_infeasible() {
        let mut r = result(50.0, 10.0);
        r.pressures.clear();
        assert!(!pressure_feasible(&r, &config()));
    }

    #[test]
    fn tank_out_of_range_is_infeasible() {
        assert!(!tank_level_feasible(&result(50.0, 3.0), &config()));
        assert!(!tank_level_feasible(&result(50.0, 25.0), &config()));
        assert!(tank_level_feasible(&result(50.0, 10.0), &config()));
    }

    #[test]
    fn stability_requires_at_least_initial_level() {
        assert!(!stability_feasible(&result(50.0, 9.9), &config()));
        assert!(stability_feasible(&result(50.0, 10.0), &config()));
        assert!(stability_feasible(&result(50.0, 15.0), &config()));
    }
}
