//! C1, the `SimulatorAdapter` implementation backed by the `epanet` crate's
//! safe EPANET 2.3 bindings. This is the one place the core's
//! `write_activations`/`run_up_to` contract (`pumpsched_solver::SimulatorAdapter`)
//! meets an actual hydraulic engine; everything above it is backend-agnostic.

use std::collections::HashMap;

use epanet::{InitHydOption, NodeProperty, NodeType};

use pumpsched_core::{ActivationMatrix, Horizon};
use pumpsched_solver::{PumpTimestepSample, SimResult, SimulationError, SimulatorAdapter};

use crate::model::EpanetModel;

const SECONDS_PER_HOUR: i64 = 3600;

/// Stateless adapter: all mutable state lives in `EpanetModel`, following
/// a per-worker model mutated in place: one `EpanetModel` per worker, one
/// `EpanetAdapter` shared by value (it holds nothing).
#[derive(Debug, Default, Clone, Copy)]
pub struct EpanetAdapter;

impl SimulatorAdapter for EpanetAdapter {
    type Model = EpanetModel;

    /// Overwrite periods `1..=h` of each pump's speed pattern with its row
    /// in `x` (the activation matrix's "positions 0..h-1" of the binary
    /// vector, 1-indexed at the EPANET API boundary since pattern periods
    /// start at 1). Periods beyond `h` are left untouched.
    fn write_activations(&self, model: &mut EpanetModel, x: &ActivationMatrix, h: Horizon) {
        let pattern_index = model.pump_pattern_index().to_vec();
        let project = model.project_mut();
        for (pump, &pattern) in pattern_index.iter().enumerate() {
            for hour in 1..=h {
                let multiplier = if x.row(hour)[pump] { 1.0 } else { 0.0 };
                project
                    .set_pattern_value(pattern, hour as i32, multiplier)
                    .expect("pump pattern index was validated at EpanetModel::open");
            }
        }
    }

    /// Run a steady-state hydraulic simulation of duration `3600 * h`
    /// seconds and collect pressures, tank levels, and per-pump
    /// flow/head-gain samples for every reported hour.
    fn run_up_to(
        &mut self,
        model: &mut EpanetModel,
        h: Horizon,
    ) -> Result<SimResult, SimulationError> {
        let duration = SECONDS_PER_HOUR * h as i64;
        let pump_link_index = model.pump_link_index().to_vec();
        let tank_node_index = model.tank_node_index().clone();
        let project = model.project_mut();

        project
            .set_time_parameter(epanet::TimeParameter::Duration, duration)
            .map_err(|e| SimulationError::new(h, e.to_string()))?;

        // one per-pump/per-hour node pair: (suction node index, discharge
        // node index), cached once since EPANET link topology is fixed
        // across the run.
        let mut pump_nodes = Vec::with_capacity(pump_link_index.len());
        for &link in &pump_link_index {
            let (n1, n2) = project
                .get_link_nodes(link)
                .map_err(|e| SimulationError::new(h, e.to_string()))?;
            pump_nodes.push((n1, n2));
        }

        let mut pump_samples: HashMap<String, Vec<PumpTimestepSample>> = HashMap::new();
        for &link in &pump_link_index {
            let id = project
                .get_link_id(link)
                .map_err(|e| SimulationError::new(h, e.to_string()))?;
            pump_samples.insert(id, Vec::with_capacity(h));
        }

        let mut pressures = HashMap::new();
        let mut tank_heads = HashMap::new();

        project
            .open_h()
            .map_err(|e| SimulationError::new(h, e.to_string()))?;
        project
            .init_h(InitHydOption::InitFlow)
            .map_err(|e| SimulationError::new(h, e.to_string()))?;

        loop {
            let current = project
                .run_h()
                .map_err(|e| SimulationError::new(h, e.to_string()))? as i64;

            if current % SECONDS_PER_HOUR == 0 && current > 0 && current <= duration {
                for (idx, &link) in pump_link_index.iter().enumerate() {
                    let (n1, n2) = pump_nodes[idx];
                    let flowrate = project
                        .get_link_value(link, epanet::LinkProperty::Flow)
                        .map_err(|e| SimulationError::new(h, e.to_string()))?;
                    let head_start = project
                        .get_node_value(n1, NodeProperty::Head)
                        .map_err(|e| SimulationError::new(h, e.to_string()))?;
                    let head_end = project
                        .get_node_value(n2, NodeProperty::Head)
                        .map_err(|e| SimulationError::new(h, e.to_string()))?;
                    let id = project
                        .get_link_id(link)
                        .map_err(|e| SimulationError::new(h, e.to_string()))?;
                    pump_samples.entry(id).or_default().push(PumpTimestepSample {
                        flowrate,
                        head_start,
                        head_end,
                    });
                }

                if current == duration {
                    pressures = collect_node_pressures(project, h)?;
                    for (tank_id, &node_index) in &tank_node_index {
                        let level = project
                            .get_node_value(node_index, NodeProperty::TankLevel)
                            .map_err(|e| SimulationError::new(h, e.to_string()))?;
                        tank_heads.insert(tank_id.clone(), level);
                    }
                }
            }

            let next = project
                .next_h()
                .map_err(|e| SimulationError::new(h, e.to_string()))?;
            if next == 0 {
                break;
            }
        }

        project
            .close_h()
            .map_err(|e| SimulationError::new(h, e.to_string()))?;

        Ok(SimResult {
            hour: h,
            pressures,
            tank_heads,
            pump_samples,
        })
    }
}

/// Junction/reservoir pressures at the current simulation time, for every
/// node that is not a tank.
fn collect_node_pressures(
    project: &mut epanet::EPANET,
    h: Horizon,
) -> Result<HashMap<String, f64>, SimulationError> {
    let node_count = project
        .get_count(epanet::CountType::NodeCount)
        .map_err(|e| SimulationError::new(h, e.to_string()))?;
    let mut pressures = HashMap::new();
    for index in 1..=node_count {
        if project
            .get_node_type(index)
            .map_err(|e| SimulationError::new(h, e.to_string()))?
            == NodeType::Tank
        {
            continue;
        }
        let id = project
            .get_node_id(index)
            .map_err(|e| SimulationError::new(h, e.to_string()))?;
        let pressure = project
            .get_node_value(index, NodeProperty::Pressure)
            .map_err(|e| SimulationError::new(h, e.to_string()))?;
        pressures.insert(id, pressure);
    }
    Ok(pressures)
}
