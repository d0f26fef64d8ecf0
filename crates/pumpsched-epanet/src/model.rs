//! The concrete `NetworkModel`/`SimulatorAdapter::Model` backed by an open
//! EPANET project handle. Construction does all of the "fatal at startup"
//! validation `CoreError`'s taxonomy requires: a missing pump, tank, node,
//! or price pattern aborts here, before the search ever begins, rather than
//! surfacing as a per-probe `SimulationFailed`.

use std::collections::HashMap;

use epanet::{CountType, LinkProperty, LinkType, NodeProperty, NodeType, EPANET};

use pumpsched_core::{CoreError, PumpSet};
use pumpsched_solver::{NetworkModel, TankConfig};

/// An open EPANET project plus the per-pump/per-tank bookkeeping the
/// adapter needs on every probe: which link index is which pump, which
/// pattern index is that pump's speed multiplier (the pump's writable
/// actuation channel), and which node index is which tank.
pub struct EpanetModel {
    project: EPANET,
    pumps: PumpSet,
    pump_link_index: Vec<i32>,
    pump_pattern_index: Vec<i32>,
    tanks: Vec<TankConfig>,
    tank_node_index: HashMap<String, i32>,
}

impl EpanetModel {
    /// Open `inp_path` and resolve the pump set, tank bounds, and each
    /// pump's assigned speed pattern. `report_path`/`out_path` are forwarded
    /// to `EPANET::new` verbatim ("" disables either file).
    pub fn open(inp_path: &str, report_path: &str, out_path: &str) -> Result<Self, CoreError> {
        let mut project = EPANET::new(inp_path, report_path, out_path)
            .map_err(|e| CoreError::MissingNode(format!("could not open '{inp_path}': {e}")))?;

        let link_count = project
            .get_count(CountType::LinkCount)
            .map_err(|e| CoreError::MissingPump(e.to_string()))?;

        let mut pump_ids = Vec::new();
        let mut pump_link_index = Vec::new();
        let mut pump_pattern_index = Vec::new();
        for index in 1..=link_count {
            if project
                .get_link_type(index)
                .map_err(|e| CoreError::MissingPump(e.to_string()))?
                != LinkType::Pump
            {
                continue;
            }
            let id = project
                .get_link_id(index)
                .map_err(|e| CoreError::MissingPump(e.to_string()))?;
            let pattern = project
                .get_link_value(index, LinkProperty::LinkPattern)
                .map_err(|e| CoreError::MissingPump(e.to_string()))? as i32;
            if pattern <= 0 {
                return Err(CoreError::MissingPump(format!(
                    "pump '{id}' has no speed pattern assigned; one writable pattern per \
                     pump is required for hourly activation"
                )));
            }
            pump_ids.push(id);
            pump_link_index.push(index);
            pump_pattern_index.push(pattern);
        }
        if pump_ids.is_empty() {
            return Err(CoreError::MissingPump(
                "no PUMP-type links found in the network model".to_string(),
            ));
        }

        let node_count = project
            .get_count(CountType::NodeCount)
            .map_err(|e| CoreError::MissingTank(e.to_string()))?;

        let mut tanks = Vec::new();
        let mut tank_node_index = HashMap::new();
        for index in 1..=node_count {
            if project
                .get_node_type(index)
                .map_err(|e| CoreError::MissingTank(e.to_string()))?
                != NodeType::Tank
            {
                continue;
            }
            let id = project
                .get_node_id(index)
                .map_err(|e| CoreError::MissingTank(e.to_string()))?;
            let init_level = project
                .get_node_value(index, NodeProperty::TankLevel)
                .map_err(|e| CoreError::MissingTank(e.to_string()))?;
            let min_level = project
                .get_node_value(index, NodeProperty::MinLevel)
                .map_err(|e| CoreError::MissingTank(e.to_string()))?;
            let max_level = project
                .get_node_value(index, NodeProperty::MaxLevel)
                .map_err(|e| CoreError::MissingTank(e.to_string()))?;
            tank_node_index.insert(id.clone(), index);
            tanks.push(TankConfig {
                id,
                init_level,
                min_level,
                max_level,
            });
        }
        if tanks.is_empty() {
            return Err(CoreError::MissingTank(
                "no TANK-type nodes found in the network model".to_string(),
            ));
        }

        Ok(Self {
            project,
            pumps: PumpSet::new(pump_ids),
            pump_link_index,
            pump_pattern_index,
            tanks,
            tank_node_index,
        })
    }

    pub(crate) fn project_mut(&mut self) -> &mut EPANET {
        &mut self.project
    }

    pub(crate) fn pump_link_index(&self) -> &[i32] {
        &self.pump_link_index
    }

    pub(crate) fn pump_pattern_index(&self) -> &[i32] {
        &self.pump_pattern_index
    }

    pub(crate) fn tank_node_index(&self) -> &HashMap<String, i32> {
        &self.tank_node_index
    }

    /// Read a named pattern's values (e.g. a "PRICES" pattern) as a plain
    /// `Vec<f64>`, one entry per period in period order. Used by the host
    /// binary to build `pumpsched_solver::CostConfig`; not needed by the
    /// adapter itself, which never looks at prices.
    pub fn pattern_by_name(&mut self, name: &str) -> Result<Vec<f64>, CoreError> {
        let pattern_count = self
            .project
            .get_count(CountType::PatternCount)
            .map_err(|e| CoreError::MissingPricePattern(e.to_string()))?;
        for index in 1..=pattern_count {
            let id = self
                .project
                .get_pattern_id(index)
                .map_err(|e| CoreError::MissingPricePattern(e.to_string()))?;
            if id == name {
                let length = self
                    .project
                    .get_pattern_length(index)
                    .map_err(|e| CoreError::MissingPricePattern(e.to_string()))?;
                let mut values = Vec::with_capacity(length as usize);
                for period in 1..=length {
                    values.push(
                        self.project
                            .get_pattern_value(index, period)
                            .map_err(|e| CoreError::MissingPricePattern(e.to_string()))?,
                    );
                }
                return Ok(values);
            }
        }
        Err(CoreError::MissingPricePattern(name.to_string()))
    }
}

impl NetworkModel for EpanetModel {
    fn pumps(&self) -> &PumpSet {
        &self.pumps
    }

    fn tanks(&self) -> &[TankConfig] {
        &self.tanks
    }
}
