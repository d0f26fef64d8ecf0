//! CLI surface plus the small set of inputs a runnable binary needs that
//! are left to configuration: the `.inp` path, worker count, and the
//! critical-node pressure minima, all taken from flags rather than
//! hard-coded.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;

use pumpsched_solver::{ConstraintConfig, TankConfig};

/// branch-and-bound pump-activation scheduler
#[derive(Debug, Parser)]
#[command(name = "pumpsched")]
#[command(author, version, about = "Pump-scheduling branch-and-bound optimizer", long_about = None)]
pub struct Cli {
    /// EPANET .INP network file
    #[arg(long, value_name = "FILE")]
    pub inp: PathBuf,

    /// Planning horizon in hours
    #[arg(long, default_value_t = 24)]
    pub hmax: usize,

    /// Per-pump actuation cap over the horizon
    #[arg(long = "max-actuations", default_value_t = 3)]
    pub max_actuations: u32,

    /// Number of parallel search workers; 1 disables the orchestrator and
    /// runs a single in-process search
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    /// Critical-node pressure minimum in meters, `NODE_ID=MINIMUM`
    /// (repeatable). The pressure-threshold map always comes from
    /// configuration, never hard-coded.
    #[arg(long = "critical-pressure", value_name = "NODE_ID=MINIMUM")]
    pub critical_pressure: Vec<String>,

    /// Name of the hourly-price pattern in the network model (the
    /// "PRICES" convention)
    #[arg(long = "price-pattern", default_value = "PRICES")]
    pub price_pattern: String,

    /// Constant pump efficiency used in the cost integral
    #[arg(long, default_value_t = 0.65)]
    pub efficiency: f64,

    /// Verbose output (repeatable: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default `tracing` filter level when `RUST_LOG` is unset
    /// (warn -> info -> debug as `-v` repeats).
    pub fn verbosity_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Parse `--critical-pressure NODE=VALUE` flags into the pressure
    /// minima map, and pair it with the network's own tank bounds.
    pub fn constraint_config(&self, tanks: &[TankConfig]) -> ConstraintConfig {
        let mut pressure_minima = HashMap::new();
        for entry in &self.critical_pressure {
            if let Some((node, value)) = entry.split_once('=') {
                if let Ok(minimum) = value.parse::<f64>() {
                    pressure_minima.insert(node.to_string(), minimum);
                    continue;
                }
            }
            tracing::warn!(entry, "ignoring malformed --critical-pressure entry");
        }
        ConstraintConfig {
            pressure_minima,
            tanks: tanks.to_vec(),
        }
    }
}
