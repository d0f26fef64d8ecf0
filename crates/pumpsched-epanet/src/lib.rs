//! # pumpsched-epanet
//!
//! The one concrete `pumpsched_solver::SimulatorAdapter` backend: an open
//! EPANET 2.3 project (via the `epanet` crate's safe bindings) driven
//! through `write_activations`/`run_up_to`.
//!
//! Everything here is translation: resolving pump/tank identifiers,
//! writing activation bits into pump speed patterns, stepping the
//! hydraulic solver, and reading back pressures/heads/flows. No search
//! logic lives in this crate; that is `pumpsched-solver`'s job.
//!
//! ```no_run
//! use pumpsched_epanet::{EpanetAdapter, EpanetModel};
//!
//! let mut model = EpanetModel::open("network.inp", "", "").unwrap();
//! let prices = model.pattern_by_name("PRICES").unwrap();
//! let adapter = EpanetAdapter;
//! let _ = (adapter, prices);
//! ```

mod adapter;
mod model;

pub use adapter::EpanetAdapter;
pub use model::EpanetModel;
