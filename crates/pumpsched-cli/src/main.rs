//! pumpsched CLI - branch-and-bound pump-activation scheduler
//!
//! Wires the EPANET-backed adapter (`pumpsched-epanet`) into the
//! branch-and-bound search engine (`pumpsched-solver`) and reports the
//! cheapest feasible 24-hour pump schedule for a network, or that none
//! exists.

mod config;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pumpsched_core::{NoopObserver, SearchObserver, SearchOutcome, SharedIncumbent, TracingObserver};
use pumpsched_epanet::{EpanetAdapter, EpanetModel};
use pumpsched_solver::{
    BbDriver, CostConfig, NetworkModel, ParallelOrchestrator, PumpEfficiency, SearchCounter,
};

use crate::config::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.verbosity_level()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(%err, "pumpsched failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(true)` for a feasible schedule, `Ok(false)` for a confirmed
/// infeasible network: exit 0 if a feasible schedule is found, non-zero
/// otherwise.
fn run(cli: &Cli) -> Result<bool> {
    let inp_path = cli.inp.to_string_lossy().into_owned();
    let mut model = EpanetModel::open(&inp_path, "", "")
        .with_context(|| format!("opening network model '{inp_path}'"))?;

    let prices = model
        .pattern_by_name(&cli.price_pattern)
        .with_context(|| format!("reading price pattern '{}'", cli.price_pattern))?;

    let constraints = cli.constraint_config(model.tanks());
    let cost_config = CostConfig {
        prices_cents_per_kwh: prices,
        efficiency: PumpEfficiency::Constant(cli.efficiency),
    };

    let driver = BbDriver {
        pumps: model.pumps().clone(),
        actuation_cap: cli.max_actuations,
        constraints,
        cost_config,
    };

    let observer: Box<dyn SearchObserver> = if cli.verbose > 0 {
        Box::new(TracingObserver)
    } else {
        Box::new(NoopObserver)
    };

    let outcome = if cli.workers <= 1 {
        let counter = SearchCounter::new(cli.hmax, driver.pumps.len());
        let incumbent = SharedIncumbent::new();
        pumpsched_solver::run_search(
            &driver,
            &mut EpanetAdapter,
            &mut model,
            counter,
            &incumbent,
            observer.as_ref(),
        );
        let snapshot = incumbent.snapshot();
        if snapshot.is_set() {
            SearchOutcome::FeasibleSchedule {
                best_cost: snapshot.best_cost,
                best_y: snapshot.best_y.clone(),
                best_x: rebuild_schedule(&driver, cli.hmax, &snapshot.best_y),
            }
        } else {
            SearchOutcome::Infeasible
        }
    } else {
        let orchestrator = ParallelOrchestrator::new(cli.workers);
        let report_path = String::new();
        let out_path = String::new();
        let num_pumps = driver.pumps.len();
        orchestrator.run(
            &driver,
            cli.hmax,
            num_pumps,
            || {
                let worker_model = EpanetModel::open(&inp_path, &report_path, &out_path)
                    .expect("re-opening the network model for a worker");
                (EpanetAdapter, worker_model)
            },
            observer.as_ref(),
        )
    };

    report(&outcome, cli.hmax)
}

fn rebuild_schedule(
    driver: &BbDriver,
    horizon: pumpsched_core::Horizon,
    best_y: &[usize],
) -> pumpsched_core::ActivationMatrix {
    let num_pumps = driver.pumps.len();
    let mut x = pumpsched_core::ActivationMatrix::new(horizon, num_pumps);
    let mut actuations = pumpsched_core::ActuationProfile::new(num_pumps);
    for h in 1..best_y.len() {
        actuations.recompute(&x, h - 1);
        pumpsched_solver::assigner::apply_actuation_at(
            &mut x,
            h,
            best_y[h],
            best_y[h - 1],
            &actuations,
            driver.actuation_cap,
        )
        .expect("incumbent's own Y must still satisfy the actuation cap it was found under");
    }
    x
}

fn report(outcome: &SearchOutcome, hmax: pumpsched_core::Horizon) -> Result<bool> {
    match outcome {
        SearchOutcome::FeasibleSchedule {
            best_cost,
            best_y,
            best_x,
        } => {
            println!("feasible schedule found, cost = {best_cost:.4}");
            for h in 1..=hmax {
                let on_count = best_x.row(h).iter().filter(|&&on| on).count();
                println!("  hour {h:>2}: {on_count} pump(s) on (y = {})", best_y[h]);
            }
            Ok(true)
        }
        SearchOutcome::Infeasible => {
            println!("no feasible schedule found");
            Ok(false)
        }
    }
}
