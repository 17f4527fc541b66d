/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use mkfirm::config::ModelConfig;
use mkfirm::feasibility;
use mkfirm::input::load_instance;
use mkfirm::model::build_model;
use mkfirm::solver::backend::GoodLpSolver;
use mkfirm::solver::{solve, Outcome};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Minimum-processor partitioning of (m,k)-firm tasks under EDF.
///
/// Example:
///   mkfirm input_parameters.txt -c model.yaml -p 4
#[derive(Debug, Parser)]
#[command(
    name = "mkfirm",
    about = "Build and solve the (m,k)-firm partitioning MILP",
    long_about = None,
)]
struct Cli {
    /// Instance file: `n m` followed by one `e p m k` line per task.
    #[arg(default_value = "input_parameters.txt")]
    input: PathBuf,

    /// Path to the YAML model configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Override the processor count given in the instance file.
    #[arg(short = 'p', long = "processors")]
    processors: Option<usize>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!(
        input = %cli.input.display(),
        config = ?cli.config,
        processors = ?cli.processors,
        "Configuration"
    );

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ModelConfig::load_from_file(path)?,
        None => {
            warn!("No model configuration file provided, using defaults");
            ModelConfig::default()
        }
    };

    let mut instance = load_instance(&cli.input)?;
    if let Some(p) = cli.processors {
        instance.processors = p;
    }

    let model = build_model(&instance, &config).context("Failed to build the model")?;
    let outcome = solve(&model, &mut GoodLpSolver::new()).context("Failed to solve the model")?;

    let solution = match outcome {
        Outcome::Optimal(solution) => solution,
        Outcome::Infeasible(status) => {
            println!("No feasible assignment on {} processor(s) ({status:?})", model.processors());
            return Ok(());
        }
    };

    let violations = feasibility::verify(&model, &solution);
    let hard = violations.iter().filter(|v| !v.is_wrap_around()).count();
    if hard > 0 {
        warn!(violations = hard, "Decoded solution fails verification");
    }
    feasibility::simulate_all(&model, &solution);

    println!("Hyperperiod: {}", model.hyperperiod.hyperperiod);
    println!("Processors used: {}", solution.processors_used);
    for (i, &l) in solution.assignment.iter().enumerate() {
        let accepted: Vec<String> = solution.accepted[i]
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a)
            .map(|(j, _)| (j + 1).to_string())
            .collect();
        println!(
            "  T{} -> P{}  accepted jobs: [{}] of {}",
            i + 1,
            l + 1,
            accepted.join(", "),
            solution.accepted[i].len()
        );
    }
    Ok(())
}
