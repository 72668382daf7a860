//! Run command implementation.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use statevec_hal::{Counts, ExecutionResult};
use statevec_sim::{BackendKind, NoiseModel, NoisySimulator, SimulatorConfig};

use super::common::{load_circuit, print_expectations, print_probabilities, print_results};

/// Arguments of `statevec run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Input file (JSON or YAML)
    #[arg(short, long)]
    pub input: String,

    /// Execution backend (sequential, parallel)
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Worker threads for the parallel backend
    #[arg(long)]
    pub threads: Option<usize>,

    /// Fall back to sequential if the parallel backend is unavailable
    #[arg(long)]
    pub fallback: bool,

    /// Number of shots to sample (0 skips sampling)
    #[arg(short, long, default_value = "0")]
    pub shots: u32,

    /// Depolarizing noise probability applied after the circuit
    #[arg(long)]
    pub noise: Option<f64>,

    /// RNG seed for noise and sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulator configuration file (YAML)
    #[arg(short, long, env = "STATEVEC_CONFIG")]
    pub config: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Machine-readable output of a run.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    num_qubits: usize,
    backend: &'a str,
    probabilities: Vec<f64>,
    expectation_values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    zeroed_amplitudes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ExecutionResult>,
}

/// Resolve the simulator configuration: file, then environment, then flags.
pub fn resolve_config(args: &RunArgs) -> Result<SimulatorConfig> {
    let mut config = match &args.config {
        Some(path) => SimulatorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration: {path}"))?,
        None => SimulatorConfig::default(),
    };
    config.apply_env()?;

    if let Some(backend) = &args.backend {
        config.backend = backend.parse::<BackendKind>()?;
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if args.fallback {
        config.fallback_to_sequential = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(p) = args.noise {
        config.noise = NoiseModel::depolarizing(p)?;
    }
    config.validate()?;
    Ok(config)
}

/// Execute the run command.
pub fn execute(args: &RunArgs) -> Result<()> {
    let json = match args.format.to_lowercase().as_str() {
        "table" => false,
        "json" => true,
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    };

    let config = resolve_config(args)?;
    let circuit = load_circuit(&args.input)?;
    info!(
        qubits = circuit.num_qubits(),
        gates = circuit.len(),
        backend = %config.backend,
        "Loaded circuit"
    );

    if !json {
        println!(
            "{} Running {} on {} ({} qubits, {} gates)",
            style("→").cyan().bold(),
            style(&args.input).green(),
            style(config.backend).yellow(),
            circuit.num_qubits(),
            circuit.len()
        );
    }

    let start = Instant::now();
    let mut sim = NoisySimulator::from_config(circuit.num_qubits(), &config)?;
    sim.run(&circuit)?;

    let zeroed = if sim.noise_model().is_noiseless() {
        None
    } else {
        Some(sim.apply_noise()?)
    };

    let probabilities = sim.probabilities()?;
    let expectation_values = sim.expectation_values()?;

    let result = if args.shots > 0 {
        let counts: Counts = sim
            .sample_counts(args.shots)
            .context("Sampling failed")?
            .into_iter()
            .collect();
        Some(
            ExecutionResult::new(counts, args.shots)
                .with_execution_time(start.elapsed().as_millis() as u64),
        )
    } else {
        None
    };

    if json {
        let report = RunReport {
            num_qubits: circuit.num_qubits(),
            backend: sim.simulator().backend_name(),
            probabilities,
            expectation_values,
            zeroed_amplitudes: zeroed,
            result,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if sim.simulator().backend_kind() != config.backend {
        println!(
            "  {} running on {} backend",
            style("!").yellow().bold(),
            style(sim.simulator().backend_name()).yellow()
        );
    }
    if let Some(zeroed) = zeroed {
        println!(
            "  Noise zeroed {} of {} amplitudes",
            style(zeroed).yellow(),
            probabilities.len()
        );
    }

    print_probabilities(&probabilities, circuit.num_qubits(), 1e-12);
    print_expectations(&expectation_values);
    if let Some(result) = &result {
        print_results(result);
    }

    Ok(())
}
