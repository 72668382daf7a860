//! QASM export command implementation.

use anyhow::{Context, Result};
use console::style;
use std::fs;

use super::common::load_circuit;

/// Execute the qasm command.
pub fn execute(input: &str, output: Option<&str>) -> Result<()> {
    let circuit = load_circuit(input)?;
    let qasm = circuit.to_qasm();

    match output {
        Some(path) => {
            fs::write(path, format!("{qasm}\n"))
                .with_context(|| format!("Failed to write output file: {path}"))?;
            eprintln!(
                "{} Wrote {} ({} qubits, {} gates)",
                style("✓").green().bold(),
                style(path).green(),
                circuit.num_qubits(),
                circuit.len()
            );
        }
        None => println!("{qasm}"),
    }

    Ok(())
}
