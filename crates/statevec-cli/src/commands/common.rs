//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use statevec_hal::ExecutionResult;
use statevec_ir::Circuit;

/// Load a circuit from a JSON or YAML file.
///
/// The format is chosen by extension; anything other than `.yaml`/`.yml`
/// is read as JSON.
pub fn load_circuit(path: &str) -> Result<Circuit> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml_ng::from_str(&source)
            .with_context(|| format!("Invalid circuit in {path}")),
        _ => serde_json::from_str(&source).with_context(|| format!("Invalid circuit in {path}")),
    }
}

/// Print basis-state probabilities above `threshold`, most likely first.
pub fn print_probabilities(probabilities: &[f64], num_qubits: usize, threshold: f64) {
    let mut entries: Vec<(usize, f64)> = probabilities
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| *p > threshold)
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    println!("\n{} Probabilities:", style("✓").green().bold());
    for (index, p) in entries.iter().take(16) {
        let bar: String = "█".repeat((p * 50.0).round() as usize);
        println!(
            "  {}: {:>8.5} {}",
            style(statevec_sim::index_to_bitstring(*index, num_qubits)).cyan(),
            p,
            style(bar).green()
        );
    }
    if entries.len() > 16 {
        println!("  ... and {} more states", entries.len() - 16);
    }

    let total: f64 = probabilities.iter().sum();
    if (total - 1.0).abs() > 1e-9 {
        println!("  Total probability: {}", style(format!("{total:.6}")).yellow());
    }
}

/// Print ⟨Z⟩ for every qubit.
pub fn print_expectations(values: &[f64]) {
    println!("\n{} Expectation values ⟨Z⟩:", style("✓").green().bold());
    for (qubit, z) in values.iter().enumerate() {
        println!("  q[{qubit}]: {z:>+.6}");
    }
}

/// Print sampled counts as a bar chart.
pub fn print_results(result: &ExecutionResult) {
    println!(
        "\n{} Results ({} shots):",
        style("✓").green().bold(),
        result.shots
    );

    let sorted = result.counts.sorted();
    let total = result.counts.total_shots() as f64;

    for (bitstring, count) in sorted.iter().take(16) {
        let prob = **count as f64 / total * 100.0;
        let bar_len = (prob / 2.0).round() as usize;
        let bar: String = "█".repeat(bar_len);

        println!(
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }

    if sorted.len() > 16 {
        println!("  ... and {} more outcomes", sorted.len() - 16);
    }

    if let Some(time_ms) = result.execution_time_ms {
        println!("\n  Execution time: {} ms", style(time_ms).yellow());
    }
}
