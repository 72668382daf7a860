//! Backends command implementation.

use anyhow::Result;
use console::style;

use statevec_adapter_sim::SimulatorBackend;
use statevec_hal::Backend;
use statevec_sim::{BackendKind, backend::parallel_available};

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Execution backends:\n", style("statevec").cyan().bold());

    for kind in [BackendKind::Sequential, BackendKind::Parallel] {
        let (available, note) = match kind {
            BackendKind::Sequential => (true, "indexed loops on the calling thread".to_string()),
            BackendKind::Parallel => {
                let threads = std::thread::available_parallelism().map_or(0, usize::from);
                (
                    parallel_available(),
                    format!("rayon worker pool, {threads} host threads"),
                )
            }
        };
        println!(
            "  {} {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(kind.name()).bold(),
            style(format!("({note})")).dim()
        );
    }

    let sim = SimulatorBackend::new();
    let caps = sim.capabilities();
    let availability = sim.availability().await?;
    let available = availability.is_available;

    println!("\n{} HAL backends:\n", style("statevec").cyan().bold());
    println!(
        "  {} {} {}",
        if available {
            style("●").green()
        } else {
            style("○").red()
        },
        style(sim.name()).bold(),
        if caps.is_simulator { "(local)" } else { "" }
    );
    if let Some(message) = &availability.status_message {
        println!("    Status: {}", style(message).yellow());
    }
    println!("    Qubits: {}", caps.num_qubits);
    println!("    Max shots: {}", caps.max_shots);
    println!(
        "    Gates: {}",
        caps.gate_set
            .iter()
            .map(|g| g.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(())
}
