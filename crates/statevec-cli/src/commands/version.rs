//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - statevector circuit simulator",
        style("statevec").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  statevec-ir           Circuit model and QASM 2.0 export");
    println!("  statevec-sim          Simulation engine (sequential, parallel)");
    println!("  statevec-hal          Hardware abstraction layer");
    println!("  statevec-adapter-sim  Simulator as a HAL backend");
    println!("  statevec-cli          Command-line interface");
    println!();
    println!(
        "Parallel backend: {}",
        if statevec_sim::backend::parallel_available() {
            style("available").green()
        } else {
            style("unavailable").red()
        }
    );
    println!("License:          {}", style("Apache-2.0").dim());
}
