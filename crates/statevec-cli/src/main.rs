//! statevec command-line interface
//!
//! ```text
//! statevec run -i bell.json --backend parallel --shots 1024
//! statevec qasm -i bell.json -o bell.qasm
//! statevec backends
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, qasm, run, version};

/// statevec - statevector simulation of H/CNOT/RX circuits
#[derive(Parser)]
#[command(name = "statevec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a circuit and print probabilities, ⟨Z⟩ values and counts
    Run(run::RunArgs),

    /// Export a circuit as OpenQASM 2.0
    Qasm {
        /// Input file (JSON or YAML)
        #[arg(short, long)]
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List execution backends and their availability
    Backends,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run::execute(&args),
        Commands::Qasm { input, output } => qasm::execute(&input, output.as_deref()),
        Commands::Backends => backends::execute().await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
