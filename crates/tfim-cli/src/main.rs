//! `tfim-sweep` command-line interface.
//!
//! Submits one VQE job per transverse-field value of a ring Ising model to
//! IBM Quantum, and offers small helpers around it: backend listing, a
//! single job status query, and printing the model operators.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use tfim_cli::commands::{backends, fields, hamiltonian, status, sweep, version};
use tfim_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // RUST_LOG wins over -v when set
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Sweep {
            config,
            backend,
            dry_run,
            continue_on_error,
            print_payload,
        } => {
            sweep::execute(
                config.as_deref(),
                backend.as_deref(),
                dry_run,
                continue_on_error,
                print_payload,
            )
            .await
        }

        Commands::Backends { qubits, any_width } => backends::execute(qubits, any_width).await,

        Commands::Hamiltonian {
            h,
            qubits,
            h_bias,
            coupling,
            format,
        } => hamiltonian::execute(h, qubits, h_bias, coupling, &format),

        Commands::Status { job_id } => status::execute(&job_id).await,

        Commands::Fields { config } => fields::execute(config.as_deref()),

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
