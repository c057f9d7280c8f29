//! Command-line argument tree.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tfim-sweep - transverse-field Ising VQE sweeps on IBM Quantum
#[derive(Parser)]
#[command(name = "tfim-sweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit one VQE job per field value
    Sweep {
        /// YAML configuration file (default: ~/.tfim-sweep/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Backend to use instead of the least busy match
        #[arg(short, long)]
        backend: Option<String>,

        /// Record jobs locally instead of submitting them
        #[arg(long)]
        dry_run: bool,

        /// Keep going after a failed submission
        #[arg(long)]
        continue_on_error: bool,

        /// Print the input bundle of the first job
        #[arg(long)]
        print_payload: bool,
    },

    /// List backends and mark the least busy match
    Backends {
        /// Required qubit count (default: from configuration)
        #[arg(short, long)]
        qubits: Option<usize>,

        /// Show backends of any width
        #[arg(long, conflicts_with = "qubits")]
        any_width: bool,
    },

    /// Print the Ising Hamiltonian for one field value
    Hamiltonian {
        /// Transverse field h
        #[arg(long = "h", allow_hyphen_values = true)]
        h: f64,

        /// Number of qubits on the ring
        #[arg(short, long, default_value = "4")]
        qubits: usize,

        /// Longitudinal bias field h_z
        #[arg(long, default_value = "0.1", allow_hyphen_values = true)]
        h_bias: f64,

        /// Coupling J
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        coupling: f64,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Query the status of a submitted job once
    Status {
        /// Job ID returned by the sweep
        job_id: String,
    },

    /// Print the field values a sweep would use
    Fields {
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}
