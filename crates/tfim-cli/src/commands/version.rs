//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - transverse-field Ising VQE sweeps",
        style("tfim-sweep").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  tfim-ops          Pauli operators and model builders");
    println!("  tfim-runtime      Program inputs, service trait, sweep driver");
    println!("  tfim-adapter-ibm  IBM Quantum runtime client");
    println!("  tfim-cli          Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
