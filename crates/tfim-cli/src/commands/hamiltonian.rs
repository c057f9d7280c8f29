//! Hamiltonian command implementation.

use anyhow::{Result, bail};
use console::style;

use tfim_ops::operator::DEFAULT_ATOL;
use tfim_ops::{IsingParams, SparsePauliOp};

/// Execute the hamiltonian command.
pub fn execute(h: f64, qubits: usize, h_bias: f64, coupling: f64, format: &str) -> Result<()> {
    let params = IsingParams::new(h).with_bias(h_bias).with_coupling(coupling);
    let operator = params.build(qubits)?;
    let simplified = operator.simplify(DEFAULT_ATOL);

    match format.to_lowercase().as_str() {
        "table" => print_table(&params, qubits, operator.num_terms(), &simplified),
        "json" => {
            let json = serde_json::json!({
                "num_qubits": qubits,
                "h": params.h,
                "h_z": params.h_z,
                "j": params.j,
                "terms": simplified.to_list(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        other => bail!("Unknown format: '{other}'. Available: table, json"),
    }

    Ok(())
}

fn print_table(params: &IsingParams, qubits: usize, raw_terms: usize, op: &SparsePauliOp) {
    println!(
        "{} H = -h ΣX - J ΣZZ - h_z ΣZ  ({} qubits, h = {}, J = {}, h_z = {})",
        style("→").cyan().bold(),
        qubits,
        params.h,
        params.j,
        params.h_z
    );
    println!(
        "  {} terms after simplification ({} before)\n",
        op.num_terms(),
        raw_terms
    );
    println!(
        "  {:<width$}  {}",
        style("PAULI").bold(),
        style("COEFF").bold(),
        width = qubits.max(5)
    );
    for (label, coeff) in op.to_list() {
        println!(
            "  {:<width$}  {:>+10.4}",
            style(label).cyan(),
            coeff,
            width = qubits.max(5)
        );
    }
}
