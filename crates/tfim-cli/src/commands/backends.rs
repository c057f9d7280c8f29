//! Backends command implementation.

use anyhow::{Context, Result};
use console::style;

use tfim_runtime::{BackendFilter, BackendInfo, least_busy};

use super::common::{connect_service, load_config};

/// Execute the backends command.
pub async fn execute(qubits: Option<usize>, any_width: bool) -> Result<()> {
    let config = load_config(None, None, false, false)?;
    let width = if any_width {
        None
    } else {
        qubits.or(config.backend_qubits)
    };
    let filter = BackendFilter::default().with_qubits(width);

    let service = connect_service(false).await?;
    let backends = service
        .list_backends()
        .await
        .context("Failed to list backends")?;

    let candidates: Vec<BackendInfo> = backends
        .iter()
        .filter(|b| filter.matches(b))
        .cloned()
        .collect();
    let chosen = least_busy(&candidates).map(|b| b.name.clone());

    println!(
        "{} {} backend(s), {} matching {}:\n",
        style(service.name()).cyan().bold(),
        backends.len(),
        candidates.len(),
        filter.describe()
    );

    for backend in &backends {
        let matches = filter.matches(backend);
        let marker = if !backend.operational {
            style("○").red()
        } else if matches {
            style("●").green()
        } else {
            style("●").dim()
        };
        let name = if matches {
            style(backend.name.clone()).bold()
        } else {
            style(backend.name.clone()).dim()
        };
        let queue = backend
            .pending_jobs
            .map_or_else(|| "?".to_string(), |n| n.to_string());

        print!(
            "  {} {:<20} {:>4} qubits  queue {:>5}",
            marker, name, backend.num_qubits, queue
        );
        if backend.simulator {
            print!("  {}", style("(simulator)").dim());
        }
        if chosen.as_deref() == Some(backend.name.as_str()) {
            print!("  {}", style("← least busy").yellow().bold());
        }
        println!();
    }

    if chosen.is_none() {
        println!(
            "\n{} No {} available",
            style("✗").red().bold(),
            filter.describe()
        );
    }

    Ok(())
}
