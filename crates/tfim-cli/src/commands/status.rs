//! Status command implementation.
//!
//! One status snapshot; jobs are never polled.

use anyhow::{Context, Result};
use console::style;

use tfim_runtime::JobId;

use super::common::{connect_service, styled_status};

/// Execute the status command.
pub async fn execute(job_id: &str) -> Result<()> {
    let job_id = job_id.trim();
    if job_id.is_empty() {
        anyhow::bail!("Please provide a job ID");
    }

    let service = connect_service(false).await?;
    let status = service
        .job_status(&JobId::new(job_id))
        .await
        .with_context(|| format!("Failed to get status of job {job_id}"))?;

    println!(
        "{} Job {} status: {}",
        style("→").cyan().bold(),
        style(job_id).dim(),
        styled_status(&status).bold()
    );

    if status.is_terminal() {
        println!("  Terminal: {}", style("yes").dim());
    }

    Ok(())
}
