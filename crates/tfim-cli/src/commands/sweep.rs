//! Sweep command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use tfim_runtime::{SweepDriver, SweepOutcome, SweepRecord};

use super::common::{connect_service, format_field, load_config, styled_status};

/// Execute the sweep command.
pub async fn execute(
    config_path: Option<&Path>,
    backend: Option<&str>,
    dry_run: bool,
    continue_on_error: bool,
    print_payload: bool,
) -> Result<()> {
    let config = load_config(config_path, backend, dry_run, continue_on_error)?;
    let sweep = config.field_sweep()?;

    let service = connect_service(config.dry_run).await?;
    let driver = SweepDriver::resolve(service.as_ref(), &config)
        .await
        .context("Failed to prepare the sweep")?;

    println!(
        "{} Sweeping {} field values on {}{}",
        style("→").cyan().bold(),
        sweep.len(),
        style(driver.backend()).bold(),
        if config.dry_run {
            style(" (dry run)").yellow().to_string()
        } else {
            String::new()
        }
    );
    println!(
        "  {} qubits, h_z = {}, J = {}, {} shots, program '{}'",
        config.num_qubits, config.h_bias, config.coupling, config.shots, config.program_id
    );

    if print_payload {
        if let Some(&h) = sweep.values().first() {
            let payload = driver.inputs_for(h)?.to_json()?;
            println!("\n{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    println!();

    let progress = ProgressBar::new(sweep.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    progress.set_message("submitting");

    let report = driver
        .run(&sweep, |record| {
            progress.println(record_line(record));
            progress.inc(1);
        })
        .await;

    let report = match report {
        Ok(report) => {
            progress.finish_and_clear();
            report
        }
        Err(e) => {
            progress.abandon();
            return Err(e).context("Sweep aborted");
        }
    };

    println!();
    println!(
        "{} Submitted {} job(s) to {}",
        style("✓").green().bold(),
        report.submitted(),
        style(&report.backend).bold()
    );
    if report.failed() > 0 {
        println!(
            "{} {} submission(s) failed",
            style("✗").red().bold(),
            report.failed()
        );
    }

    Ok(())
}

/// One console line per field value.
fn record_line(record: &SweepRecord) -> String {
    match &record.outcome {
        SweepOutcome::Submitted { job_id, status } => format!(
            "  h = {}  {}  {}",
            format_field(record.h),
            style(job_id).dim(),
            styled_status(status)
        ),
        SweepOutcome::Failed { error } => format!(
            "  h = {}  {}  {}",
            format_field(record.h),
            style("failed").red().bold(),
            error
        ),
    }
}
