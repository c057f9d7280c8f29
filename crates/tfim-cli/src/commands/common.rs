//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use console::{StyledObject, style};

use tfim_adapter_ibm::IbmRuntime;
use tfim_runtime::{JobStatus, LocalRuntime, RuntimeError, RuntimeService, SweepConfig};

/// Load the sweep configuration and apply command-line flags on top.
pub fn load_config(
    path: Option<&Path>,
    backend: Option<&str>,
    dry_run: bool,
    continue_on_error: bool,
) -> Result<SweepConfig> {
    let config = SweepConfig::load(path).context("Failed to load configuration")?;
    let config = apply_flags(config, backend, dry_run, continue_on_error)?;
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

/// Layer command-line flags over a loaded configuration and revalidate.
///
/// Flags only switch things on; an absent flag leaves the file or
/// environment value in place.
pub fn apply_flags(
    mut config: SweepConfig,
    backend: Option<&str>,
    dry_run: bool,
    continue_on_error: bool,
) -> Result<SweepConfig> {
    if let Some(name) = backend {
        config.backend = Some(name.to_string());
    }
    config.dry_run |= dry_run;
    config.continue_on_error |= continue_on_error;

    config.validate()?;
    Ok(config)
}

/// The service jobs go to: IBM Quantum, or a local recorder for dry runs.
pub async fn connect_service(dry_run: bool) -> Result<Box<dyn RuntimeService>> {
    if dry_run {
        tracing::info!("dry run, jobs are recorded locally");
        return Ok(Box::new(LocalRuntime::new()));
    }
    let service = IbmRuntime::from_env()
        .await
        .map_err(RuntimeError::from)
        .context("Failed to connect to IBM Quantum")?;
    Ok(Box::new(service))
}

/// Status name colored by state.
pub fn styled_status(status: &JobStatus) -> StyledObject<String> {
    let text = status.to_string();
    match status {
        JobStatus::Completed => style(text).green(),
        JobStatus::Failed(_) | JobStatus::Cancelled => style(text).red(),
        JobStatus::Unknown(_) => style(text).dim(),
        JobStatus::Initializing | JobStatus::Queued | JobStatus::Validating => {
            style(text).yellow()
        }
        JobStatus::Running => style(text).cyan(),
    }
}

/// Field value with enough digits to tell sweep points apart.
pub fn format_field(h: f64) -> String {
    format!("{h:>9.4}")
}
