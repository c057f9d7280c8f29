//! Runtime service trait and backend selection.
//!
//! The [`RuntimeService`] trait is the seam between the sweep driver and a
//! remote execution service:
//!
//! ```text
//!   list_backends() ──→ select_backend() ──→ run() ──→ job_status()
//!       (async)             (local)          (async)     (async, once)
//! ```
//!
//! | Method | Kind | Returns |
//! |--------|------|---------|
//! | `name()` | sync | `&str` |
//! | `list_backends()` | async | `RuntimeResult<Vec<BackendInfo>>` |
//! | `run()` | async | `RuntimeResult<JobId>` |
//! | `job_status()` | async | `RuntimeResult<JobStatus>` |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RuntimeError, RuntimeResult};
use crate::job::{JobId, JobStatus};
use crate::program::{RunOptions, VqeInputs};

/// What the service reports about one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Whether the backend accepts jobs.
    pub operational: bool,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
    /// Jobs waiting ahead of a new submission, if known.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
    /// Free-form status message.
    #[serde(default)]
    pub status_msg: Option<String>,
}

/// Criteria a backend must meet to be picked for the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFilter {
    /// Exact qubit count, or any when `None`.
    #[serde(default = "default_filter_qubits")]
    pub num_qubits: Option<usize>,
    /// Only operational backends.
    #[serde(default = "default_true")]
    pub operational: bool,
    /// Allow simulators.
    #[serde(default)]
    pub allow_simulators: bool,
}

fn default_filter_qubits() -> Option<usize> {
    Some(5)
}

fn default_true() -> bool {
    true
}

impl Default for BackendFilter {
    fn default() -> Self {
        Self {
            num_qubits: default_filter_qubits(),
            operational: true,
            allow_simulators: false,
        }
    }
}

impl BackendFilter {
    /// Filter on a specific qubit count.
    pub fn with_qubits(mut self, num_qubits: Option<usize>) -> Self {
        self.num_qubits = num_qubits;
        self
    }

    /// Check a backend against the filter.
    pub fn matches(&self, backend: &BackendInfo) -> bool {
        if self.operational && !backend.operational {
            return false;
        }
        if !self.allow_simulators && backend.simulator {
            return false;
        }
        self.num_qubits.is_none_or(|n| backend.num_qubits == n)
    }

    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        let width = self
            .num_qubits
            .map_or_else(|| "any-width".to_string(), |n| format!("{n}-qubit"));
        let kind = if self.allow_simulators {
            "backend"
        } else {
            "hardware backend"
        };
        if self.operational {
            format!("operational {width} {kind}")
        } else {
            format!("{width} {kind}")
        }
    }
}

/// Backend with the shortest queue.
///
/// Unknown queue lengths sort after every known one; ties keep the first
/// backend in listing order.
pub fn least_busy(backends: &[BackendInfo]) -> Option<&BackendInfo> {
    backends
        .iter()
        .enumerate()
        .min_by_key(|(i, b)| (b.pending_jobs.map_or(u64::MAX, u64::from), *i))
        .map(|(_, b)| b)
}

/// List backends, apply `filter`, and pick the least busy match.
pub async fn select_backend(
    service: &dyn RuntimeService,
    filter: &BackendFilter,
) -> RuntimeResult<BackendInfo> {
    let backends = service.list_backends().await?;
    let candidates: Vec<BackendInfo> = backends
        .into_iter()
        .filter(|b| filter.matches(b))
        .collect();
    tracing::debug!(
        service = service.name(),
        candidates = candidates.len(),
        "filtered backends"
    );

    least_busy(&candidates)
        .cloned()
        .ok_or_else(|| RuntimeError::NoBackendAvailable(format!("no {}", filter.describe())))
}

/// Use `explicit` when given, otherwise select by `filter`.
pub async fn resolve_backend(
    service: &dyn RuntimeService,
    explicit: Option<&str>,
    filter: &BackendFilter,
) -> RuntimeResult<String> {
    if let Some(name) = explicit {
        tracing::info!(backend = name, "using configured backend");
        return Ok(name.to_string());
    }
    let chosen = select_backend(service, filter).await?;
    tracing::info!(
        backend = %chosen.name,
        pending_jobs = ?chosen.pending_jobs,
        "selected least busy backend"
    );
    Ok(chosen.name)
}

/// A remote service that runs named programs.
#[async_trait]
pub trait RuntimeService: Send + Sync {
    /// Service name for logs.
    fn name(&self) -> &str;

    /// Backends visible to the current credentials.
    async fn list_backends(&self) -> RuntimeResult<Vec<BackendInfo>>;

    /// Submit one job of `program_id` and return its identifier.
    async fn run(
        &self,
        program_id: &str,
        options: &RunOptions,
        inputs: &VqeInputs,
    ) -> RuntimeResult<JobId>;

    /// One status snapshot; never waits.
    async fn job_status(&self, job_id: &JobId) -> RuntimeResult<JobStatus>;
}
