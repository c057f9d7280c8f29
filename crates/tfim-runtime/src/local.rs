//! In-process runtime service for dry runs.
//!
//! Accepts every submission, records it, and hands back a synthetic
//! `dry-run-<uuid>` identifier. Nothing is executed.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{RuntimeError, RuntimeResult};
use crate::job::{JobId, JobStatus};
use crate::program::{RunOptions, VqeInputs};
use crate::service::{BackendInfo, RuntimeService};

/// A job accepted by [`LocalRuntime`].
#[derive(Debug, Clone)]
pub struct LocalSubmission {
    /// Assigned identifier.
    pub job_id: JobId,
    /// Program name.
    pub program_id: String,
    /// Options as passed to `run`.
    pub options: RunOptions,
    /// Inputs as passed to `run`.
    pub inputs: VqeInputs,
    /// Acceptance time.
    pub submitted_at: DateTime<Utc>,
}

/// Runtime service that records jobs instead of sending them.
#[derive(Debug)]
pub struct LocalRuntime {
    backends: Vec<BackendInfo>,
    submissions: Mutex<Vec<LocalSubmission>>,
}

impl Default for LocalRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalRuntime {
    /// A service exposing one operational 5-qubit device named `local_5q`.
    pub fn new() -> Self {
        Self::with_backends(vec![BackendInfo {
            name: "local_5q".to_string(),
            num_qubits: 5,
            operational: true,
            simulator: false,
            pending_jobs: Some(0),
            status_msg: Some("dry run".to_string()),
        }])
    }

    /// A service exposing the given backends.
    pub fn with_backends(backends: Vec<BackendInfo>) -> Self {
        Self {
            backends,
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Everything submitted so far, in order.
    pub fn submissions(&self) -> Vec<LocalSubmission> {
        self.submissions
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RuntimeService for LocalRuntime {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "local"
    }

    async fn list_backends(&self) -> RuntimeResult<Vec<BackendInfo>> {
        Ok(self.backends.clone())
    }

    async fn run(
        &self,
        program_id: &str,
        options: &RunOptions,
        inputs: &VqeInputs,
    ) -> RuntimeResult<JobId> {
        let job_id = JobId::new(format!("dry-run-{}", uuid::Uuid::new_v4()));
        let mut submissions = self
            .submissions
            .lock()
            .map_err(|_| RuntimeError::Backend("local job log poisoned".into()))?;
        submissions.push(LocalSubmission {
            job_id: job_id.clone(),
            program_id: program_id.to_string(),
            options: options.clone(),
            inputs: inputs.clone(),
            submitted_at: Utc::now(),
        });
        tracing::debug!(%job_id, program_id, "recorded local submission");
        Ok(job_id)
    }

    async fn job_status(&self, job_id: &JobId) -> RuntimeResult<JobStatus> {
        let submissions = self
            .submissions
            .lock()
            .map_err(|_| RuntimeError::Backend("local job log poisoned".into()))?;
        if submissions.iter().any(|s| &s.job_id == job_id) {
            Ok(JobStatus::Queued)
        } else {
            Err(RuntimeError::JobNotFound(job_id.to_string()))
        }
    }
}
