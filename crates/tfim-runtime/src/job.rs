//! Job identifiers and status snapshots.
//!
//! The sweep never waits on a job: it reads one status snapshot right after
//! submission. The states mirror what runtime services report:
//!
//! ```text
//!   run() ──→ Initializing ──→ Queued ──→ Validating ──→ Running ──→ Completed
//!                                                          │
//!                                                          ├──→ Failed(reason)
//!                                                          └──→ Cancelled
//! ```

use serde::{Deserialize, Serialize};

/// Identifier assigned to a job by the runtime service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a runtime job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Accepted, not yet queued.
    Initializing,
    /// Waiting in the backend queue.
    Queued,
    /// Inputs are being validated.
    Validating,
    /// Executing.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed(String),
    /// Cancelled by the user or the service.
    Cancelled,
    /// A status string this client does not recognise.
    Unknown(String),
}

impl JobStatus {
    /// Map a service status string (any case) to a status.
    ///
    /// `reason` is attached to failures when the service supplies one.
    pub fn from_service(status: &str, reason: Option<&str>) -> Self {
        let normalized = status.trim().to_uppercase();
        match normalized.as_str() {
            "INITIALIZING" | "CREATING" => JobStatus::Initializing,
            "QUEUED" | "PENDING" => JobStatus::Queued,
            "VALIDATING" => JobStatus::Validating,
            "RUNNING" => JobStatus::Running,
            "COMPLETED" | "DONE" => JobStatus::Completed,
            "FAILED" | "ERROR" => {
                JobStatus::Failed(reason.unwrap_or("no reason given").to_string())
            }
            s if s.starts_with("CANCELLED") => JobStatus::Cancelled,
            _ => JobStatus::Unknown(status.to_string()),
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed(_) | JobStatus::Cancelled
        )
    }

    /// Check if the job is still waiting or executing.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            JobStatus::Initializing | JobStatus::Queued | JobStatus::Validating | JobStatus::Running
        )
    }

    /// Short name without the failure reason.
    pub fn name(&self) -> &str {
        match self {
            JobStatus::Initializing => "Initializing",
            JobStatus::Queued => "Queued",
            JobStatus::Validating => "Validating",
            JobStatus::Running => "Running",
            JobStatus::Completed => "Completed",
            JobStatus::Failed(_) => "Failed",
            JobStatus::Cancelled => "Cancelled",
            JobStatus::Unknown(_) => "Unknown",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Failed(msg) => write!(f, "Failed: {msg}"),
            JobStatus::Unknown(raw) => write!(f, "Unknown ({raw})"),
            other => f.write_str(other.name()),
        }
    }
}
