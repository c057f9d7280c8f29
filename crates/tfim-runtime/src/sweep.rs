//! Transverse-field sweep.
//!
//! One VQE job is submitted per field value, in ascending order, and a
//! single status snapshot is taken for each. Results are never awaited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tfim_ops::{Axis, SparsePauliOp, ising_hamiltonian, magnetisation_operator};

use crate::config::SweepConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::job::{JobId, JobStatus};
use crate::program::{EfficientSu2, RunOptions, VqeInputs};
use crate::service::{RuntimeService, resolve_backend};

/// Extra points around the critical field added to the default sweep.
const CRITICAL_REGION: [f64; 4] = [2.0, 1.5, 1.25, 0.75];

/// Strictly ascending list of finite field values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSweep {
    values: Vec<f64>,
}

impl FieldSweep {
    /// Seven log-spaced points from `10^-1.5` to `10^1.5` plus the
    /// critical-region points, 11 values in total.
    pub fn default_ising() -> Self {
        let mut values = logspace(-1.5, 1.5, 7);
        values.extend_from_slice(&CRITICAL_REGION);
        Self::normalise(values)
    }

    /// `num` points `10^x` with `x` evenly spaced over `[start_exp, stop_exp]`.
    pub fn log_spaced(start_exp: f64, stop_exp: f64, num: usize) -> RuntimeResult<Self> {
        if num == 0 {
            return Err(RuntimeError::InvalidParameter(
                "a sweep needs at least one point".into(),
            ));
        }
        Self::with_values(logspace(start_exp, stop_exp, num))
    }

    /// Sweep over arbitrary values; sorted and deduplicated.
    pub fn with_values<I>(values: I) -> RuntimeResult<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Err(RuntimeError::InvalidParameter(
                "a sweep needs at least one point".into(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(RuntimeError::InvalidParameter(format!(
                "field value {bad} is not finite"
            )));
        }
        Ok(Self::normalise(values))
    }

    fn normalise(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        values.dedup();
        Self { values }
    }

    /// Values in ascending order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed sweep.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn logspace(start_exp: f64, stop_exp: f64, num: usize) -> Vec<f64> {
    if num == 1 {
        return vec![10f64.powf(start_exp)];
    }
    let step = (stop_exp - start_exp) / (num - 1) as f64;
    (0..num)
        .map(|i| 10f64.powf(start_exp + step * i as f64))
        .collect()
}

/// What happened to one field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// The service accepted the job.
    Submitted {
        /// Identifier assigned by the service.
        job_id: JobId,
        /// Status snapshot taken right after submission.
        status: JobStatus,
    },
    /// Submission failed and the sweep continued.
    Failed {
        /// Error message.
        error: String,
    },
}

/// One row of the sweep report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRecord {
    /// Position in the sweep.
    pub index: usize,
    /// Transverse field.
    pub h: f64,
    /// Submission result.
    #[serde(flatten)]
    pub outcome: SweepOutcome,
    /// When the submission was attempted.
    pub submitted_at: DateTime<Utc>,
}

impl SweepRecord {
    /// Job identifier, if the submission succeeded.
    pub fn job_id(&self) -> Option<&JobId> {
        match &self.outcome {
            SweepOutcome::Submitted { job_id, .. } => Some(job_id),
            SweepOutcome::Failed { .. } => None,
        }
    }

    /// Whether the submission failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SweepOutcome::Failed { .. })
    }
}

/// Result of a whole sweep, kept in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Backend every job targeted.
    pub backend: String,
    /// Runtime program name.
    pub program_id: String,
    /// One record per attempted field value, ascending.
    pub records: Vec<SweepRecord>,
}

impl SweepReport {
    /// Number of accepted jobs.
    pub fn submitted(&self) -> usize {
        self.records.iter().filter(|r| !r.is_failed()).count()
    }

    /// Number of failed submissions.
    pub fn failed(&self) -> usize {
        self.records.iter().filter(|r| r.is_failed()).count()
    }
}

/// Submits one VQE job per field value.
///
/// The ansatz and both magnetisation operators are built once in
/// [`SweepDriver::new`]; only the Hamiltonian changes between jobs.
pub struct SweepDriver<'a> {
    service: &'a dyn RuntimeService,
    config: &'a SweepConfig,
    options: RunOptions,
    ansatz: EfficientSu2,
    x_mag: SparsePauliOp,
    z_mag: SparsePauliOp,
}

impl std::fmt::Debug for SweepDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepDriver")
            .field("service", &self.service.name())
            .field("options", &self.options)
            .field("num_qubits", &self.ansatz.num_qubits())
            .finish_non_exhaustive()
    }
}

impl<'a> SweepDriver<'a> {
    /// Driver targeting `backend_name`.
    pub fn new(
        service: &'a dyn RuntimeService,
        config: &'a SweepConfig,
        backend_name: impl Into<String>,
    ) -> RuntimeResult<Self> {
        config.validate()?;

        let n = config.num_qubits;
        let ansatz = EfficientSu2::new(n, config.ansatz.clone())?;
        let x_mag = magnetisation_operator(n, Axis::X)?;
        let z_mag = magnetisation_operator(n, Axis::Z)?;

        let mut options = RunOptions::new(backend_name);
        if let Some(instance) = &config.instance {
            options = options.with_instance(instance.clone());
            options.instance_parts()?;
        }

        Ok(Self {
            service,
            config,
            options,
            ansatz,
            x_mag,
            z_mag,
        })
    }

    /// Driver targeting the configured backend, or the least busy one that
    /// matches the configured filter.
    pub async fn resolve(
        service: &'a dyn RuntimeService,
        config: &'a SweepConfig,
    ) -> RuntimeResult<Self> {
        let backend =
            resolve_backend(service, config.backend.as_deref(), &config.backend_filter()).await?;
        Self::new(service, config, backend)
    }

    /// Backend every job targets.
    pub fn backend(&self) -> &str {
        &self.options.backend_name
    }

    /// Options sent with every job.
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Input bundle for field `h`.
    pub fn inputs_for(&self, h: f64) -> RuntimeResult<VqeInputs> {
        let hamiltonian =
            ising_hamiltonian(self.config.num_qubits, h, self.config.h_bias, self.config.coupling)?;
        VqeInputs::new(
            &self.ansatz,
            &hamiltonian,
            self.config.optimizer.clone(),
            &[("x_mag", &self.x_mag), ("z_mag", &self.z_mag)],
            self.config.initial_parameters.clone(),
            self.config.measurement_error_mitigation,
            self.config.shots,
        )
    }

    /// Submit the whole sweep, calling `on_record` after each field value.
    ///
    /// A failed submission aborts with [`RuntimeError::SubmissionFailed`]
    /// unless `continue_on_error` is set. A failed status query never
    /// aborts; the record carries [`JobStatus::Unknown`].
    pub async fn run<F>(&self, sweep: &FieldSweep, mut on_record: F) -> RuntimeResult<SweepReport>
    where
        F: FnMut(&SweepRecord),
    {
        let program_id = self.config.program_id.as_str();
        tracing::info!(
            service = self.service.name(),
            backend = self.backend(),
            program_id,
            points = sweep.len(),
            "starting field sweep"
        );

        let mut records = Vec::with_capacity(sweep.len());
        for (index, &h) in sweep.values().iter().enumerate() {
            let inputs = self.inputs_for(h)?;
            tracing::debug!(
                h,
                terms = inputs.operator.len(),
                parameters = inputs.ansatz.num_parameters,
                "assembled program inputs"
            );

            let submitted_at = Utc::now();
            let outcome = match self.service.run(program_id, &self.options, &inputs).await {
                Ok(job_id) => {
                    let status = self.snapshot(&job_id).await;
                    tracing::info!(h, %job_id, %status, "submitted job");
                    SweepOutcome::Submitted { job_id, status }
                }
                Err(err) if self.config.continue_on_error => {
                    tracing::warn!(h, error = %err, "submission failed, continuing");
                    SweepOutcome::Failed {
                        error: err.to_string(),
                    }
                }
                Err(err) => return Err(submission_failed(h, err)),
            };

            let record = SweepRecord {
                index,
                h,
                outcome,
                submitted_at,
            };
            on_record(&record);
            records.push(record);
        }

        Ok(SweepReport {
            backend: self.backend().to_string(),
            program_id: program_id.to_string(),
            records,
        })
    }

    async fn snapshot(&self, job_id: &JobId) -> JobStatus {
        match self.service.job_status(job_id).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(%job_id, error = %err, "status query failed");
                JobStatus::Unknown(err.to_string())
            }
        }
    }
}

fn submission_failed(h: f64, err: RuntimeError) -> RuntimeError {
    match err {
        RuntimeError::SubmissionFailed(msg) => {
            RuntimeError::SubmissionFailed(format!("h = {h}: {msg}"))
        }
        other => RuntimeError::SubmissionFailed(format!("h = {h}: {other}")),
    }
}
