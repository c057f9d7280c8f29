//! Sweep driver against a scripted runtime service.
//!
//! `ScriptedService` records every submission and can be told to reject
//! particular submissions or to fail every status query, so the driver's
//! ordering and failure handling can be checked without a network.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tfim_ops::operator::DEFAULT_ATOL;
use tfim_ops::{SparsePauliOp, ising_hamiltonian};
use tfim_runtime::{
    BackendInfo, FieldSweep, JobId, JobStatus, RunOptions, RuntimeError, RuntimeResult,
    RuntimeService, SweepConfig, SweepDriver, SweepOutcome, VqeInputs,
};

struct ScriptedService {
    backends: Vec<BackendInfo>,
    reject: HashSet<usize>,
    status_fails: bool,
    calls: AtomicUsize,
    submitted: Mutex<Vec<(String, RunOptions, VqeInputs)>>,
}

impl ScriptedService {
    fn new() -> Self {
        Self {
            backends: vec![
                backend("ibmq_lima", 5, Some(31)),
                backend("ibmq_quito", 5, Some(4)),
                backend("ibm_nairobi", 7, Some(0)),
            ],
            reject: HashSet::new(),
            status_fails: false,
            calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        }
    }

    fn rejecting(mut self, call: usize) -> Self {
        self.reject.insert(call);
        self
    }

    fn with_failing_status(mut self) -> Self {
        self.status_fails = true;
        self
    }

    fn submitted(&self) -> Vec<(String, RunOptions, VqeInputs)> {
        self.submitted.lock().unwrap().clone()
    }
}

fn backend(name: &str, qubits: usize, pending: Option<u32>) -> BackendInfo {
    BackendInfo {
        name: name.to_string(),
        num_qubits: qubits,
        operational: true,
        simulator: false,
        pending_jobs: pending,
        status_msg: None,
    }
}

#[async_trait]
impl RuntimeService for ScriptedService {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "scripted"
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
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject.contains(&call) {
            return Err(RuntimeError::SubmissionFailed(format!(
                "rejected call {call}"
            )));
        }
        self.submitted.lock().unwrap().push((
            program_id.to_string(),
            options.clone(),
            inputs.clone(),
        ));
        Ok(JobId::new(format!("job-{call}")))
    }

    async fn job_status(&self, _job_id: &JobId) -> RuntimeResult<JobStatus> {
        if self.status_fails {
            Err(RuntimeError::Backend("status endpoint down".into()))
        } else {
            Ok(JobStatus::Queued)
        }
    }
}

fn operator_from_wire(wire: &[(String, f64)]) -> SparsePauliOp {
    SparsePauliOp::from_list(wire).unwrap()
}

#[tokio::test]
async fn test_one_job_per_field_in_ascending_order() {
    let service = ScriptedService::new();
    let config = SweepConfig::default();
    let sweep = FieldSweep::default_ising();

    let driver = SweepDriver::resolve(&service, &config).await.unwrap();
    assert_eq!(driver.backend(), "ibmq_quito");

    let mut seen = Vec::new();
    let report = driver
        .run(&sweep, |record| seen.push(record.h))
        .await
        .unwrap();

    assert_eq!(report.records.len(), 11);
    assert_eq!(report.submitted(), 11);
    assert_eq!(report.failed(), 0);
    assert_eq!(seen, sweep.values());

    let submitted = service.submitted();
    assert_eq!(submitted.len(), 11);
    for ((program_id, options, inputs), &h) in submitted.iter().zip(sweep.values()) {
        assert_eq!(program_id, "vqe");
        assert_eq!(options.backend_name, "ibmq_quito");
        assert_eq!(options.instance.as_deref(), Some("ibm-q/open/main"));
        assert_eq!(inputs.shots, 1024);
        assert!(inputs.measurement_error_mitigation);
        assert!(inputs.initial_parameters.is_none());
        assert_eq!(inputs.optimizer.maxiter, 1000);
        assert_eq!(inputs.ansatz.num_parameters, 24);

        let expected = ising_hamiltonian(4, h, 0.1, 1.0).unwrap();
        assert!(operator_from_wire(&inputs.operator).equiv(&expected, DEFAULT_ATOL));
        assert_eq!(inputs.aux_operators.len(), 2);
        assert_eq!(inputs.aux_operators["x_mag"].len(), 4);
        assert_eq!(inputs.aux_operators["z_mag"].len(), 4);
    }
}

#[tokio::test]
async fn test_records_carry_job_ids_and_status() {
    let service = ScriptedService::new();
    let config = SweepConfig::default();
    let sweep = FieldSweep::with_values([0.5, 1.0]).unwrap();

    let driver = SweepDriver::new(&service, &config, "ibmq_lima").unwrap();
    let report = driver.run(&sweep, |_| {}).await.unwrap();

    assert_eq!(report.backend, "ibmq_lima");
    assert_eq!(report.records[0].job_id().unwrap().as_str(), "job-0");
    assert_eq!(report.records[1].index, 1);
    assert_eq!(
        report.records[1].outcome,
        SweepOutcome::Submitted {
            job_id: JobId::new("job-1"),
            status: JobStatus::Queued,
        }
    );
}

#[tokio::test]
async fn test_explicit_backend_bypasses_selection() {
    let service = ScriptedService::new();
    let config = SweepConfig {
        backend: Some("ibm_nairobi".into()),
        ..SweepConfig::default()
    };
    let driver = SweepDriver::resolve(&service, &config).await.unwrap();
    assert_eq!(driver.backend(), "ibm_nairobi");
}

#[tokio::test]
async fn test_no_matching_backend() {
    let service = ScriptedService::new();
    let config = SweepConfig {
        backend_qubits: Some(27),
        ..SweepConfig::default()
    };
    let err = SweepDriver::resolve(&service, &config).await.unwrap_err();
    assert!(matches!(err, RuntimeError::NoBackendAvailable(_)));
}

#[tokio::test]
async fn test_first_failure_aborts() {
    let service = ScriptedService::new().rejecting(2);
    let config = SweepConfig::default();
    let sweep = FieldSweep::default_ising();

    let mut callbacks = 0;
    let driver = SweepDriver::new(&service, &config, "ibmq_quito").unwrap();
    let err = driver
        .run(&sweep, |_| callbacks += 1)
        .await
        .unwrap_err();

    assert!(matches!(err, RuntimeError::SubmissionFailed(_)));
    assert!(err.to_string().contains("rejected call 2"));
    assert_eq!(callbacks, 2);
    assert_eq!(service.submitted().len(), 2);
}

#[tokio::test]
async fn test_continue_on_error_records_failure() {
    let service = ScriptedService::new().rejecting(0).rejecting(5);
    let config = SweepConfig {
        continue_on_error: true,
        ..SweepConfig::default()
    };
    let sweep = FieldSweep::default_ising();

    let driver = SweepDriver::new(&service, &config, "ibmq_quito").unwrap();
    let report = driver.run(&sweep, |_| {}).await.unwrap();

    assert_eq!(report.records.len(), 11);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.submitted(), 9);
    assert!(report.records[0].is_failed());
    assert!(report.records[5].is_failed());
    assert!(report.records[0].job_id().is_none());
    assert_eq!(service.submitted().len(), 9);
}

#[tokio::test]
async fn test_status_failure_does_not_abort() {
    let service = ScriptedService::new().with_failing_status();
    let config = SweepConfig::default();
    let sweep = FieldSweep::with_values([0.1, 0.2, 0.3]).unwrap();

    let driver = SweepDriver::new(&service, &config, "ibmq_quito").unwrap();
    let report = driver.run(&sweep, |_| {}).await.unwrap();

    assert_eq!(report.submitted(), 3);
    for record in &report.records {
        match &record.outcome {
            SweepOutcome::Submitted { status, .. } => {
                assert!(matches!(status, JobStatus::Unknown(msg) if msg.contains("status endpoint down")));
            }
            SweepOutcome::Failed { .. } => panic!("status failure must not fail the record"),
        }
    }
}

#[tokio::test]
async fn test_custom_model_parameters() {
    let service = ScriptedService::new();
    let config = SweepConfig {
        num_qubits: 3,
        h_bias: 0.0,
        coupling: 0.5,
        shots: 4000,
        measurement_error_mitigation: false,
        instance: None,
        ..SweepConfig::default()
    };
    let sweep = FieldSweep::with_values([2.0]).unwrap();

    let driver = SweepDriver::new(&service, &config, "ibmq_quito").unwrap();
    driver.run(&sweep, |_| {}).await.unwrap();

    let (_, options, inputs) = service.submitted().remove(0);
    assert_eq!(options.instance, None);
    assert_eq!(inputs.shots, 4000);
    assert!(!inputs.measurement_error_mitigation);
    // the h_z block survives even at zero bias
    assert_eq!(inputs.operator.len(), 9);
    let expected = ising_hamiltonian(3, 2.0, 0.0, 0.5).unwrap();
    assert!(operator_from_wire(&inputs.operator).equiv(&expected, DEFAULT_ATOL));
}

#[test]
fn test_invalid_config_rejected_before_submission() {
    let service = ScriptedService::new();
    let bad_instance = SweepConfig {
        instance: Some("ibm-q/open".into()),
        ..SweepConfig::default()
    };
    assert!(matches!(
        SweepDriver::new(&service, &bad_instance, "ibmq_quito").unwrap_err(),
        RuntimeError::InvalidParameter(_)
    ));

    let one_qubit = SweepConfig {
        num_qubits: 1,
        ..SweepConfig::default()
    };
    assert!(matches!(
        SweepDriver::new(&service, &one_qubit, "ibmq_quito").unwrap_err(),
        RuntimeError::Config(_)
    ));
    assert!(service.submitted().is_empty());
}
