//! `tfim-runtime` — submit VQE field sweeps to a quantum runtime service.
//!
//! The crate separates three concerns:
//!
//! - [`program`]: the JSON input bundle of the remote `vqe` program
//!   (ansatz, operator, optimizer, auxiliary observables)
//! - [`service`]: the [`RuntimeService`] trait implemented by remote
//!   adapters and by the in-process [`LocalRuntime`]
//! - [`sweep`]: the [`SweepDriver`] that walks a [`FieldSweep`] and submits
//!   one job per field value
//!
//! # Example
//!
//! ```rust
//! use tfim_runtime::{FieldSweep, LocalRuntime, SweepConfig, SweepDriver};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let service = LocalRuntime::new();
//! let config = SweepConfig::default();
//! let driver = SweepDriver::resolve(&service, &config).await.unwrap();
//!
//! let report = driver
//!     .run(&FieldSweep::default_ising(), |record| println!("h = {}", record.h))
//!     .await
//!     .unwrap();
//! assert_eq!(report.submitted(), 11);
//! # });
//! ```

pub mod config;
pub mod error;
pub mod job;
pub mod local;
pub mod program;
pub mod service;
pub mod sweep;

pub use config::{ConfigError, SweepConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use job::{JobId, JobStatus};
pub use local::{LocalRuntime, LocalSubmission};
pub use program::{
    AnsatzPayload, EfficientSu2, Entanglement, RunOptions, Spsa, Su2Gate, Su2Layout, VqeInputs,
    WireOperator,
};
pub use service::{
    BackendFilter, BackendInfo, RuntimeService, least_busy, resolve_backend, select_backend,
};
pub use sweep::{FieldSweep, SweepDriver, SweepOutcome, SweepRecord, SweepReport};
