//! IBM Quantum adapter for the TFIM field sweep.
//!
//! Implements [`tfim_runtime::RuntimeService`] on top of the IBM Quantum
//! runtime REST API.
//!
//! # Authentication
//!
//! Two modes are supported, tried in this order by [`IbmRuntime::from_env`]:
//!
//! 1. **IBM Cloud API** — `IBM_API_KEY` and `IBM_SERVICE_CRN`. The key is
//!    exchanged for an IAM bearer token at connect time.
//! 2. **Legacy token** — `IBM_QUANTUM_TOKEN` against
//!    `api.quantum-computing.ibm.com`.
//!
//! `IBM_QUANTUM_ENDPOINT` overrides the base URL in either mode.
//!
//! # Example
//!
//! ```ignore
//! use tfim_adapter_ibm::IbmRuntime;
//! use tfim_runtime::{FieldSweep, SweepConfig, SweepDriver};
//!
//! let service = IbmRuntime::from_env().await?;
//! let config = SweepConfig::load(None)?;
//! let driver = SweepDriver::resolve(&service, &config).await?;
//! let report = driver.run(&FieldSweep::default_ising(), |r| println!("{}", r.h)).await?;
//! ```

pub mod api;
pub mod backend;
pub mod error;

pub use api::{DEFAULT_ENDPOINT, IbmClient, LEGACY_ENDPOINT};
pub use backend::{Credentials, IbmRuntime};
pub use error::{IbmError, IbmResult};
