//! IBM Quantum runtime service.

use async_trait::async_trait;
use tfim_runtime::{
    BackendInfo, JobId, JobStatus, RunOptions, RuntimeError, RuntimeResult, RuntimeService,
    VqeInputs,
};

use crate::api::{IbmClient, LEGACY_ENDPOINT};
use crate::error::{IbmError, IbmResult};

/// Credentials found in the environment.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// IBM Cloud API key plus the service instance CRN.
    Cloud {
        /// API key exchanged for an IAM token.
        api_key: String,
        /// Service instance CRN.
        service_crn: String,
    },
    /// Direct bearer token for the legacy endpoint.
    Legacy {
        /// Bearer token.
        token: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Cloud { service_crn, .. } => f
                .debug_struct("Cloud")
                .field("api_key", &"[REDACTED]")
                .field("service_crn", service_crn)
                .finish(),
            Credentials::Legacy { .. } => f
                .debug_struct("Legacy")
                .field("token", &"[REDACTED]")
                .finish(),
        }
    }
}

impl Credentials {
    /// Read `IBM_API_KEY` + `IBM_SERVICE_CRN`, falling back to
    /// `IBM_QUANTUM_TOKEN`.
    pub fn from_lookup<F>(lookup: F) -> IbmResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(api_key) = non_empty("IBM_API_KEY") {
            let service_crn = non_empty("IBM_SERVICE_CRN").ok_or(IbmError::MissingServiceCrn)?;
            return Ok(Credentials::Cloud {
                api_key,
                service_crn,
            });
        }
        if let Some(token) = non_empty("IBM_QUANTUM_TOKEN") {
            return Ok(Credentials::Legacy { token });
        }
        Err(IbmError::MissingToken)
    }
}

/// [`RuntimeService`] backed by the IBM Quantum REST API.
#[derive(Debug)]
pub struct IbmRuntime {
    client: IbmClient,
}

impl IbmRuntime {
    /// Wrap an existing client.
    pub fn new(client: IbmClient) -> Self {
        Self { client }
    }

    /// Connect with credentials from the process environment.
    ///
    /// `IBM_QUANTUM_ENDPOINT` overrides the API base URL in either mode.
    pub async fn from_env() -> IbmResult<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let credentials = Credentials::from_lookup(lookup)?;
        let endpoint = lookup("IBM_QUANTUM_ENDPOINT").filter(|v| !v.trim().is_empty());
        Self::connect(credentials, endpoint).await
    }

    /// Connect with explicit credentials.
    pub async fn connect(credentials: Credentials, endpoint: Option<String>) -> IbmResult<Self> {
        let client = match credentials {
            Credentials::Cloud {
                api_key,
                service_crn,
            } => {
                tracing::info!("connecting to IBM Cloud API (IAM key exchange)");
                IbmClient::connect(&api_key, &service_crn).await?
            }
            Credentials::Legacy { token } => {
                tracing::info!("using legacy IBM Quantum token");
                IbmClient::new(LEGACY_ENDPOINT, token)?
            }
        };
        let client = match endpoint {
            Some(url) => {
                tracing::debug!(endpoint = %url, "overriding API endpoint");
                client.with_endpoint(url)
            }
            None => client,
        };
        Ok(Self::new(client))
    }

    /// Underlying REST client.
    pub fn client(&self) -> &IbmClient {
        &self.client
    }
}

#[async_trait]
impl RuntimeService for IbmRuntime {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ibm-quantum"
    }

    async fn list_backends(&self) -> RuntimeResult<Vec<BackendInfo>> {
        let backends = self.client.list_backends().await?;
        tracing::debug!(count = backends.len(), "listed IBM backends");
        Ok(backends.into_iter().map(BackendInfo::from).collect())
    }

    async fn run(
        &self,
        program_id: &str,
        options: &RunOptions,
        inputs: &VqeInputs,
    ) -> RuntimeResult<JobId> {
        let params = inputs.to_json()?;
        // the cloud API identifies the instance through the Service-CRN header
        let instance = if self.client.is_cloud_api() {
            None
        } else {
            options.instance_parts()?
        };

        let response = self
            .client
            .submit_program_job(program_id, &options.backend_name, instance, params)
            .await
            .map_err(|e| {
                if e.is_auth_failure() {
                    RuntimeError::from(e)
                } else {
                    RuntimeError::SubmissionFailed(e.to_string())
                }
            })?;

        tracing::debug!(job_id = %response.id, status = ?response.status, "job accepted");
        Ok(JobId::new(response.id))
    }

    async fn job_status(&self, job_id: &JobId) -> RuntimeResult<JobStatus> {
        let response = self.client.get_job_status(job_id.as_str()).await?;
        Ok(response.to_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_cloud_credentials_preferred() {
        let creds = Credentials::from_lookup(env(&[
            ("IBM_API_KEY", "key"),
            ("IBM_SERVICE_CRN", "crn:v1:bluemix"),
            ("IBM_QUANTUM_TOKEN", "legacy"),
        ]))
        .unwrap();
        assert!(matches!(creds, Credentials::Cloud { .. }));
    }

    #[test]
    fn test_api_key_without_crn() {
        let err = Credentials::from_lookup(env(&[("IBM_API_KEY", "key")])).unwrap_err();
        assert!(matches!(err, IbmError::MissingServiceCrn));
    }

    #[test]
    fn test_legacy_fallback() {
        let creds = Credentials::from_lookup(env(&[
            ("IBM_API_KEY", "  "),
            ("IBM_QUANTUM_TOKEN", "tok"),
        ]))
        .unwrap();
        assert_eq!(
            creds,
            Credentials::Legacy {
                token: "tok".into()
            }
        );
    }

    #[test]
    fn test_no_credentials() {
        let err = Credentials::from_lookup(env(&[])).unwrap_err();
        assert!(matches!(err, IbmError::MissingToken));
        assert!(matches!(
            RuntimeError::from(err),
            RuntimeError::AuthenticationFailed(_)
        ));
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let creds = Credentials::Cloud {
            api_key: "secret-key".into(),
            service_crn: "crn:v1".into(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("crn:v1"));
    }

    #[tokio::test]
    async fn test_legacy_connect_with_endpoint_override() {
        let runtime = IbmRuntime::connect(
            Credentials::Legacy {
                token: "tok".into(),
            },
            Some("http://127.0.0.1:9".into()),
        )
        .await
        .unwrap();
        assert_eq!(runtime.name(), "ibm-quantum");
        assert_eq!(runtime.client().endpoint(), "http://127.0.0.1:9");
        assert!(!runtime.client().is_cloud_api());
    }
}
