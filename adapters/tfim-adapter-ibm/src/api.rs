//! IBM Quantum Platform REST client.
//!
//! Covers what the field sweep needs from the runtime API:
//! - Authentication via IAM token exchange (cloud) or a direct token (legacy)
//! - Listing backends with their queue lengths
//! - Submitting runtime program jobs
//! - Reading job status
//!
//! Supports both the IBM Cloud API (`quantum.cloud.ibm.com/api`) and the
//! legacy endpoint (`api.quantum-computing.ibm.com`).

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response, header};
use serde::{Deserialize, Serialize};
use tfim_runtime::JobStatus;

use crate::error::{IbmError, IbmResult};

/// Default IBM Quantum Cloud API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://quantum.cloud.ibm.com/api";

/// Legacy IBM Quantum API endpoint.
pub const LEGACY_ENDPOINT: &str = "https://api.quantum-computing.ibm.com";

/// IBM Cloud IAM token endpoint.
const IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";

/// IBM API version header value.
const IBM_API_VERSION: &str = "2026-02-01";

/// User-Agent sent with requests (Cloudflare blocks the default reqwest UA).
const USER_AGENT: &str = concat!("tfim-sweep/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// IBM Quantum API client.
pub struct IbmClient {
    client: Client,
    endpoint: String,
    cloud_api: bool,
}

impl fmt::Debug for IbmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("cloud_api", &self.cloud_api)
            .finish()
    }
}

/// IAM token response from `iam.cloud.ibm.com`.
#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
}

fn json_headers(token: &str) -> IbmResult<header::HeaderMap> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| IbmError::InvalidToken)?,
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    Ok(headers)
}

fn build_client(headers: header::HeaderMap) -> IbmResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?)
}

/// Form-encoded API key exchange against the IAM token endpoint.
fn iam_token_request(client: &Client, api_key: &str) -> reqwest::RequestBuilder {
    client.post(IAM_TOKEN_URL).form(&[
        ("grant_type", "urn:ibm:params:oauth:grant-type:apikey"),
        ("apikey", api_key),
    ])
}

/// Turn a non-success response into an [`IbmError::ApiError`].
async fn api_error(response: Response, context: &str) -> IbmError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) if !parsed.message.is_empty() => IbmError::ApiError {
            status,
            code: parsed.code,
            message: format!("{context}: {}", parsed.message),
        },
        _ => IbmError::ApiError {
            status,
            code: None,
            message: format!("{context}: {body}"),
        },
    }
}

impl IbmClient {
    /// Client for the legacy direct-token mode.
    ///
    /// For the IBM Cloud API, use [`IbmClient::connect`] instead.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> IbmResult<Self> {
        let token = token.into();
        Ok(Self {
            client: build_client(json_headers(&token)?)?,
            endpoint: endpoint.into(),
            cloud_api: false,
        })
    }

    /// Client for the IBM Cloud API.
    ///
    /// Exchanges the API key for an IAM bearer token and sets the
    /// `Service-CRN` and `IBM-API-Version` headers on every request.
    pub async fn connect(api_key: &str, service_crn: &str) -> IbmResult<Self> {
        let iam_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let iam_response = iam_token_request(&iam_client, api_key)
            .send()
            .await
            .map_err(|e| IbmError::IamTokenExchange(e.to_string()))?;

        if !iam_response.status().is_success() {
            let status = iam_response.status();
            let body = iam_response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(IbmError::IamTokenExchange(format!(
                "IAM returned {status}: {body}"
            )));
        }

        let iam_token: IamTokenResponse = iam_response.json().await.map_err(|e| {
            IbmError::IamTokenExchange(format!("failed to parse IAM response: {e}"))
        })?;

        let mut headers = json_headers(&iam_token.access_token)?;
        headers.insert(
            header::HeaderName::from_static("service-crn"),
            header::HeaderValue::from_str(service_crn)
                .map_err(|_| IbmError::InvalidParameter("invalid Service-CRN value".into()))?,
        );
        headers.insert(
            header::HeaderName::from_static("ibm-api-version"),
            header::HeaderValue::from_static(IBM_API_VERSION),
        );

        Ok(Self {
            client: build_client(headers)?,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cloud_api: true,
        })
    }

    /// Point the client at a different base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether this client uses the IBM Cloud API.
    pub fn is_cloud_api(&self) -> bool {
        self.cloud_api
    }

    /// Backends visible to the credentials.
    ///
    /// On the Cloud API the device list only carries names, so configuration
    /// and status are fetched per device. Devices that fail are skipped.
    pub async fn list_backends(&self) -> IbmResult<Vec<IbmBackendInfo>> {
        let url = format!("{}/v1/backends", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "list backends failed").await);
        }

        if !self.cloud_api {
            let backends: LegacyBackendsResponse = response.json().await?;
            return Ok(backends.backends);
        }

        let devices: DevicesResponse = response.json().await?;
        let mut backends = Vec::with_capacity(devices.devices.len());
        for device in &devices.devices {
            match self.get_backend(&device.name).await {
                Ok(info) => backends.push(info),
                Err(e) => tracing::warn!(backend = %device.name, "skipping backend: {e}"),
            }
        }
        Ok(backends)
    }

    /// Details for one backend.
    pub async fn get_backend(&self, name: &str) -> IbmResult<IbmBackendInfo> {
        if self.cloud_api {
            self.get_backend_cloud(name).await
        } else {
            self.get_backend_legacy(name).await
        }
    }

    async fn get_backend_cloud(&self, name: &str) -> IbmResult<IbmBackendInfo> {
        let config_url = format!("{}/v1/backends/{name}/configuration", self.endpoint);
        let config_response = self.client.get(&config_url).send().await?;
        if config_response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        if !config_response.status().is_success() {
            return Err(api_error(config_response, &format!("configuration of {name}")).await);
        }
        let config: BackendConfigResponse = config_response.json().await?;

        let status_url = format!("{}/v1/backends/{name}/status", self.endpoint);
        let status_response = self.client.get(&status_url).send().await?;
        let status = if status_response.status().is_success() {
            let s: BackendStatusResponse = status_response.json().await?;
            BackendStatus {
                operational: s.state,
                status_msg: Some(s.status),
                pending_jobs: Some(u32::try_from(s.length_queue).unwrap_or(u32::MAX)),
            }
        } else {
            tracing::debug!(backend = name, "status unavailable, queue length unknown");
            BackendStatus {
                operational: true,
                status_msg: None,
                pending_jobs: None,
            }
        };

        Ok(IbmBackendInfo {
            name: config.backend_name,
            num_qubits: config.n_qubits,
            status,
            simulator: config.simulator.unwrap_or(false),
        })
    }

    async fn get_backend_legacy(&self, name: &str) -> IbmResult<IbmBackendInfo> {
        let url = format!("{}/v1/backends/{name}", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmError::BackendUnavailable(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, &format!("backend {name}")).await);
        }
        Ok(response.json().await?)
    }

    /// Submit one job of a runtime program.
    ///
    /// `instance` is `(hub, group, project)`; it is sent as three separate
    /// fields when present.
    pub async fn submit_program_job(
        &self,
        program_id: &str,
        backend: &str,
        instance: Option<(&str, &str, &str)>,
        params: serde_json::Value,
    ) -> IbmResult<SubmitResponse> {
        let url = format!("{}/v1/jobs", self.endpoint);
        let request = ProgramJobRequest::new(program_id, backend, instance, params);

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(api_error(response, "job submission failed").await);
        }
        Ok(response.json().await?)
    }

    /// One status snapshot of a job.
    pub async fn get_job_status(&self, job_id: &str) -> IbmResult<JobStatusResponse> {
        let url = format!("{}/v1/jobs/{job_id}", self.endpoint);
        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmError::JobNotFound(job_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(api_error(response, &format!("status of job {job_id}")).await);
        }
        Ok(response.json().await?)
    }
}

// ============================================================================
// Request types
// ============================================================================

/// Runtime program job request.
#[derive(Debug, Serialize)]
struct ProgramJobRequest<'a> {
    program_id: &'a str,
    backend: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    hub: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    params: serde_json::Value,
}

impl<'a> ProgramJobRequest<'a> {
    fn new(
        program_id: &'a str,
        backend: &'a str,
        instance: Option<(&'a str, &'a str, &'a str)>,
        params: serde_json::Value,
    ) -> Self {
        let (hub, group, project) = match instance {
            Some((h, g, p)) => (Some(h), Some(g), Some(p)),
            None => (None, None, None),
        };
        Self {
            program_id,
            backend,
            hub,
            group,
            project,
            params,
        }
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Cloud API device list (`{"devices": [...]}`).
#[derive(Debug, Deserialize)]
struct DevicesResponse {
    devices: Vec<DeviceEntry>,
}

#[derive(Debug, Deserialize)]
struct DeviceEntry {
    name: String,
}

/// Legacy API backend list (`{"backends": [...]}`).
#[derive(Debug, Deserialize)]
struct LegacyBackendsResponse {
    backends: Vec<IbmBackendInfo>,
}

/// Cloud API `/backends/{name}/configuration`.
#[derive(Debug, Deserialize)]
struct BackendConfigResponse {
    backend_name: String,
    n_qubits: usize,
    #[serde(default)]
    simulator: Option<bool>,
}

/// Cloud API `/backends/{name}/status`.
#[derive(Debug, Deserialize)]
struct BackendStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default)]
    length_queue: u64,
}

/// Backend as reported by IBM Quantum.
#[derive(Debug, Clone, Deserialize)]
pub struct IbmBackendInfo {
    /// Backend name.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: usize,
    /// Backend status.
    pub status: BackendStatus,
    /// Whether this is a simulator.
    #[serde(default)]
    pub simulator: bool,
}

/// Backend status.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendStatus {
    /// Whether the backend accepts jobs.
    pub operational: bool,
    /// Status message.
    #[serde(default)]
    pub status_msg: Option<String>,
    /// Number of pending jobs.
    #[serde(default)]
    pub pending_jobs: Option<u32>,
}

impl From<IbmBackendInfo> for tfim_runtime::BackendInfo {
    fn from(info: IbmBackendInfo) -> Self {
        Self {
            name: info.name,
            num_qubits: info.num_qubits,
            operational: info.status.operational,
            simulator: info.simulator,
            pending_jobs: info.status.pending_jobs,
            status_msg: info.status.status_msg,
        }
    }
}

/// Job submission response.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Job ID.
    pub id: String,
    /// Initial status, when the service reports one.
    #[serde(default)]
    pub status: Option<String>,
}

/// Job status response.
#[derive(Debug, Clone, Deserialize)]
pub struct JobStatusResponse {
    /// Job ID.
    pub id: String,
    /// Job status (mixed case on the Cloud API).
    pub status: String,
    /// Backend name.
    #[serde(default)]
    pub backend: Option<String>,
    /// Error information if failed (legacy API).
    #[serde(default)]
    pub error: Option<JobError>,
    /// State object with reason (Cloud API).
    #[serde(default)]
    pub state: Option<JobState>,
}

/// Job error information (legacy API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobError {
    /// Error message.
    pub message: String,
}

/// Job state with reason (Cloud API).
#[derive(Debug, Clone, Deserialize)]
pub struct JobState {
    /// Status string.
    #[serde(default)]
    pub status: String,
    /// Reason for failure.
    #[serde(default)]
    pub reason: Option<String>,
}

impl JobStatusResponse {
    /// Failure reason, from `state.reason` or the legacy `error.message`.
    pub fn error_message(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|s| s.reason.as_deref())
            .or_else(|| self.error.as_ref().map(|e| e.message.as_str()))
    }

    /// Status in the runtime's terms.
    pub fn to_status(&self) -> JobStatus {
        JobStatus::from_service(&self.status, self.error_message())
    }
}
