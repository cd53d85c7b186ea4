//! NiFi adapter using the REST API.
//!
//! Issues authenticated `GET` requests against the `nifi-api` root and
//! returns the raw JSON documents. Token acquisition is out of scope: the
//! adapter accepts a pre-issued bearer token, or none for unsecured
//! instances.
//!
//! ## Documents Read by flowscore
//!
//! - `/process-groups/{id}` and its `/process-groups`, `/processors`,
//!   `/connections`, `/input-ports`, `/output-ports` listings
//! - `/flow/status` for connection queue state
//! - `/system-diagnostics` for heap and load figures
//!
//! ## Example
//!
//! ```rust,no_run
//! use flowscore_adapters::nifi::NifiAdapter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = NifiAdapter::builder()
//!         .endpoint("http://localhost:8080/nifi-api")
//!         .build()?;
//!
//!     let diagnostics = adapter.get_json("/system-diagnostics").await?;
//!     let heap = &diagnostics["systemDiagnostics"]["aggregateSnapshot"]["usedHeapBytes"];
//!     println!("heap used: {}", heap);
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::AdapterError;

const DEFAULT_ENDPOINT: &str = "http://localhost:8080/nifi-api";

/// NiFi adapter for fetching REST documents.
#[derive(Debug, Clone)]
pub struct NifiAdapter {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
}

impl NifiAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> NifiAdapterBuilder {
        NifiAdapterBuilder::default()
    }

    /// The REST root every path is resolved against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the JSON document at `path` (relative to the endpoint).
    pub async fn get_json(&self, path: &str) -> Result<Value, AdapterError> {
        let url = join_url(&self.endpoint, path);

        let mut request = self.client.get(&url).header(ACCEPT, "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AdapterError::Auth(format!(
                    "API returned status {} for {}",
                    response.status(),
                    path
                )));
            }
            StatusCode::NOT_FOUND => return Err(AdapterError::NotFound(path.to_string())),
            status if !status.is_success() => {
                return Err(AdapterError::Http(format!(
                    "API returned status {} for {}",
                    status, path
                )));
            }
            _ => {}
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(document)
    }
}

/// Builder for NifiAdapter.
#[derive(Debug, Default)]
pub struct NifiAdapterBuilder {
    endpoint: Option<String>,
    bearer_token: Option<String>,
    timeout: Option<Duration>,
    accept_invalid_certs: bool,
}

impl NifiAdapterBuilder {
    /// Set the REST root (e.g., "https://nifi.local:8443/nifi-api").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the per-request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Skip TLS certificate verification (self-signed lab instances).
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Build the adapter.
    pub fn build(self) -> Result<NifiAdapter, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| AdapterError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(NifiAdapter {
            client,
            endpoint: self
                .endpoint
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            bearer_token: self.bearer_token.filter(|t| !t.is_empty()),
        })
    }
}

// Join an endpoint and a path with exactly one slash between them
fn join_url(endpoint: &str, path: &str) -> String {
    format!(
        "{}/{}",
        endpoint.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
