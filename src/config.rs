//! Runtime settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional file,
//! then `FLOWSCORE_*` environment variables (`FLOWSCORE_API__ENDPOINT`,
//! `FLOWSCORE_POLL__INTERVAL_MS`, ...). Command-line overrides are applied
//! by the binary on top of the result.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use flowscore_adapters::nifi::NifiAdapter;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::DEFAULT_CRAWL_CONCURRENCY;
use crate::source::{paths, AdapterError};
use crate::trend::{cpu_window_capacity, CpuSource, DEFAULT_CPU_WINDOW, DEFAULT_HEAP_WINDOW};

pub const ENV_PREFIX: &str = "FLOWSCORE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub poll: PollSettings,
    pub trend: TrendSettings,
}

/// How to reach the flow API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the REST API, e.g. `https://nifi:8443/nifi-api`.
    pub endpoint: String,
    /// Pre-issued bearer token, if the API requires one.
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub verify_tls: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/nifi-api".to_string(),
            token: None,
            timeout_secs: 10,
            verify_tls: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_ms: u64,
    /// Process group the refresh starts from.
    pub root_group: String,
    pub crawl_concurrency: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: 30_000,
            root_group: paths::ROOT_ALIAS.to_string(),
            crawl_concurrency: DEFAULT_CRAWL_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSettings {
    /// Heap samples in the growth regression.
    pub heap_window: usize,
    /// Span of CPU history behind the spike threshold.
    pub cpu_window_secs: u64,
    pub cpu_source: CpuSource,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            heap_window: DEFAULT_HEAP_WINDOW,
            cpu_window_secs: DEFAULT_CPU_WINDOW.as_secs(),
            cpu_source: CpuSource::default(),
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Poll interval, at least one millisecond.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms.max(1))
    }

    /// CPU samples needed to cover `cpu_window_secs` at the poll interval.
    pub fn cpu_window_capacity(&self) -> usize {
        cpu_window_capacity(Duration::from_secs(self.trend.cpu_window_secs), self.interval())
    }

    /// Build the HTTP adapter described by [`ApiSettings`].
    pub fn build_adapter(&self) -> std::result::Result<NifiAdapter, AdapterError> {
        let mut builder = NifiAdapter::builder()
            .endpoint(self.api.endpoint.as_str())
            .timeout(Duration::from_secs(self.api.timeout_secs.max(1)))
            .accept_invalid_certs(!self.api.verify_tls);
        if let Some(token) = &self.api.token {
            builder = builder.bearer_token(token.as_str());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.poll.root_group, "root");
        assert_eq!(settings.trend.heap_window, 20);
        assert_eq!(settings.trend.cpu_source, CpuSource::Diagnostics);
        assert_eq!(settings.interval(), Duration::from_secs(30));
        assert_eq!(settings.cpu_window_capacity(), 2_880);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
endpoint = "https://nifi.example:8443/nifi-api"
verify_tls = false

[poll]
interval_ms = 60000
root_group = "pg-ingest"

[trend]
cpu_source = "host"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.api.endpoint, "https://nifi.example:8443/nifi-api");
        assert!(!settings.api.verify_tls);
        assert_eq!(settings.api.timeout_secs, 10);
        assert_eq!(settings.poll.root_group, "pg-ingest");
        assert_eq!(settings.poll.crawl_concurrency, DEFAULT_CRAWL_CONCURRENCY);
        assert_eq!(settings.trend.cpu_source, CpuSource::Host);
        assert_eq!(settings.cpu_window_capacity(), 1_440);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_adapter_from_settings() {
        let mut settings = Settings::default();
        settings.api.token = Some("secret".to_string());
        let adapter = settings.build_adapter().unwrap();
        assert_eq!(adapter.endpoint(), "http://localhost:8080/nifi-api");
    }
}
