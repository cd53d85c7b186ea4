//! In-memory flow API.
//!
//! Serves documents from a fixed path table. Used by tests and for replaying
//! captured API responses offline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::{AdapterError, FlowApi};

/// A flow API that answers from a static `path -> document` table.
///
/// Unknown paths fail with [`AdapterError::NotFound`]. Paths registered with
/// [`StaticFlowApi::with_failure`] fail with an HTTP error, which lets tests
/// exercise the partial-result paths of the crawler.
///
/// # Example
///
/// ```
/// use flowscore::StaticFlowApi;
/// use serde_json::json;
///
/// let api = StaticFlowApi::new()
///     .with("/process-groups/root", json!({"id": "pg-root"}))
///     .with_failure("/flow/status");
/// assert_eq!(api.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StaticFlowApi {
    documents: HashMap<String, Value>,
    failures: HashMap<String, String>,
    requests: AtomicUsize,
}

impl StaticFlowApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` at `path`.
    pub fn with(mut self, path: impl Into<String>, document: Value) -> Self {
        self.documents.insert(path.into(), document);
        self
    }

    /// Build from a captured JSON object mapping paths to documents.
    ///
    /// ```
    /// use flowscore::StaticFlowApi;
    /// use serde_json::json;
    ///
    /// let api = StaticFlowApi::from_value(json!({"/flow/status": {"connectionStatus": []}})).unwrap();
    /// assert_eq!(api.len(), 1);
    /// ```
    pub fn from_value(captured: Value) -> Result<Self, AdapterError> {
        let Value::Object(entries) = captured else {
            return Err(AdapterError::Parse(
                "captured responses must be a JSON object keyed by path".to_string(),
            ));
        };
        Ok(Self {
            documents: entries.into_iter().collect(),
            ..Self::default()
        })
    }

    /// Fail every fetch of `path`.
    pub fn with_failure(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.failures
            .insert(path.clone(), format!("injected failure for {}", path));
        self
    }

    /// Replace the document at `path` in place.
    pub fn insert(&mut self, path: impl Into<String>, document: Value) {
        self.documents.insert(path.into(), document);
    }

    /// Number of registered paths (documents plus failures).
    pub fn len(&self) -> usize {
        self.documents.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total fetches served so far, including failed ones.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FlowApi for StaticFlowApi {
    async fn fetch(&self, path: &str) -> Result<Value, AdapterError> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        if let Some(reason) = self.failures.get(path) {
            return Err(AdapterError::Http(reason.clone()));
        }

        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(path.to_string()))
    }

    fn description(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_serves_registered_documents() {
        let api = StaticFlowApi::new().with("/a", json!({"x": 1}));
        assert_eq!(api.fetch("/a").await.unwrap()["x"], 1);
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let api = StaticFlowApi::new();
        let err = api.fetch("/missing").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(p) if p == "/missing"));
    }

    #[tokio::test]
    async fn test_from_captured_responses() {
        let api = StaticFlowApi::from_value(json!({"/a": {"x": 2}, "/b": []})).unwrap();
        assert_eq!(api.len(), 2);
        assert_eq!(api.fetch("/a").await.unwrap()["x"], 2);

        assert!(matches!(StaticFlowApi::from_value(json!([1, 2])), Err(AdapterError::Parse(_))));
    }

    #[tokio::test]
    async fn test_failure_takes_precedence() {
        let api = StaticFlowApi::new()
            .with("/a", json!({}))
            .with_failure("/a");
        assert!(matches!(api.fetch("/a").await, Err(AdapterError::Http(_))));
        assert_eq!(api.request_count(), 1);
    }
}
