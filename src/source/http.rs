//! HTTP-backed flow API.

use async_trait::async_trait;
use flowscore_adapters::nifi::NifiAdapter;
use serde_json::Value;

use super::{AdapterError, FlowApi};

#[async_trait]
impl FlowApi for NifiAdapter {
    async fn fetch(&self, path: &str) -> Result<Value, AdapterError> {
        self.get_json(path).await
    }

    fn description(&self) -> &str {
        self.endpoint()
    }
}
