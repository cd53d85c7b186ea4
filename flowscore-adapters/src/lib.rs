//! # flowscore-adapters
//!
//! Transports for reading flow topology documents from a data-flow
//! orchestration engine's REST API.
//!
//! Adapters return loosely typed [`serde_json::Value`] documents; field
//! extraction and defaulting live in the `flowscore` crate so that a missing
//! field is never a transport error.
//!
//! ## Supported Systems
//!
//! - **NiFi** (`nifi` feature) - `GET` against the `nifi-api` REST root with an
//!   optional pre-issued bearer token
//!
//! ## Quick Start (NiFi)
//!
//! ```rust,no_run
//! use flowscore_adapters::nifi::NifiAdapter;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = NifiAdapter::builder()
//!         .endpoint("https://nifi.local:8443/nifi-api")
//!         .bearer_token("eyJhbGciOi...")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     let root = adapter.get_json("/process-groups/root").await?;
//!     println!("root group id: {}", root["id"]);
//!     Ok(())
//! }
//! ```

pub mod error;

#[cfg(feature = "nifi")]
pub mod nifi;

pub use error::AdapterError;
