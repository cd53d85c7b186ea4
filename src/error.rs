//! Error types for the refresh pipeline.
//!
//! Only conditions that abort a whole refresh cycle are errors. A failed
//! fetch for a nested group, an empty topology or a degenerate regression
//! are recovered where they happen and never surface here.

use thiserror::Error;

use crate::source::AdapterError;

/// Errors that abort a refresh cycle.
#[derive(Debug, Error)]
pub enum Error {
    /// The starting process group could not be fetched.
    #[error("Failed to fetch process group '{id}': {source}")]
    RootFetch {
        id: String,
        #[source]
        source: AdapterError,
    },

    /// The starting process group document carried no `id`.
    #[error("Process group '{0}' response has no id")]
    RootMissingId(String),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
