//! Error types for collection, encoding and configuration
//!
//! Only encoding and configuration failures ever leave a collection cycle.
//! Source failures are absorbed by the collector, which logs them and carries
//! on with zeroed counters and empty lists.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to load a line-oriented kernel source such as `/proc/net/dev`
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source {path} is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to turn a report into bytes for the transport
#[derive(Debug, Error)]
pub enum ReportError {
    /// The encoded report is larger than the transport buffer allows
    #[error("encoded report is {size} bytes, exceeding the {limit} byte limit")]
    CapacityExceeded { size: usize, limit: usize },

    /// The binary encoder rejected the report
    #[error("failed to encode report: {0}")]
    Encode(String),

    #[error("failed to serialize JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<io::Error> for ReportError {
    fn from(err: io::Error) -> Self {
        ReportError::Encode(err.to_string())
    }
}

/// Failure to load or update the agent configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid job document: {0}")]
    InvalidJobDocument(String),

    #[error("reporting interval must be a positive number of seconds, got {0}")]
    InvalidInterval(i64),
}
