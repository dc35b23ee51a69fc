//! Device telemetry agent core
//!
//! Reads interface counters and socket tables from `/proc/net`, turns them
//! into a [`models::Report`] and encodes it as JSON or CBOR with long or
//! short field names. Transport, scheduling and provisioning are left to the
//! embedding process; the `dda` binary is a minimal driver.

pub mod collectors;
pub mod config;
pub mod errors;
pub mod models;
pub mod report;

pub use collectors::MetricsCollector;
pub use config::{AgentConfig, JobOutcome, JobStatus};
pub use errors::{ConfigError, ReportError, SourceError};
pub use models::Report;
pub use report::{EncodedReport, ReportFormat, TagLength};
