//! Agent configuration
//!
//! Settings come from defaults, then an optional config file, then
//! `DDA_`-prefixed environment variables (`DDA_REPORT_FORMAT=cbor`,
//! `DDA_SOURCES__TCP=/tmp/tcp`). The reporting interval can later be replaced
//! by a remote job document through [`AgentConfig::apply_remote_configuration`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::errors::ConfigError;
use crate::report::{MAX_REPORT_SIZE, ReportFormat, TagLength};

pub const DEFAULT_REPORT_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_MAX_SOURCE_LINES: usize = 500;
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Locations of the kernel tables read each cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    pub net_dev: PathBuf,
    pub tcp: PathBuf,
    pub udp: PathBuf,
    pub tcp6: Option<PathBuf>,
    pub udp6: Option<PathBuf>,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            net_dev: PathBuf::from("/proc/net/dev"),
            tcp: PathBuf::from("/proc/net/tcp"),
            udp: PathBuf::from("/proc/net/udp"),
            tcp6: None,
            udp6: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub report_format: ReportFormat,
    pub tag_length: TagLength,
    pub report_interval_secs: u64,
    pub sources: SourcePaths,
    /// Lines kept per source, further lines are dropped and flagged
    pub max_source_lines: usize,
    /// Entries kept per reported list
    pub sample_size: usize,
    pub max_report_size: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            report_format: ReportFormat::default(),
            tag_length: TagLength::default(),
            report_interval_secs: DEFAULT_REPORT_INTERVAL_SECS,
            sources: SourcePaths::default(),
            max_source_lines: DEFAULT_MAX_SOURCE_LINES,
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_report_size: MAX_REPORT_SIZE,
        }
    }
}

impl AgentConfig {
    /// Loads defaults, the optional file at `path`, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("DDA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AgentConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval(0));
        }
        Ok(())
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    /// Applies a remote job document carrying a new reporting interval
    ///
    /// Expected shape:
    /// `{"execution":{"jobId":"...","jobDocument":{"agent_parameters":{"report_interval_seconds":N}}}}`
    ///
    /// Documents that name a job but cannot be applied produce a failed
    /// outcome and leave the interval untouched. Only documents that are not
    /// JSON or carry no `execution` element are errors.
    pub fn apply_remote_configuration(&mut self, document: &str) -> Result<JobOutcome, ConfigError> {
        let payload: Value = serde_json::from_str(document)
            .map_err(|e| ConfigError::InvalidJobDocument(e.to_string()))?;

        let execution = payload
            .get("execution")
            .filter(|v| v.is_object())
            .ok_or_else(|| ConfigError::InvalidJobDocument("missing execution element".to_string()))?;

        let Some(job_id) = execution.get("jobId").and_then(Value::as_str) else {
            return Ok(JobOutcome::failed(None, "Unable to find job document"));
        };
        let job_id = Some(job_id.to_string());

        let Some(parameters) = execution
            .get("jobDocument")
            .filter(|v| v.is_object())
            .and_then(|doc| doc.get("agent_parameters"))
            .filter(|v| v.is_object())
        else {
            return Ok(JobOutcome::failed(
                job_id,
                "Unable to process job document, could not find agent_parameters element",
            ));
        };

        let Some(interval) = parameters
            .get("report_interval_seconds")
            .and_then(Value::as_i64)
        else {
            return Ok(JobOutcome::failed(
                job_id,
                "report_interval_seconds must be an integer",
            ));
        };

        if interval <= 0 {
            warn!("Rejecting non-positive reporting interval {} from job", interval);
            return Ok(JobOutcome::failed(
                job_id,
                "report_interval_seconds must be positive",
            ));
        }

        info!(
            "Reporting interval changed from {}s to {}s by remote job",
            self.report_interval_secs, interval
        );
        self.report_interval_secs = interval as u64;
        Ok(JobOutcome {
            job_id,
            status: JobStatus::Succeeded,
            status_details: json!({ "result": "success" }),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Succeeded,
    Failed,
}

/// Result of applying a job document, to be reported back to the job service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub job_id: Option<String>,
    pub status: JobStatus,
    pub status_details: Value,
}

impl JobOutcome {
    fn failed(job_id: Option<String>, detail: &str) -> Self {
        warn!("Job {:?} failed: {}", job_id, detail);
        Self {
            job_id,
            status: JobStatus::Failed,
            status_details: json!({ "failureDetail": detail }),
        }
    }
}
