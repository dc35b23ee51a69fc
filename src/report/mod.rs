//! Report encoding
//!
//! - `tags`: long and short field-name dictionaries
//! - `json`: compact JSON encoder
//! - `cbor`: CBOR encoder with definite and indefinite containers
//!
//! Both encoders take the dictionary as a `&dyn TagDictionary`, so the
//! naming choice never leaks into format-specific code.

pub mod cbor;
pub mod json;
pub mod tags;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ReportError;
use crate::models::Report;

pub use cbor::encode_cbor;
pub use json::{encode_json, report_to_json};
pub use tags::{FieldTag, LongTags, ShortTags, TagDictionary, TagLength};

/// Largest report the transport will accept, in bytes
pub const MAX_REPORT_SIZE: usize = 128_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Cbor,
}

impl ReportFormat {
    /// Encodes `report` in this format, bounded by `capacity` bytes
    pub fn encode(
        self,
        report: &Report,
        tags: &dyn TagDictionary,
        capacity: usize,
    ) -> Result<EncodedReport, ReportError> {
        let bytes = match self {
            ReportFormat::Json => encode_json(report, tags, capacity)?,
            ReportFormat::Cbor => encode_cbor(report, tags, capacity)?,
        };
        Ok(EncodedReport {
            bytes,
            format: self,
            truncated_sources: report.truncated_sources.clone(),
        })
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Cbor => "cbor",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "cbor" => Ok(ReportFormat::Cbor),
            other => Err(format!("unknown report format '{}', expected json or cbor", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A report ready to hand to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedReport {
    pub bytes: Vec<u8>,
    pub format: ReportFormat,
    /// Sources cut short at the line limit while collecting this report
    pub truncated_sources: Vec<PathBuf>,
}

impl EncodedReport {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when some rows were dropped because a source exceeded the line limit
    pub fn is_truncated(&self) -> bool {
        !self.truncated_sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectionList, NetworkStats};

    fn empty_report() -> Report {
        Report::new(
            1,
            NetworkStats::default(),
            ConnectionList::default(),
            ConnectionList::default(),
            ConnectionList::default(),
        )
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("CBOR".parse::<ReportFormat>(), Ok(ReportFormat::Cbor));
        assert!("xml".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Cbor.to_string(), "cbor");
    }

    #[test]
    fn test_encode_dispatches_by_format() {
        let report = empty_report();
        let json = ReportFormat::Json
            .encode(&report, &LongTags, MAX_REPORT_SIZE)
            .unwrap();
        assert_eq!(json.format, ReportFormat::Json);
        assert_eq!(json.bytes.first(), Some(&b'{'));

        let cbor = ReportFormat::Cbor
            .encode(&report, &LongTags, MAX_REPORT_SIZE)
            .unwrap();
        assert_eq!(cbor.format, ReportFormat::Cbor);
        assert_eq!(cbor.bytes.first(), Some(&0xA2));
        assert_eq!(cbor.len(), cbor.bytes.len());
        assert!(!cbor.is_truncated());
    }

    #[test]
    fn test_encode_carries_truncated_sources() {
        let mut report = empty_report();
        report.truncated_sources.push(PathBuf::from("/proc/net/udp"));
        let encoded = ReportFormat::Json
            .encode(&report, &LongTags, MAX_REPORT_SIZE)
            .unwrap();
        assert!(encoded.is_truncated());
        assert_eq!(encoded.truncated_sources, vec![PathBuf::from("/proc/net/udp")]);
    }
}
