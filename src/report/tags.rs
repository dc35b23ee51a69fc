//! Field names used by the report encoders
//!
//! Every report field is addressed by a [`FieldTag`]. Encoders resolve tags
//! through a [`TagDictionary`], so long (`established_connections`) and short
//! (`ec`) naming is chosen independently of the output format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    ReportId,
    Version,
    Header,
    Metrics,
    Port,
    Ports,
    Interface,
    Total,
    ListeningTcpPorts,
    ListeningUdpPorts,
    BytesIn,
    BytesOut,
    PacketsIn,
    PacketsOut,
    NetworkStats,
    RemoteAddr,
    LocalPort,
    LocalInterface,
    Connections,
    EstablishedConnections,
    TcpConnections,
}

impl FieldTag {
    pub const ALL: [FieldTag; 21] = [
        FieldTag::ReportId,
        FieldTag::Version,
        FieldTag::Header,
        FieldTag::Metrics,
        FieldTag::Port,
        FieldTag::Ports,
        FieldTag::Interface,
        FieldTag::Total,
        FieldTag::ListeningTcpPorts,
        FieldTag::ListeningUdpPorts,
        FieldTag::BytesIn,
        FieldTag::BytesOut,
        FieldTag::PacketsIn,
        FieldTag::PacketsOut,
        FieldTag::NetworkStats,
        FieldTag::RemoteAddr,
        FieldTag::LocalPort,
        FieldTag::LocalInterface,
        FieldTag::Connections,
        FieldTag::EstablishedConnections,
        FieldTag::TcpConnections,
    ];
}

/// Resolves a field tag to the name written into a report
pub trait TagDictionary {
    fn resolve(&self, tag: FieldTag) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LongTags;

#[derive(Debug, Clone, Copy, Default)]
pub struct ShortTags;

impl TagDictionary for LongTags {
    fn resolve(&self, tag: FieldTag) -> &'static str {
        match tag {
            FieldTag::ReportId => "report_id",
            FieldTag::Version => "version",
            FieldTag::Header => "header",
            FieldTag::Metrics => "metrics",
            FieldTag::Port => "port",
            FieldTag::Ports => "ports",
            FieldTag::Interface => "interface",
            FieldTag::Total => "total",
            FieldTag::ListeningTcpPorts => "listening_tcp_ports",
            FieldTag::ListeningUdpPorts => "listening_udp_ports",
            FieldTag::BytesIn => "bytes_in",
            FieldTag::BytesOut => "bytes_out",
            FieldTag::PacketsIn => "packets_in",
            FieldTag::PacketsOut => "packets_out",
            FieldTag::NetworkStats => "network_stats",
            FieldTag::RemoteAddr => "remote_addr",
            FieldTag::LocalPort => "local_port",
            FieldTag::LocalInterface => "local_interface",
            FieldTag::Connections => "connections",
            FieldTag::EstablishedConnections => "established_connections",
            FieldTag::TcpConnections => "tcp_connections",
        }
    }
}

impl TagDictionary for ShortTags {
    fn resolve(&self, tag: FieldTag) -> &'static str {
        match tag {
            FieldTag::ReportId => "rid",
            FieldTag::Version => "v",
            FieldTag::Header => "hed",
            FieldTag::Metrics => "met",
            FieldTag::Port => "pt",
            FieldTag::Ports => "pts",
            FieldTag::Interface => "if",
            FieldTag::Total => "t",
            FieldTag::ListeningTcpPorts => "tp",
            FieldTag::ListeningUdpPorts => "up",
            FieldTag::BytesIn => "bi",
            FieldTag::BytesOut => "bo",
            FieldTag::PacketsIn => "pi",
            FieldTag::PacketsOut => "po",
            FieldTag::NetworkStats => "ns",
            FieldTag::RemoteAddr => "rad",
            FieldTag::LocalPort => "lp",
            FieldTag::LocalInterface => "li",
            FieldTag::Connections => "cs",
            FieldTag::EstablishedConnections => "ec",
            FieldTag::TcpConnections => "tc",
        }
    }
}

/// Which dictionary a report is encoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagLength {
    #[default]
    Long,
    Short,
}

impl TagLength {
    pub fn dictionary(self) -> &'static dyn TagDictionary {
        match self {
            TagLength::Long => &LongTags,
            TagLength::Short => &ShortTags,
        }
    }
}

impl FromStr for TagLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" => Ok(TagLength::Long),
            "short" => Ok(TagLength::Short),
            other => Err(format!("unknown tag length '{}', expected long or short", other)),
        }
    }
}

impl fmt::Display for TagLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagLength::Long => write!(f, "long"),
            TagLength::Short => write!(f, "short"),
        }
    }
}
