//! In-memory report model shared by the JSON and CBOR encoders

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::connection::NetworkConnection;
use super::stats::NetworkStats;

/// Version string stamped into every report header
pub const REPORT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Caller-supplied identifier, expected to increase from one report to the next
    pub report_id: u64,
    pub version: String,
}

impl Header {
    pub fn new(report_id: u64) -> Self {
        Self {
            report_id,
            version: REPORT_VERSION.to_string(),
        }
    }
}

/// A possibly sampled list together with the size of the list it was drawn from
///
/// `total` can exceed `items.len()` after sampling.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConnectionList {
    pub items: Vec<NetworkConnection>,
    pub total: usize,
}

impl ConnectionList {
    pub fn new(items: Vec<NetworkConnection>, total: usize) -> Self {
        Self { items, total }
    }

    /// A list that was not sampled, so `total == items.len()`
    pub fn complete(items: Vec<NetworkConnection>) -> Self {
        let total = items.len();
        Self { items, total }
    }

    pub fn is_sampled(&self) -> bool {
        self.total > self.items.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub established_connections: ConnectionList,
    pub listening_tcp_ports: ConnectionList,
    pub listening_udp_ports: ConnectionList,
    pub network_stats: NetworkStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub header: Header,
    pub metrics: Metrics,
    /// Sources that held more lines than the reader kept; their rows are incomplete
    #[serde(default)]
    pub truncated_sources: Vec<PathBuf>,
}

impl Report {
    /// Assembles a report from already deduplicated and sampled lists
    pub fn new(
        report_id: u64,
        network_stats: NetworkStats,
        established_connections: ConnectionList,
        listening_tcp_ports: ConnectionList,
        listening_udp_ports: ConnectionList,
    ) -> Self {
        Self {
            header: Header::new(report_id),
            metrics: Metrics {
                established_connections,
                listening_tcp_ports,
                listening_udp_ports,
                network_stats,
            },
            truncated_sources: Vec::new(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        !self.truncated_sources.is_empty()
    }
}

/// Compact human-readable view, meant for debug logging only
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        writeln!(
            f,
            "Report #{} (version {})",
            self.header.report_id, self.header.version
        )?;

        let tcp_ports: Vec<&str> = m
            .listening_tcp_ports
            .items
            .iter()
            .map(|c| c.local_port.as_str())
            .collect();
        writeln!(
            f,
            "  Listening TCP ports ({}): {}",
            m.listening_tcp_ports.total,
            tcp_ports.join(", ")
        )?;

        let udp_ports: Vec<&str> = m
            .listening_udp_ports
            .items
            .iter()
            .map(|c| c.local_port.as_str())
            .collect();
        writeln!(
            f,
            "  Listening UDP ports ({}): {}",
            m.listening_udp_ports.total,
            udp_ports.join(", ")
        )?;

        writeln!(
            f,
            "  Established TCP connections ({}):",
            m.established_connections.total
        )?;
        for conn in &m.established_connections.items {
            writeln!(
                f,
                "    {}:{} -> {}:{}",
                conn.local_address, conn.local_port, conn.remote_address, conn.remote_port
            )?;
        }

        for path in &self.truncated_sources {
            writeln!(f, "  Truncated source: {}", path.display())?;
        }

        let delta = m.network_stats.delta();
        writeln!(
            f,
            "  Bytes in/out: {}/{}",
            delta.bytes_in, delta.bytes_out
        )?;
        write!(
            f,
            "  Packets in/out: {}/{}",
            delta.packets_in, delta.packets_out
        )
    }
}
