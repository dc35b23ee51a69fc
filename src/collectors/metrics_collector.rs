//! One collection cycle, from kernel tables to an encoded report
//!
//! The collector keeps the only state that outlives a cycle: the previous
//! interface counters used for deltas, and the random generator used for
//! sampling, seeded once when the collector is created.

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::collectors::connections::{dedup_connections, filter_by_state, sample_connections};
use crate::collectors::net_dev::parse_net_dev;
use crate::collectors::net_proto::parse_connection_table;
use crate::collectors::source::read_source;
use crate::config::AgentConfig;
use crate::errors::ReportError;
use crate::models::{
    ConnectionList, ConnectionState, InterfaceCounters, NetworkConnection, NetworkStats, Report,
};
use crate::report::{EncodedReport, ReportFormat, TagLength};

#[derive(Debug)]
pub struct MetricsCollector {
    /// Counters read during the previous cycle, zero before the first one
    previous: InterfaceCounters,
    rng: StdRng,
    /// Counter for total collections performed
    collection_count: u64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Creates a collector whose sampler is seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a collector with a fixed sampling seed, for reproducible runs
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            previous: InterfaceCounters::default(),
            rng,
            collection_count: 0,
        }
    }

    pub fn previous_counters(&self) -> InterfaceCounters {
        self.previous
    }

    pub fn collection_count(&self) -> u64 {
        self.collection_count
    }

    /// Builds a report with the format and tag length from `config`
    pub fn build_report(
        &mut self,
        config: &AgentConfig,
        report_id: u64,
    ) -> Result<EncodedReport, ReportError> {
        self.build_report_with(config, report_id, config.tag_length, config.report_format)
    }

    /// Runs one cycle and encodes the result, bounded by `config.max_report_size`
    ///
    /// # Arguments
    ///
    /// * `config` - Source paths and the line, sample and size limits for this cycle
    /// * `report_id` - Identifier stamped into the report header
    /// * `tag_length` - Long or short field names
    /// * `format` - JSON or CBOR output
    ///
    /// # Returns
    ///
    /// * `Ok(EncodedReport)` with the encoded bytes and any sources cut short at the line limit
    /// * `Err(ReportError::CapacityExceeded)` if the encoded report is larger than `config.max_report_size`
    /// * `Err(ReportError)` for any other encoding failure
    ///
    /// Unavailable sources never fail the cycle, see [`MetricsCollector::collect`].
    pub fn build_report_with(
        &mut self,
        config: &AgentConfig,
        report_id: u64,
        tag_length: TagLength,
        format: ReportFormat,
    ) -> Result<EncodedReport, ReportError> {
        let report = self.collect(config, report_id);
        debug!("{}", report);

        match format.encode(&report, tag_length.dictionary(), config.max_report_size) {
            Ok(encoded) => {
                info!(
                    "Report #{} encoded as {} with {} tags ({} bytes)",
                    report_id,
                    format,
                    tag_length,
                    encoded.len()
                );
                Ok(encoded)
            }
            Err(e) => {
                error!("Failed to encode report #{}: {}", report_id, e);
                Err(e)
            }
        }
    }

    /// Runs one collection cycle and returns the report model
    ///
    /// Unreadable socket tables contribute empty lists. When the interface
    /// counters cannot be read the cycle reports a zero delta and the previous
    /// counters are kept as the baseline for the next cycle; otherwise they
    /// are replaced by this cycle's counters. Sources cut short at
    /// `config.max_source_lines` are listed in `Report::truncated_sources`.
    pub fn collect(&mut self, config: &AgentConfig, report_id: u64) -> Report {
        let started = Instant::now();
        self.collection_count += 1;
        debug!(
            "Starting metrics collection #{} for report #{}",
            self.collection_count, report_id
        );

        let sources = &config.sources;
        let mut truncated = Vec::new();

        let stats = match read_lines(&sources.net_dev, config.max_source_lines, &mut truncated) {
            Some(lines) => {
                let current = parse_net_dev(&lines);
                let stats = NetworkStats::new(current, self.previous);
                self.previous = current;
                stats
            }
            None => {
                warn!(
                    "Interface counters unavailable in collection #{}, keeping previous counters",
                    self.collection_count
                );
                NetworkStats::new(self.previous, self.previous)
            }
        };

        let tcp = read_connections(
            [Some(sources.tcp.as_path()), sources.tcp6.as_deref()],
            config.max_source_lines,
            &mut truncated,
        );
        let established = filter_by_state(&tcp, ConnectionState::Established);
        let listening = filter_by_state(&tcp, ConnectionState::Listen);
        let udp = read_connections(
            [Some(sources.udp.as_path()), sources.udp6.as_deref()],
            config.max_source_lines,
            &mut truncated,
        );

        let established = self.sample(established, config.sample_size);
        let listening = self.sample(listening, config.sample_size);
        let udp = self.sample(udp, config.sample_size);

        info!(
            "Collection #{} finished in {:?}: {} established, {} listening TCP, {} UDP",
            self.collection_count,
            started.elapsed(),
            established.total,
            listening.total,
            udp.total
        );

        let mut report = Report::new(report_id, stats, established, listening, udp);
        report.truncated_sources = truncated;
        report
    }

    fn sample(&mut self, connections: Vec<NetworkConnection>, sample_size: usize) -> ConnectionList {
        if connections.len() <= sample_size {
            return ConnectionList::complete(connections);
        }
        let total = connections.len();
        let sampled = sample_connections(&connections, sample_size, &mut self.rng);
        ConnectionList::new(sampled, total)
    }
}

/// Reads a source, returning `None` when it is unavailable
///
/// Truncated sources are still returned, and their path is pushed onto `truncated`.
fn read_lines(path: &Path, max_lines: usize, truncated: &mut Vec<PathBuf>) -> Option<Vec<String>> {
    match read_source(path, max_lines) {
        Ok(source) => {
            debug!("Number of lines in {}: {}", path.display(), source.len());
            if source.truncated {
                truncated.push(path.to_path_buf());
            }
            Some(source.lines)
        }
        Err(e) => {
            warn!("{}", e);
            None
        }
    }
}

/// Parses and merges every configured socket table, then deduplicates
fn read_connections<'a>(
    paths: impl IntoIterator<Item = Option<&'a Path>>,
    max_lines: usize,
    truncated: &mut Vec<PathBuf>,
) -> Vec<NetworkConnection> {
    let mut all = Vec::new();
    for path in paths.into_iter().flatten() {
        if let Some(lines) = read_lines(path, max_lines, truncated) {
            all.extend(parse_connection_table(&lines));
        }
    }
    dedup_connections(all)
}
