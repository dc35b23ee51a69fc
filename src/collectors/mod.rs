//! Kernel table readers and the per-cycle collection pipeline
//!
//! - `source`: bounded line reader for `/proc` style files
//! - `net_dev`: interface counter totals from `/proc/net/dev`
//! - `net_proto`: socket rows from `/proc/net/{tcp,udp}` and their IPv6 twins
//! - `connections`: deduplication, state filtering and sampling
//! - `metrics_collector`: ties the above into one report per cycle

pub mod connections;
pub mod metrics_collector;
pub mod net_dev;
pub mod net_proto;
pub mod source;

pub use connections::{dedup_connections, filter_by_state, sample_connections};
pub use metrics_collector::MetricsCollector;
pub use net_dev::parse_net_dev;
pub use net_proto::{hex_to_ip, hex_to_port, parse_connection_table};
pub use source::{SourceLines, read_source};
