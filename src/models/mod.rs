pub mod connection;
pub mod report;
pub mod stats;

pub use connection::{ConnectionState, NetworkConnection};
pub use report::{ConnectionList, Header, Metrics, REPORT_VERSION, Report};
pub use stats::{InterfaceCounters, NetworkStats};
