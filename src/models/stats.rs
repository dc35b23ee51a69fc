//! Aggregate interface counters and cycle-over-cycle deltas

use log::debug;
use serde::{Deserialize, Serialize};

/// Raw byte and packet counters summed over all non-loopback interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceCounters {
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub packets_in: u64,
    pub packets_out: u64,
}

impl InterfaceCounters {
    pub fn is_zero(&self) -> bool {
        self.bytes_in == 0 && self.bytes_out == 0 && self.packets_in == 0 && self.packets_out == 0
    }
}

/// Counters for the current cycle alongside the previous cycle's values
///
/// Reports carry deltas, never the raw kernel counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkStats {
    pub current: InterfaceCounters,
    pub previous: InterfaceCounters,
}

impl NetworkStats {
    pub fn new(current: InterfaceCounters, previous: InterfaceCounters) -> Self {
        Self { current, previous }
    }

    /// Per-field `current - previous`, clamped to zero when a counter went backwards
    pub fn delta(&self) -> InterfaceCounters {
        InterfaceCounters {
            bytes_in: clamped_delta("bytes_in", self.current.bytes_in, self.previous.bytes_in),
            bytes_out: clamped_delta("bytes_out", self.current.bytes_out, self.previous.bytes_out),
            packets_in: clamped_delta(
                "packets_in",
                self.current.packets_in,
                self.previous.packets_in,
            ),
            packets_out: clamped_delta(
                "packets_out",
                self.current.packets_out,
                self.previous.packets_out,
            ),
        }
    }
}

fn clamped_delta(field: &str, current: u64, previous: u64) -> u64 {
    match current.checked_sub(previous) {
        Some(delta) => delta,
        None => {
            debug!(
                "Counter reset detected for {} ({} -> {}), reporting zero delta",
                field, previous, current
            );
            0
        }
    }
}
