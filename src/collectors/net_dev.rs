//! Parser for the per-interface counter table in `/proc/net/dev`
//!
//! ```text
//! Inter-|   Receive                                                |  Transmit
//!  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
//!     lo: 1234567     1234    0    0    0     0          0         0  1234567     1234    0    0    0     0       0          0
//!   eth0: 9876543     5678    0    0    0     0          0         0  1234567      910    0    0    0     0       0          0
//! ```

use log::{debug, trace};

use crate::models::InterfaceCounters;

const HEADER_LINES: usize = 2;
const LOOPBACK: &str = "lo";

// Column offsets, counting the interface name as column 0
const BYTES_IN_COL: usize = 1;
const PACKETS_IN_COL: usize = 2;
const BYTES_OUT_COL: usize = 9;
const PACKETS_OUT_COL: usize = 10;

/// Sums byte and packet counters over every interface except loopback
///
/// The two header lines are dropped unconditionally. A counter that is
/// missing or not a number counts as zero instead of rejecting the row.
///
/// # Arguments
///
/// * `lines` - Lines of `/proc/net/dev`, including both header lines
///
/// # Returns
///
/// Saturating sums of received and transmitted bytes and packets. An empty
/// or header-only table yields all-zero counters.
pub fn parse_net_dev<S: AsRef<str>>(lines: &[S]) -> InterfaceCounters {
    let mut totals = InterfaceCounters::default();

    for line in lines.iter().skip(HEADER_LINES) {
        let columns = split_columns(line.as_ref());
        let Some(name) = columns.first() else {
            continue;
        };

        if *name == LOOPBACK {
            debug!("Skipping loopback interface");
            continue;
        }

        let column = |idx: usize| -> u64 {
            columns
                .get(idx)
                .and_then(|value| value.parse().ok())
                .unwrap_or(0)
        };

        let bytes_in = column(BYTES_IN_COL);
        let packets_in = column(PACKETS_IN_COL);
        let bytes_out = column(BYTES_OUT_COL);
        let packets_out = column(PACKETS_OUT_COL);

        totals.bytes_in = totals.bytes_in.saturating_add(bytes_in);
        totals.packets_in = totals.packets_in.saturating_add(packets_in);
        totals.bytes_out = totals.bytes_out.saturating_add(bytes_out);
        totals.packets_out = totals.packets_out.saturating_add(packets_out);

        trace!(
            "Interface {}: bytes_in={}, packets_in={}, bytes_out={}, packets_out={}",
            name, bytes_in, packets_in, bytes_out, packets_out
        );
    }

    debug!(
        "Aggregated interface counters: bytes_in={}, bytes_out={}, packets_in={}, packets_out={}",
        totals.bytes_in, totals.bytes_out, totals.packets_in, totals.packets_out
    );

    totals
}

/// Splits a row into the interface name followed by its counter columns
///
/// The name is cut at the first colon, since the kernel omits the space
/// after it once the receive byte counter gets wide enough.
fn split_columns(line: &str) -> Vec<&str> {
    let (name, counters) = match line.split_once(':') {
        Some((name, counters)) => (name.trim(), counters),
        None => ("", line),
    };

    let values = counters
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '.' | '-'))
        .filter(|token| !token.is_empty());

    if name.is_empty() {
        // No colon: the first token is the name
        values.collect()
    } else {
        std::iter::once(name).chain(values).collect()
    }
}
