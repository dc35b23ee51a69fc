//! Parser for the socket tables in `/proc/net/{tcp,udp,tcp6,udp6}`
//!
//! ```text
//!   sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
//!    0: 00000000:170C 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 46115 1 ...
//! ```
//!
//! Rows are tokenized on spaces and colons, which puts the fields this
//! collector needs at fixed token offsets.

use std::net::{Ipv4Addr, Ipv6Addr};

use log::{debug, trace};

use crate::models::{ConnectionState, NetworkConnection};

const HEADER_LINES: usize = 1;

const LOCAL_ADDR_TOK: usize = 1;
const LOCAL_PORT_TOK: usize = 2;
const REMOTE_ADDR_TOK: usize = 3;
const REMOTE_PORT_TOK: usize = 4;
const STATUS_TOK: usize = 5;

const UNPARSABLE_ADDR: &str = "0.0.0.0";
const UNPARSABLE_PORT: &str = "0";

/// Parses a TCP or UDP socket table into one connection per data row
///
/// Rows are returned in file order. A row with too few tokens keeps empty
/// strings and `ConnectionState::Other` for the fields it lacks.
///
/// # Arguments
///
/// * `lines` - Lines of a `/proc/net/{tcp,udp,tcp6,udp6}` table, header line included
///
/// # Returns
///
/// One `NetworkConnection` per non-blank data row, not yet deduplicated.
/// Interfaces are never known from these tables, so `local_interface` is `None`.
pub fn parse_connection_table<S: AsRef<str>>(lines: &[S]) -> Vec<NetworkConnection> {
    let mut connections = Vec::with_capacity(lines.len().saturating_sub(HEADER_LINES));

    for line in lines.iter().skip(HEADER_LINES) {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ':')
            .filter(|token| !token.is_empty())
            .collect();

        let mut connection = NetworkConnection::default();
        if let Some(tok) = tokens.get(LOCAL_ADDR_TOK) {
            connection.local_address = hex_to_ip(tok);
        }
        if let Some(tok) = tokens.get(LOCAL_PORT_TOK) {
            connection.local_port = hex_to_port(tok);
        }
        if let Some(tok) = tokens.get(REMOTE_ADDR_TOK) {
            connection.remote_address = hex_to_ip(tok);
        }
        if let Some(tok) = tokens.get(REMOTE_PORT_TOK) {
            connection.remote_port = hex_to_port(tok);
        }
        if let Some(tok) = tokens.get(STATUS_TOK) {
            connection.state = ConnectionState::from_hex(tok);
        }

        trace!(
            "Parsed socket {}:{} -> {}:{} ({:?})",
            connection.local_address,
            connection.local_port,
            connection.remote_address,
            connection.remote_port,
            connection.state
        );
        connections.push(connection);
    }

    debug!("Parsed {} sockets from connection table", connections.len());
    connections
}

/// Renders a kernel hex address as text
///
/// Eight hex digits hold an IPv4 address in network byte order as printed on
/// a little-endian host, so `6BA44E0A` is `10.78.164.107`. Thirty-two hex
/// digits hold an IPv6 address as four such words. Anything else renders as
/// `0.0.0.0`.
pub fn hex_to_ip(hex: &str) -> String {
    match hex.len() {
        8 => match u32::from_str_radix(hex, 16) {
            Ok(word) => Ipv4Addr::from(word.to_le_bytes()).to_string(),
            Err(_) => unparsable_addr(hex),
        },
        32 => {
            let mut octets = [0u8; 16];
            for (chunk, out) in hex.as_bytes().chunks(8).zip(octets.chunks_mut(4)) {
                let word = std::str::from_utf8(chunk)
                    .ok()
                    .and_then(|s| u32::from_str_radix(s, 16).ok());
                match word {
                    Some(word) => out.copy_from_slice(&word.to_le_bytes()),
                    None => return unparsable_addr(hex),
                }
            }
            Ipv6Addr::from(octets).to_string()
        }
        _ => unparsable_addr(hex),
    }
}

fn unparsable_addr(hex: &str) -> String {
    trace!("Unparsable hex address '{}'", hex);
    UNPARSABLE_ADDR.to_string()
}

/// Renders a big-endian hex port as a decimal string, `"0"` when unparsable
pub fn hex_to_port(hex: &str) -> String {
    match u16::from_str_radix(hex, 16) {
        Ok(port) => port.to_string(),
        Err(_) => {
            trace!("Unparsable hex port '{}'", hex);
            UNPARSABLE_PORT.to_string()
        }
    }
}
