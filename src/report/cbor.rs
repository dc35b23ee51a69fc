//! CBOR rendering of a [`Report`]
//!
//! Containers whose entry count is known up front (the root map, the header
//! map, each listening-ports map and its ports array) use definite-length
//! headers. The metrics map, the per-port and per-connection maps, the
//! network stats map and the connections array are written as
//! indefinite-length containers closed with a break.
//!
//! Unlike the JSON encoder, zero counters are left out of `network_stats`,
//! and the whole block is left out when every counter is zero.

use ciborium_ll::{Encoder, Header};
use log::debug;

use super::tags::{FieldTag, TagDictionary};
use crate::errors::ReportError;
use crate::models::{ConnectionList, InterfaceCounters, NetworkConnection, Report};

type CborEncoder<'a> = Encoder<&'a mut Vec<u8>>;

/// Encodes `report` as CBOR, failing if it would exceed `capacity` bytes
///
/// # Arguments
///
/// * `report` - Report to encode
/// * `tags` - Field-name dictionary, long or short
/// * `capacity` - Largest acceptable output in bytes
///
/// # Returns
///
/// * `Ok(Vec<u8>)` holding one complete CBOR data item
/// * `Err(ReportError::CapacityExceeded)` if the encoding is larger than `capacity`
/// * `Err(ReportError::Encode)` if the encoder fails to write
pub fn encode_cbor(
    report: &Report,
    tags: &dyn TagDictionary,
    capacity: usize,
) -> Result<Vec<u8>, ReportError> {
    let mut buffer = Vec::new();
    {
        let mut enc: CborEncoder = Encoder::from(&mut buffer);
        write_report(&mut enc, report, tags)?;
    }

    if buffer.len() > capacity {
        return Err(ReportError::CapacityExceeded {
            size: buffer.len(),
            limit: capacity,
        });
    }
    debug!("CBOR report length: {} bytes", buffer.len());
    Ok(buffer)
}

fn write_report(
    enc: &mut CborEncoder,
    report: &Report,
    tags: &dyn TagDictionary,
) -> Result<(), ReportError> {
    enc.push(Header::Map(Some(2)))?;

    text(enc, tags.resolve(FieldTag::Header))?;
    enc.push(Header::Map(Some(2)))?;
    text(enc, tags.resolve(FieldTag::ReportId))?;
    enc.push(Header::Positive(report.header.report_id))?;
    text(enc, tags.resolve(FieldTag::Version))?;
    text(enc, &report.header.version)?;

    let m = &report.metrics;
    text(enc, tags.resolve(FieldTag::Metrics))?;
    enc.push(Header::Map(None))?;

    write_ports(enc, FieldTag::ListeningTcpPorts, &m.listening_tcp_ports, tags)?;
    write_ports(enc, FieldTag::ListeningUdpPorts, &m.listening_udp_ports, tags)?;
    write_network_stats(enc, &m.network_stats.delta(), tags)?;
    write_connections(enc, &m.established_connections, tags)?;

    enc.push(Header::Break)?;
    Ok(())
}

fn write_ports(
    enc: &mut CborEncoder,
    field: FieldTag,
    list: &ConnectionList,
    tags: &dyn TagDictionary,
) -> Result<(), ReportError> {
    text(enc, tags.resolve(field))?;
    enc.push(Header::Map(Some(2)))?;

    text(enc, tags.resolve(FieldTag::Ports))?;
    enc.push(Header::Array(Some(list.items.len())))?;
    for conn in &list.items {
        enc.push(Header::Map(None))?;
        if let Some(interface) = conn.interface() {
            text(enc, tags.resolve(FieldTag::Interface))?;
            text(enc, interface)?;
        }
        text(enc, tags.resolve(FieldTag::Port))?;
        enc.push(Header::Positive(u64::from(conn.local_port_number().unwrap_or(0))))?;
        enc.push(Header::Break)?;
    }

    text(enc, tags.resolve(FieldTag::Total))?;
    enc.push(Header::Positive(list.total as u64))?;
    Ok(())
}

fn write_network_stats(
    enc: &mut CborEncoder,
    delta: &InterfaceCounters,
    tags: &dyn TagDictionary,
) -> Result<(), ReportError> {
    if delta.is_zero() {
        return Ok(());
    }

    text(enc, tags.resolve(FieldTag::NetworkStats))?;
    enc.push(Header::Map(None))?;
    for (field, value) in [
        (FieldTag::BytesIn, delta.bytes_in),
        (FieldTag::BytesOut, delta.bytes_out),
        (FieldTag::PacketsIn, delta.packets_in),
        (FieldTag::PacketsOut, delta.packets_out),
    ] {
        if value > 0 {
            text(enc, tags.resolve(field))?;
            enc.push(Header::Positive(value))?;
        }
    }
    enc.push(Header::Break)?;
    Ok(())
}

fn write_connections(
    enc: &mut CborEncoder,
    list: &ConnectionList,
    tags: &dyn TagDictionary,
) -> Result<(), ReportError> {
    text(enc, tags.resolve(FieldTag::TcpConnections))?;
    enc.push(Header::Map(None))?;
    text(enc, tags.resolve(FieldTag::EstablishedConnections))?;
    enc.push(Header::Map(None))?;

    text(enc, tags.resolve(FieldTag::Connections))?;
    enc.push(Header::Array(None))?;
    for conn in &list.items {
        write_connection(enc, conn, tags)?;
    }
    enc.push(Header::Break)?;

    text(enc, tags.resolve(FieldTag::Total))?;
    enc.push(Header::Positive(list.total as u64))?;

    enc.push(Header::Break)?;
    enc.push(Header::Break)?;
    Ok(())
}

fn write_connection(
    enc: &mut CborEncoder,
    conn: &NetworkConnection,
    tags: &dyn TagDictionary,
) -> Result<(), ReportError> {
    enc.push(Header::Map(None))?;
    if let Some(interface) = conn.interface() {
        text(enc, tags.resolve(FieldTag::LocalInterface))?;
        text(enc, interface)?;
    }
    if let Some(port) = conn.local_port_number() {
        text(enc, tags.resolve(FieldTag::LocalPort))?;
        enc.push(Header::Positive(u64::from(port)))?;
    }
    if let Some(remote) = conn.remote_endpoint() {
        text(enc, tags.resolve(FieldTag::RemoteAddr))?;
        text(enc, &remote)?;
    }
    enc.push(Header::Break)?;
    Ok(())
}

fn text(enc: &mut CborEncoder, value: &str) -> Result<(), ReportError> {
    enc.text(value, None::<usize>)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectionState, NetworkStats};
    use crate::report::tags::{LongTags, ShortTags};
    use ciborium::value::Value;

    fn report_with_stats(stats: NetworkStats) -> Report {
        let listener = NetworkConnection {
            local_address: "0.0.0.0".to_string(),
            local_port: "80".to_string(),
            remote_address: "0.0.0.0".to_string(),
            remote_port: "0".to_string(),
            state: ConnectionState::Listen,
            ..Default::default()
        };
        let established = NetworkConnection {
            local_address: "10.0.2.15".to_string(),
            local_port: "22".to_string(),
            remote_address: "10.0.2.2".to_string(),
            remote_port: "59432".to_string(),
            state: ConnectionState::Established,
            ..Default::default()
        };
        Report::new(
            5,
            stats,
            ConnectionList::complete(vec![established]),
            ConnectionList::complete(vec![listener]),
            ConnectionList::default(),
        )
    }

    fn decode(bytes: &[u8]) -> Value {
        ciborium::from_reader(bytes).unwrap()
    }

    fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
        value.as_map()?.iter().find_map(|(k, v)| match k {
            Value::Text(text) if text == key => Some(v),
            _ => None,
        })
    }

    fn uint(value: &Value) -> u64 {
        let int = value.as_integer().unwrap();
        u64::try_from(int).unwrap()
    }

    fn text_header(key: &str) -> Vec<u8> {
        let mut bytes = vec![0x60 | key.len() as u8];
        bytes.extend_from_slice(key.as_bytes());
        bytes
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_structure_with_long_tags() {
        let stats = NetworkStats::new(
            InterfaceCounters {
                bytes_in: 300,
                bytes_out: 0,
                packets_in: 3,
                packets_out: 0,
            },
            InterfaceCounters::default(),
        );
        let bytes = encode_cbor(&report_with_stats(stats), &LongTags, 128_000).unwrap();
        let root = decode(&bytes);

        let header = get(&root, "header").unwrap();
        assert_eq!(uint(get(header, "report_id").unwrap()), 5);
        assert_eq!(get(header, "version").and_then(Value::as_text), Some("1.0"));

        let metrics = get(&root, "metrics").unwrap();
        let tcp = get(metrics, "listening_tcp_ports").unwrap();
        let ports = get(tcp, "ports").and_then(Value::as_array).unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(uint(get(&ports[0], "port").unwrap()), 80);
        assert_eq!(uint(get(tcp, "total").unwrap()), 1);

        let udp = get(metrics, "listening_udp_ports").unwrap();
        assert_eq!(get(udp, "ports").and_then(Value::as_array).map(Vec::len), Some(0));

        let net = get(metrics, "network_stats").unwrap();
        assert_eq!(uint(get(net, "bytes_in").unwrap()), 300);
        assert_eq!(uint(get(net, "packets_in").unwrap()), 3);
        assert!(get(net, "bytes_out").is_none());
        assert!(get(net, "packets_out").is_none());

        let established = get(get(metrics, "tcp_connections").unwrap(), "established_connections").unwrap();
        let conns = get(established, "connections").and_then(Value::as_array).unwrap();
        assert_eq!(conns.len(), 1);
        assert_eq!(
            get(&conns[0], "remote_addr").and_then(Value::as_text),
            Some("10.0.2.2:59432")
        );
        assert_eq!(uint(get(&conns[0], "local_port").unwrap()), 22);
        assert!(get(&conns[0], "local_interface").is_none());
        assert_eq!(uint(get(established, "total").unwrap()), 1);
    }

    #[test]
    fn test_zero_stats_block_is_omitted() {
        let bytes = encode_cbor(&report_with_stats(NetworkStats::default()), &LongTags, 128_000).unwrap();
        let metrics = get(&decode(&bytes), "metrics").cloned().unwrap();
        assert!(get(&metrics, "network_stats").is_none());
        assert!(get(&metrics, "listening_tcp_ports").is_some());
    }

    #[test]
    fn test_container_length_encoding() {
        let bytes = encode_cbor(&report_with_stats(NetworkStats::default()), &LongTags, 128_000).unwrap();

        // Definite two-entry root map
        assert_eq!(bytes[0], 0xA2);
        // Definite two-entry header map
        let mut header = text_header("header");
        header.push(0xA2);
        assert!(contains(&bytes, &header));
        // Indefinite metrics map
        let mut metrics = text_header("metrics");
        metrics.push(0xBF);
        assert!(contains(&bytes, &metrics));
        // Definite one-element ports array holding an indefinite map
        let mut ports = text_header("ports");
        ports.extend_from_slice(&[0x81, 0xBF]);
        assert!(contains(&bytes, &ports));
        // Indefinite connections array
        let mut connections = text_header("connections");
        connections.push(0x9F);
        assert!(contains(&bytes, &connections));
        // Root map is not closed with a break, metrics map is
        assert_eq!(bytes[bytes.len() - 1], 0xFF);
    }

    #[test]
    fn test_short_tags() {
        let bytes = encode_cbor(&report_with_stats(NetworkStats::default()), &ShortTags, 128_000).unwrap();
        let root = decode(&bytes);
        let header = get(&root, "hed").unwrap();
        assert_eq!(uint(get(header, "rid").unwrap()), 5);
        let metrics = get(&root, "met").unwrap();
        assert!(get(metrics, "tp").is_some());
        assert!(get(metrics, "up").is_some());
        assert!(get(metrics, "ns").is_none());
        assert!(get(get(metrics, "tc").unwrap(), "ec").is_some());
    }

    #[test]
    fn test_capacity_exceeded() {
        let report = report_with_stats(NetworkStats::default());
        let full = encode_cbor(&report, &LongTags, usize::MAX).unwrap();
        assert!(matches!(
            encode_cbor(&report, &LongTags, full.len() - 1),
            Err(ReportError::CapacityExceeded { .. })
        ));
        assert_eq!(encode_cbor(&report, &LongTags, full.len()).unwrap(), full);
    }
}
