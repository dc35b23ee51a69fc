//! JSON rendering of a [`Report`]

use log::debug;
use serde_json::{Map, Value};

use super::tags::{FieldTag, TagDictionary};
use crate::errors::ReportError;
use crate::models::{ConnectionList, NetworkConnection, Report};

/// Encodes `report` as compact JSON, failing if it would exceed `capacity` bytes
///
/// # Arguments
///
/// * `report` - Report to encode
/// * `tags` - Field-name dictionary, long or short
/// * `capacity` - Largest acceptable output in bytes
///
/// # Returns
///
/// * `Ok(Vec<u8>)` holding the UTF-8 JSON document
/// * `Err(ReportError::CapacityExceeded)` if the document is larger than `capacity`
/// * `Err(ReportError::Json)` if serialization fails
pub fn encode_json(
    report: &Report,
    tags: &dyn TagDictionary,
    capacity: usize,
) -> Result<Vec<u8>, ReportError> {
    let value = report_to_json(report, tags);
    let bytes = serde_json::to_vec(&value)?;
    if bytes.len() > capacity {
        return Err(ReportError::CapacityExceeded {
            size: bytes.len(),
            limit: capacity,
        });
    }
    debug!("JSON report length: {} bytes", bytes.len());
    Ok(bytes)
}

/// Builds the JSON document tree for a report
///
/// All four network counters are always present, even when zero.
pub fn report_to_json(report: &Report, tags: &dyn TagDictionary) -> Value {
    let key = |tag: FieldTag| tags.resolve(tag).to_string();

    let mut header = Map::new();
    header.insert(key(FieldTag::ReportId), Value::from(report.header.report_id));
    header.insert(key(FieldTag::Version), Value::from(report.header.version.as_str()));

    let m = &report.metrics;
    let mut metrics = Map::new();
    metrics.insert(
        key(FieldTag::ListeningTcpPorts),
        ports_to_json(&m.listening_tcp_ports, tags),
    );
    metrics.insert(
        key(FieldTag::ListeningUdpPorts),
        ports_to_json(&m.listening_udp_ports, tags),
    );

    let delta = m.network_stats.delta();
    let mut stats = Map::new();
    stats.insert(key(FieldTag::BytesIn), Value::from(delta.bytes_in));
    stats.insert(key(FieldTag::BytesOut), Value::from(delta.bytes_out));
    stats.insert(key(FieldTag::PacketsIn), Value::from(delta.packets_in));
    stats.insert(key(FieldTag::PacketsOut), Value::from(delta.packets_out));
    metrics.insert(key(FieldTag::NetworkStats), Value::Object(stats));

    let connections: Vec<Value> = m
        .established_connections
        .items
        .iter()
        .map(|conn| connection_to_json(conn, tags))
        .collect();
    let mut established = Map::new();
    established.insert(key(FieldTag::Connections), Value::Array(connections));
    established.insert(
        key(FieldTag::Total),
        Value::from(m.established_connections.total),
    );
    let mut tcp_connections = Map::new();
    tcp_connections.insert(
        key(FieldTag::EstablishedConnections),
        Value::Object(established),
    );
    metrics.insert(key(FieldTag::TcpConnections), Value::Object(tcp_connections));

    let mut root = Map::new();
    root.insert(key(FieldTag::Header), Value::Object(header));
    root.insert(key(FieldTag::Metrics), Value::Object(metrics));
    Value::Object(root)
}

fn ports_to_json(list: &ConnectionList, tags: &dyn TagDictionary) -> Value {
    let ports: Vec<Value> = list
        .items
        .iter()
        .map(|conn| {
            let mut port = Map::new();
            port.insert(
                tags.resolve(FieldTag::Port).to_string(),
                Value::from(conn.local_port_number().unwrap_or(0)),
            );
            if let Some(interface) = conn.interface() {
                port.insert(
                    tags.resolve(FieldTag::Interface).to_string(),
                    Value::from(interface),
                );
            }
            Value::Object(port)
        })
        .collect();

    let mut object = Map::new();
    object.insert(tags.resolve(FieldTag::Ports).to_string(), Value::Array(ports));
    object.insert(tags.resolve(FieldTag::Total).to_string(), Value::from(list.total));
    Value::Object(object)
}

fn connection_to_json(conn: &NetworkConnection, tags: &dyn TagDictionary) -> Value {
    let mut object = Map::new();
    if let Some(remote) = conn.remote_endpoint() {
        object.insert(tags.resolve(FieldTag::RemoteAddr).to_string(), Value::from(remote));
    }
    if let Some(interface) = conn.interface() {
        object.insert(
            tags.resolve(FieldTag::LocalInterface).to_string(),
            Value::from(interface),
        );
    }
    if let Some(port) = conn.local_port_number() {
        object.insert(tags.resolve(FieldTag::LocalPort).to_string(), Value::from(port));
    }
    Value::Object(object)
}
