//! Deduplication, state filtering and sampling of connection lists

use log::debug;
use rand::Rng;
use rand::seq::index;

use crate::models::{ConnectionState, NetworkConnection};

/// Collapses connections sharing an identity key into one record
///
/// The result is ordered by identity key, not by input order. Of each run of
/// duplicates, the first record in input order survives.
pub fn dedup_connections(connections: Vec<NetworkConnection>) -> Vec<NetworkConnection> {
    let before = connections.len();

    let mut keyed: Vec<(String, NetworkConnection)> = connections
        .into_iter()
        .map(|conn| (conn.identity_key(), conn))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.dedup_by(|later, earlier| later.0 == earlier.0);

    let unique: Vec<NetworkConnection> = keyed.into_iter().map(|(_, conn)| conn).collect();
    debug!(
        "Filtered {} duplicate connections ({} unique)",
        before - unique.len(),
        unique.len()
    );
    unique
}

/// Returns copies of the connections in `state`, preserving their relative order
pub fn filter_by_state(
    connections: &[NetworkConnection],
    state: ConnectionState,
) -> Vec<NetworkConnection> {
    connections
        .iter()
        .filter(|conn| conn.state == state)
        .cloned()
        .collect()
}

/// Bounds a list to at most `sample_size` records
///
/// Lists that already fit are returned whole and in order. Larger lists yield
/// exactly `sample_size` records drawn from distinct input positions.
pub fn sample_connections<R: Rng + ?Sized>(
    connections: &[NetworkConnection],
    sample_size: usize,
    rng: &mut R,
) -> Vec<NetworkConnection> {
    if connections.len() <= sample_size {
        return connections.to_vec();
    }

    debug!(
        "Sampling {} of {} connections",
        sample_size,
        connections.len()
    );
    index::sample(rng, connections.len(), sample_size)
        .into_iter()
        .map(|idx| connections[idx].clone())
        .collect()
}
