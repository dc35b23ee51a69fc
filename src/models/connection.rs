use serde::{Deserialize, Serialize};

/// Socket state as decoded from the `st` column of a connection table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    Established,
    Listen,
    #[default]
    Other,
}

impl ConnectionState {
    /// Decodes the two-digit hex status code used by `/proc/net/tcp`
    pub fn from_hex(code: &str) -> Self {
        match code {
            "01" => ConnectionState::Established,
            "0A" => ConnectionState::Listen,
            _ => ConnectionState::Other,
        }
    }

    /// Stable numeric code used when building identity keys
    pub fn code(self) -> u8 {
        match self {
            ConnectionState::Established => 1,
            ConnectionState::Listen => 2,
            ConnectionState::Other => 3,
        }
    }
}

/// One row of a TCP or UDP socket table
///
/// Addresses and ports are kept as decoded text. UDP rows carry the
/// unspecified peer address and port `0`, since the table has no peer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkConnection {
    pub local_interface: Option<String>,
    pub local_address: String,
    pub local_port: String,
    pub remote_address: String,
    pub remote_port: String,
    pub state: ConnectionState,
}

impl NetworkConnection {
    /// Composite identity used for deduplication
    ///
    /// Field order is local port, local address, local interface, remote port,
    /// remote address, state. Two connections are duplicates iff their keys match.
    pub fn identity_key(&self) -> String {
        format!(
            "{}{}{}{}{}{}",
            self.local_port,
            self.local_address,
            self.local_interface.as_deref().unwrap_or(""),
            self.remote_port,
            self.remote_address,
            self.state.code()
        )
    }

    /// Local port as a number, `None` when unset, unparsable or zero
    pub fn local_port_number(&self) -> Option<u16> {
        self.local_port.parse::<u16>().ok().filter(|port| *port > 0)
    }

    /// Interface name, `None` when unset or empty
    pub fn interface(&self) -> Option<&str> {
        self.local_interface
            .as_deref()
            .filter(|name| !name.is_empty())
    }

    /// Remote endpoint rendered as `address:port`, `None` without a remote address
    pub fn remote_endpoint(&self) -> Option<String> {
        if self.remote_address.is_empty() {
            return None;
        }
        if self.remote_port.is_empty() {
            return Some(self.remote_address.clone());
        }
        Some(format!("{}:{}", self.remote_address, self.remote_port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(local_port: &str, state: ConnectionState) -> NetworkConnection {
        NetworkConnection {
            local_interface: None,
            local_address: "10.0.0.1".to_string(),
            local_port: local_port.to_string(),
            remote_address: "10.0.0.2".to_string(),
            remote_port: "443".to_string(),
            state,
        }
    }

    #[test]
    fn test_state_from_hex() {
        assert_eq!(ConnectionState::from_hex("01"), ConnectionState::Established);
        assert_eq!(ConnectionState::from_hex("0A"), ConnectionState::Listen);
        assert_eq!(ConnectionState::from_hex("06"), ConnectionState::Other);
        assert_eq!(ConnectionState::from_hex(""), ConnectionState::Other);
    }

    #[test]
    fn test_identity_key_field_order() {
        let conn = connection("22", ConnectionState::Established);
        assert_eq!(conn.identity_key(), "2210.0.0.144310.0.0.21");

        let mut with_interface = conn.clone();
        with_interface.local_interface = Some("eth0".to_string());
        assert_eq!(with_interface.identity_key(), "2210.0.0.1eth044310.0.0.21");
    }

    #[test]
    fn test_identity_key_distinguishes_state() {
        let established = connection("22", ConnectionState::Established);
        let listening = connection("22", ConnectionState::Listen);
        assert_ne!(established.identity_key(), listening.identity_key());
    }

    #[test]
    fn test_optional_accessors() {
        let mut conn = connection("0", ConnectionState::Listen);
        assert_eq!(conn.local_port_number(), None);
        assert_eq!(conn.interface(), None);
        assert_eq!(conn.remote_endpoint().as_deref(), Some("10.0.0.2:443"));

        conn.local_port = "8080".to_string();
        conn.local_interface = Some(String::new());
        conn.remote_address.clear();
        assert_eq!(conn.local_port_number(), Some(8080));
        assert_eq!(conn.interface(), None);
        assert_eq!(conn.remote_endpoint(), None);
    }
}
