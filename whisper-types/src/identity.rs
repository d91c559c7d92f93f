use serde::{Deserialize, Serialize};

/// A node's self-reported name and reachable network location.
///
/// Exchanged verbatim during a handshake. Neither field is validated: an
/// empty alias or address is stored and returned like any other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Routing key other nodes use to reach this node.
    pub alias: String,
    /// Address other nodes dial to reach this node (`host:port`).
    pub address: String,
}

impl Identity {
    pub fn new(alias: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            address: address.into(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.alias, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let id = Identity::new("b", "b:9000");
        assert_eq!(id.to_string(), "b@b:9000");
    }

    #[test]
    fn test_wire_field_names() {
        let id = Identity::new("a", "127.0.0.1:9900");
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["alias"], "a");
        assert_eq!(json["address"], "127.0.0.1:9900");
    }

    #[test]
    fn test_empty_fields_allowed() {
        let id: Identity = serde_json::from_str(r#"{"alias":"","address":""}"#).unwrap();
        assert_eq!(id, Identity::new("", ""));
    }
}
