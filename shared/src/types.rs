use serde::{Deserialize, Serialize};

/// One running instance of a named service, as resolved by the registry.
/// This is the wire shape shared by the HTTP, UDP and TCP channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceNode {
    /// host:port or URI of the instance
    pub address: String,

    /// Registry-assigned identifier of the instance
    pub node_name: String,
}

impl ServiceNode {
    pub fn new(address: impl Into<String>, node_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            node_name: node_name.into(),
        }
    }

    /// Parse a discovery response body. Fields other than `address` and
    /// `nodeName` are ignored; both must be present and be strings.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Query parameters of a discovery request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverQuery {
    pub service_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<bool>,
}

impl DiscoverQuery {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }
}
