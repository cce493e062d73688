//! Directory data model and wire types.

use serde::{Deserialize, Deserializer, Serialize};

/// Reserved group every client belongs to.
pub const DEFAULT_GROUP_ID: u32 = 0;

/// A network address attached to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceAddress {
    /// Empty when the directory sent no usable address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ip: String,

    /// Remaining directory fields (name, lastSeen, ...), passed through as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A device known to the directory's network table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Hardware (MAC) address. Absent for some virtual entries.
    #[serde(default)]
    pub hwaddr: Option<String>,

    /// Addresses in the order the directory reports them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ips: Vec<DeviceAddress>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Device {
    /// Build a device with no extra directory fields. Used to seed in-memory
    /// directories.
    pub fn new(hwaddr: impl Into<String>, ips: &[&str]) -> Self {
        Self {
            hwaddr: Some(hwaddr.into()),
            ips: ips
                .iter()
                .map(|ip| DeviceAddress {
                    ip: (*ip).to_string(),
                    extra: serde_json::Map::new(),
                })
                .collect(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Per-client policy record from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Client key; for devices this is the hardware address.
    pub client: String,

    /// A missing or null set decodes as empty.
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<u32>,
}

impl ClientRecord {
    /// Build a record directly, as in-memory registries do.
    pub fn new(client: impl Into<String>, groups: &[u32]) -> Self {
        Self {
            client: client.into(),
            groups: groups.to_vec(),
        }
    }
}

/// A directory group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// One odd record must not fail a whole listing, so `null` reads as the
/// field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// `GET /api/network/devices` body.
#[derive(Debug, Deserialize)]
pub(crate) struct DeviceListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
}

/// `GET /api/clients` body.
#[derive(Debug, Deserialize)]
pub(crate) struct ClientListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clients: Vec<ClientRecord>,
}

/// `PUT /api/clients/{client}` body.
#[derive(Debug, Serialize)]
pub(crate) struct AssignGroupsRequest<'a> {
    pub groups: &'a [u32],
}

/// `POST /api/groups` body.
#[derive(Debug, Serialize)]
pub(crate) struct CreateGroupRequest<'a> {
    pub name: &'a str,
    pub comment: &'a str,
    pub enabled: bool,
}

/// Group endpoints answer with a list, even for single-group calls.
#[derive(Debug, Deserialize)]
pub(crate) struct GroupListResponse {
    #[serde(default)]
    pub groups: Vec<serde_json::Value>,
}
