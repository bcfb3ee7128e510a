// ── Tunnel domain types ──

use indexmap::IndexMap;

use crate::decode::{Decode, Fields};
use crate::error::CoreError;

/// Connection state as exported in the `status` gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Installed = 0,
    Established = 1,
    Down = 2,
    Unknown = 3,
}

impl ConnectionStatus {
    /// Map the daemon's free-text state token.
    pub fn from_state(state: &str) -> Self {
        match state {
            "ESTABLISHED" => Self::Established,
            "INSTALLED" | "REKEYED" | "REKEYING" => Self::Installed,
            "" => Self::Down,
            _ => Self::Unknown,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Installed => 0.0,
            Self::Established => 1.0,
            Self::Down => 2.0,
            Self::Unknown => 3.0,
        }
    }
}

/// Negotiated cipher suite, shared by tunnels and their children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Proposal {
    pub encryption_algorithm: String,
    pub encryption_key_size: u32,
    pub integrity_algorithm: String,
    pub integrity_key_size: u32,
    pub prf_algorithm: String,
    pub dh_group: String,
}

impl Proposal {
    fn from_fields(fields: &Fields<'_>) -> Result<Self, CoreError> {
        Ok(Self {
            encryption_algorithm: fields.get("encr-alg")?,
            encryption_key_size: fields.get("encr-keysize")?,
            integrity_algorithm: fields.get("integ-alg")?,
            integrity_key_size: fields.get("integ-keysize")?,
            prf_algorithm: fields.get("prf-alg")?,
            dh_group: fields.get("dh-group")?,
        })
    }
}

/// One side of a tunnel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u32,
    pub id: String,
}

/// An IKE security association.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tunnel {
    /// Key the daemon listed the tunnel under.
    pub name: String,
    pub unique_id: String,
    pub version: u32,
    pub state: String,
    pub local: Endpoint,
    pub remote: Endpoint,
    pub initiator: bool,
    pub initiator_spi: String,
    pub responder_spi: String,
    pub nat_local: bool,
    pub nat_remote: bool,
    pub nat_fake: bool,
    pub nat_any: bool,
    pub proposal: Proposal,
    pub established_seconds: i64,
    pub rekey_seconds: i64,
    pub reauth_seconds: i64,
    /// Children in the order the daemon reported them.
    pub children: IndexMap<String, ChildAssociation>,
}

impl Tunnel {
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_state(&self.state)
    }
}

impl Decode for Tunnel {
    fn decode(key: &str, fields: &Fields<'_>) -> Result<Self, CoreError> {
        Ok(Self {
            name: key.to_owned(),
            unique_id: fields.get("uniqueid")?,
            version: fields.get("version")?,
            state: fields.get("state")?,
            local: Endpoint {
                host: fields.get("local-host")?,
                port: fields.get("local-port")?,
                id: fields.get("local-id")?,
            },
            remote: Endpoint {
                host: fields.get("remote-host")?,
                port: fields.get("remote-port")?,
                id: fields.get("remote-id")?,
            },
            initiator: fields.get("initiator")?,
            initiator_spi: fields.get("initiator-spi")?,
            responder_spi: fields.get("responder-spi")?,
            nat_local: fields.get("nat-local")?,
            nat_remote: fields.get("nat-remote")?,
            nat_fake: fields.get("nat-fake")?,
            nat_any: fields.get("nat-any")?,
            proposal: Proposal::from_fields(fields)?,
            established_seconds: fields.get("established")?,
            rekey_seconds: fields.get("rekey-time")?,
            reauth_seconds: fields.get("reauth-time")?,
            children: fields.get("child-sas")?,
        })
    }
}

/// A child (IPsec) security association, owned by its tunnel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildAssociation {
    pub name: String,
    pub unique_id: String,
    pub request_id: String,
    pub state: String,
    pub mode: String,
    pub protocol: String,
    pub encapsulated: bool,
    pub proposal: Proposal,
    pub extended_sequence_numbers: bool,
    pub bytes_in: u64,
    pub packets_in: u64,
    pub last_in_seconds: i64,
    pub bytes_out: u64,
    pub packets_out: u64,
    pub last_out_seconds: i64,
    pub rekey_seconds: i64,
    pub lifetime_seconds: i64,
    pub installed_seconds: i64,
    pub local_selectors: Vec<String>,
    pub remote_selectors: Vec<String>,
}

impl ChildAssociation {
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus::from_state(&self.state)
    }
}

impl Decode for ChildAssociation {
    fn decode(key: &str, fields: &Fields<'_>) -> Result<Self, CoreError> {
        let name: String = fields.get("name")?;
        Ok(Self {
            name: if name.is_empty() { key.to_owned() } else { name },
            unique_id: fields.get("uniqueid")?,
            request_id: fields.get("reqid")?,
            state: fields.get("state")?,
            mode: fields.get("mode")?,
            protocol: fields.get("protocol")?,
            encapsulated: fields.get("encap")?,
            proposal: Proposal::from_fields(fields)?,
            extended_sequence_numbers: fields.get("esn")?,
            bytes_in: fields.get("bytes-in")?,
            packets_in: fields.get("packets-in")?,
            last_in_seconds: fields.get("use-in")?,
            bytes_out: fields.get("bytes-out")?,
            packets_out: fields.get("packets-out")?,
            last_out_seconds: fields.get("use-out")?,
            rekey_seconds: fields.get("rekey-time")?,
            lifetime_seconds: fields.get("life-time")?,
            installed_seconds: fields.get("install-time")?,
            local_selectors: fields.get("local-ts")?,
            remote_selectors: fields.get("remote-ts")?,
        })
    }
}
