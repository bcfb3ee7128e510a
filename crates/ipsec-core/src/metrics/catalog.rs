// ── Metric catalog ──
//
// Every exported gauge, without the configurable prefix.

/// Static description of one gauge family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Desc {
    pub suffix: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

const TUNNEL: &[&str] = &["tunnel_name", "tunnel_id"];
const TUNNEL_ALGORITHM: &[&str] = &["tunnel_name", "tunnel_id", "algorithm", "dh_group"];
const CHILD: &[&str] = &["tunnel_name", "tunnel_id", "child_name", "child_id"];
const CHILD_SELECTORS: &[&str] = &[
    "tunnel_name",
    "tunnel_id",
    "child_name",
    "child_id",
    "local_ts",
    "remote_ts",
];
const CHILD_ALGORITHM: &[&str] = &[
    "tunnel_name",
    "tunnel_id",
    "child_name",
    "child_id",
    "algorithm",
    "dh_group",
];
const CERTIFICATE: &[&str] = &[
    "serial_number",
    "subject",
    "alternate_names",
    "not_before",
    "not_after",
];

// ── Tunnels ─────────────────────────────────────────────────────────

pub const TUNNEL_COUNT: Desc = Desc {
    suffix: "tunnel_count",
    help: "Number of known tunnels",
    labels: &[],
};
pub const TUNNEL_VERSION: Desc = Desc {
    suffix: "tunnel_version",
    help: "Version of this tunnel",
    labels: TUNNEL,
};
pub const TUNNEL_STATUS: Desc = Desc {
    suffix: "tunnel_status",
    help: "Status of this tunnel",
    labels: TUNNEL,
};
pub const TUNNEL_INITIATOR: Desc = Desc {
    suffix: "tunnel_initiator",
    help: "Flag if the server is the initiator for this connection",
    labels: TUNNEL,
};
pub const TUNNEL_NAT_LOCAL: Desc = Desc {
    suffix: "tunnel_nat_local",
    help: "Flag if the local endpoint is behind nat",
    labels: TUNNEL,
};
pub const TUNNEL_NAT_REMOTE: Desc = Desc {
    suffix: "tunnel_nat_remote",
    help: "Flag if the remote server is behind nat",
    labels: TUNNEL,
};
pub const TUNNEL_NAT_FAKE: Desc = Desc {
    suffix: "tunnel_nat_fake",
    help: "Flag if NAT situation has been faked as responder",
    labels: TUNNEL,
};
pub const TUNNEL_NAT_ANY: Desc = Desc {
    suffix: "tunnel_nat_any",
    help: "Flag if any endpoint is behind a NAT (also if faked)",
    labels: TUNNEL,
};
pub const TUNNEL_ENCRYPTION_KEY_SIZE: Desc = Desc {
    suffix: "tunnel_encryption_key_size",
    help: "Key size of the encryption algorithm",
    labels: TUNNEL_ALGORITHM,
};
pub const TUNNEL_INTEGRITY_KEY_SIZE: Desc = Desc {
    suffix: "tunnel_integrity_key_size",
    help: "Key size of the integrity algorithm",
    labels: TUNNEL_ALGORITHM,
};
pub const TUNNEL_ESTABLISHED_SECONDS: Desc = Desc {
    suffix: "tunnel_established_seconds",
    help: "Seconds since the tunnel was established",
    labels: TUNNEL,
};
pub const TUNNEL_REKEY_SECONDS: Desc = Desc {
    suffix: "tunnel_rekey_seconds",
    help: "Seconds until the tunnel will be rekeyed",
    labels: TUNNEL,
};
pub const TUNNEL_REAUTH_SECONDS: Desc = Desc {
    suffix: "tunnel_reauth_seconds",
    help: "Seconds until the tunnel will be reauthed",
    labels: TUNNEL,
};
pub const TUNNEL_CHILDREN_SIZE: Desc = Desc {
    suffix: "tunnel_children_size",
    help: "Count of children of this tunnel",
    labels: TUNNEL,
};

// ── Children ────────────────────────────────────────────────────────

pub const CHILD_STATUS: Desc = Desc {
    suffix: "child_status",
    help: "Status of this child sa",
    labels: CHILD_SELECTORS,
};
pub const CHILD_ENCAP: Desc = Desc {
    suffix: "child_encap",
    help: "Forced Encapsulation in UDP Packets",
    labels: CHILD,
};
pub const CHILD_ENCRYPTION_KEY_SIZE: Desc = Desc {
    suffix: "child_encryption_key_size",
    help: "Key size of the encryption algorithm",
    labels: CHILD_ALGORITHM,
};
pub const CHILD_INTEGRITY_KEY_SIZE: Desc = Desc {
    suffix: "child_integrity_key_size",
    help: "Key size of the integrity algorithm",
    labels: CHILD_ALGORITHM,
};
pub const CHILD_INBOUND_BYTES: Desc = Desc {
    suffix: "child_inbound_bytes",
    help: "Number of input bytes processed",
    labels: CHILD_SELECTORS,
};
pub const CHILD_INBOUND_PACKETS: Desc = Desc {
    suffix: "child_inbound_packets",
    help: "Number of input packets processed",
    labels: CHILD_SELECTORS,
};
pub const CHILD_LAST_INBOUND_SECONDS: Desc = Desc {
    suffix: "child_last_inbound_seconds",
    help: "Number of seconds since the last inbound packet was received",
    labels: CHILD_SELECTORS,
};
pub const CHILD_OUTBOUND_BYTES: Desc = Desc {
    suffix: "child_outbound_bytes",
    help: "Number of output bytes processed",
    labels: CHILD_SELECTORS,
};
pub const CHILD_OUTBOUND_PACKETS: Desc = Desc {
    suffix: "child_outbound_packets",
    help: "Number of output packets processed",
    labels: CHILD_SELECTORS,
};
pub const CHILD_LAST_OUTBOUND_SECONDS: Desc = Desc {
    suffix: "child_last_outbound_seconds",
    help: "Number of seconds since the last outbound packet was sent",
    labels: CHILD_SELECTORS,
};
pub const CHILD_ESTABLISHED_SECONDS: Desc = Desc {
    suffix: "child_established_seconds",
    help: "Seconds since the child SA was established",
    labels: CHILD,
};
pub const CHILD_REKEY_SECONDS: Desc = Desc {
    suffix: "child_rekey_seconds",
    help: "Seconds until the child SA will be rekeyed",
    labels: CHILD,
};
pub const CHILD_LIFETIME_SECONDS: Desc = Desc {
    suffix: "child_lifetime_seconds",
    help: "Seconds until the lifetime expires",
    labels: CHILD,
};

// ── Certificates ────────────────────────────────────────────────────

pub const CERT_COUNT: Desc = Desc {
    suffix: "cert_count",
    help: "Number of X509 certificates",
    labels: &[],
};
pub const CERT_VALID: Desc = Desc {
    suffix: "cert_valid",
    help: "X509 certificate validity",
    labels: CERTIFICATE,
};
pub const CERT_EXPIRE_SECONDS: Desc = Desc {
    suffix: "cert_expire_seconds",
    help: "Seconds until the X509 certificate expires",
    labels: CERTIFICATE,
};

/// All gauges in emission order.
pub const ALL: &[Desc] = &[
    TUNNEL_COUNT,
    TUNNEL_VERSION,
    TUNNEL_STATUS,
    TUNNEL_INITIATOR,
    TUNNEL_NAT_LOCAL,
    TUNNEL_NAT_REMOTE,
    TUNNEL_NAT_FAKE,
    TUNNEL_NAT_ANY,
    TUNNEL_ENCRYPTION_KEY_SIZE,
    TUNNEL_INTEGRITY_KEY_SIZE,
    TUNNEL_ESTABLISHED_SECONDS,
    TUNNEL_REKEY_SECONDS,
    TUNNEL_REAUTH_SECONDS,
    TUNNEL_CHILDREN_SIZE,
    CHILD_STATUS,
    CHILD_ENCAP,
    CHILD_ENCRYPTION_KEY_SIZE,
    CHILD_INTEGRITY_KEY_SIZE,
    CHILD_INBOUND_BYTES,
    CHILD_INBOUND_PACKETS,
    CHILD_LAST_INBOUND_SECONDS,
    CHILD_OUTBOUND_BYTES,
    CHILD_OUTBOUND_PACKETS,
    CHILD_LAST_OUTBOUND_SECONDS,
    CHILD_ESTABLISHED_SECONDS,
    CHILD_REKEY_SECONDS,
    CHILD_LIFETIME_SECONDS,
    CERT_COUNT,
    CERT_VALID,
    CERT_EXPIRE_SECONDS,
];
