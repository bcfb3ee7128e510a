// ── Certificate domain types ──

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use x509_parser::der_parser::asn1_rs::ToDer;
use x509_parser::prelude::*;

use crate::decode::{Decode, Fields};
use crate::error::CoreError;

/// The only certificate type the exporter interprets.
pub const X509: &str = "X509";

/// A certificate as listed by the daemon, not yet parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateRecord {
    pub cert_type: String,
    pub flag: String,
    /// DER (or PEM) encoded certificate.
    pub data: Bytes,
}

impl CertificateRecord {
    pub fn is_x509(&self) -> bool {
        self.cert_type == X509
    }

    pub fn parse(&self) -> Result<Certificate, CoreError> {
        Certificate::parse(&self.data)
    }
}

impl Decode for CertificateRecord {
    fn decode(_key: &str, fields: &Fields<'_>) -> Result<Self, CoreError> {
        Ok(Self {
            cert_type: fields.get("type")?,
            flag: fields.get("flag")?,
            data: fields.get("data")?,
        })
    }
}

/// The parts of an X.509 certificate that end up in metric labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub serial: Option<SerialNumber>,
    pub subject: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub alternate_names: AlternateNames,
}

impl Certificate {
    /// Parse DER, or PEM when the data starts with an armor line.
    pub fn parse(data: &[u8]) -> Result<Self, CoreError> {
        if data.starts_with(b"-----BEGIN") {
            let (_, pem) = x509_parser::pem::parse_x509_pem(data)
                .map_err(|e| CoreError::Parse(format!("invalid PEM: {e}")))?;
            Self::from_der(&pem.contents)
        } else {
            Self::from_der(data)
        }
    }

    fn from_der(der: &[u8]) -> Result<Self, CoreError> {
        let (_, x509) =
            X509Certificate::from_der(der).map_err(|e| CoreError::Parse(e.to_string()))?;

        let validity = x509.validity();
        let not_before = timestamp(validity.not_before.timestamp())?;
        let not_after = timestamp(validity.not_after.timestamp())?;

        let mut alternate_names = AlternateNames::default();
        let san = x509
            .subject_alternative_name()
            .map_err(|e| CoreError::Parse(format!("invalid subjectAltName: {e}")))?;
        if let Some(san) = san {
            for name in &san.value.general_names {
                alternate_names.push(name);
            }
        }

        Ok(Self {
            serial: SerialNumber::from_be_bytes(x509.raw_serial()),
            subject: format_name(x509.subject()),
            not_before,
            not_after,
            alternate_names,
        })
    }

    /// Strictly inside the validity window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before < now && now < self.not_after
    }

    /// Signed seconds until `not_after`, with sub-second precision.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> f64 {
        let remaining = self.not_after - now;
        match remaining.num_microseconds() {
            Some(micros) => micros as f64 / 1_000_000.0,
            None => remaining.num_seconds() as f64,
        }
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, CoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| CoreError::Parse(format!("validity timestamp {secs} out of range")))
}

// ── Distinguished names ─────────────────────────────────────────────

/// Attributes with a short name, in the order they are laid out before the
/// whole sequence is reversed for display.
const NAMED_ATTRIBUTES: [(&str, &str); 9] = [
    ("2.5.4.6", "C"),
    ("2.5.4.8", "ST"),
    ("2.5.4.7", "L"),
    ("2.5.4.9", "STREET"),
    ("2.5.4.17", "POSTALCODE"),
    ("2.5.4.10", "O"),
    ("2.5.4.11", "OU"),
    ("2.5.4.3", "CN"),
    ("2.5.4.5", "SERIALNUMBER"),
];

/// RFC 2253 rendering: most specific RDN first, `,` between RDNs and `+`
/// between values of one attribute. Attributes without a short name go last,
/// as `<oid>=#<hex DER>`.
fn format_name(name: &X509Name<'_>) -> String {
    let attributes: Vec<(String, &AttributeTypeAndValue<'_>)> = name
        .iter_attributes()
        .map(|attr| (attr.attr_type().to_id_string(), attr))
        .collect();

    let mut rdns: Vec<String> = Vec::new();
    for (oid, short) in NAMED_ATTRIBUTES.iter().rev() {
        let values: Vec<String> = attributes
            .iter()
            .filter(|(id, _)| id == oid)
            .map(|(_, attr)| format!("{short}={}", escape_value(&attribute_text(attr))))
            .collect();
        if !values.is_empty() {
            rdns.push(values.join("+"));
        }
    }

    let unnamed = attributes
        .iter()
        .rev()
        .filter(|(id, _)| NAMED_ATTRIBUTES.iter().all(|(oid, _)| oid != id))
        .map(|(id, attr)| match attr.attr_value().to_der_vec() {
            Ok(der) => format!("{id}=#{}", hex::encode(der)),
            Err(_) => format!("{id}={}", escape_value(&attribute_text(attr))),
        });
    rdns.extend(unnamed);

    rdns.join(",")
}

fn attribute_text(attr: &AttributeTypeAndValue<'_>) -> String {
    match attr.as_str() {
        Ok(text) => text.to_owned(),
        Err(_) => String::from_utf8_lossy(attr.as_slice()).into_owned(),
    }
}

fn escape_value(value: &str) -> String {
    let last = value.len().saturating_sub(1);
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        let escape = match c {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' => true,
            ' ' => i == 0 || i == last,
            '#' => i == 0,
            _ => false,
        };
        if escape {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ── Serial number ───────────────────────────────────────────────────

/// Unsigned serial number as its minimal big-endian magnitude.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialNumber(Vec<u8>);

impl SerialNumber {
    /// Leading zero bytes are dropped; zero itself keeps one byte.
    pub fn from_be_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
        Some(Self(bytes[first..].to_vec()))
    }
}

impl From<u64> for SerialNumber {
    fn from(value: u64) -> Self {
        let bytes = value.to_be_bytes();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
        Self(bytes[first..].to_vec())
    }
}

impl fmt::Display for SerialNumber {
    /// Lowercase hex, one `:` between bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            f.write_str(&hex::encode([*byte]))?;
        }
        Ok(())
    }
}

/// Label form of an optional serial; absent serials render empty.
pub fn format_serial_number(serial: Option<&SerialNumber>) -> String {
    serial.map(ToString::to_string).unwrap_or_default()
}

// ── Alternate names ─────────────────────────────────────────────────

/// Subject alternative names, grouped by kind in certificate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlternateNames {
    pub dns: Vec<String>,
    pub email: Vec<String>,
    pub ip: Vec<IpAddr>,
    pub uri: Vec<String>,
}

impl AlternateNames {
    fn push(&mut self, name: &GeneralName<'_>) {
        match name {
            GeneralName::DNSName(dns) => self.dns.push((*dns).to_owned()),
            GeneralName::RFC822Name(email) => self.email.push((*email).to_owned()),
            GeneralName::URI(uri) => self.uri.push((*uri).to_owned()),
            GeneralName::IPAddress(raw) => {
                if let Some(ip) = ip_from_octets(raw) {
                    self.ip.push(ip);
                }
            }
            _ => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dns.is_empty() && self.email.is_empty() && self.ip.is_empty() && self.uri.is_empty()
    }
}

fn ip_from_octets(raw: &[u8]) -> Option<IpAddr> {
    if let Ok(octets) = <[u8; 4]>::try_from(raw) {
        return Some(IpAddr::V4(Ipv4Addr::from(octets)));
    }
    <[u8; 16]>::try_from(raw)
        .ok()
        .map(|octets| IpAddr::V6(Ipv6Addr::from(octets)))
}

impl fmt::Display for AlternateNames {
    /// `DNS=a+DNS=b,EM=c,IP=d,URI=e`; empty groups are left out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group<T: fmt::Display>(tag: &str, members: &[T]) -> Option<String> {
            if members.is_empty() {
                return None;
            }
            let tagged: Vec<String> = members.iter().map(|m| format!("{tag}={m}")).collect();
            Some(tagged.join("+"))
        }

        let groups: Vec<String> = [
            group("DNS", &self.dns),
            group("EM", &self.email),
            group("IP", &self.ip),
            group("URI", &self.uri),
        ]
        .into_iter()
        .flatten()
        .collect();
        f.write_str(&groups.join(","))
    }
}
