// ── VICI message tree ──
//
// A message is an ordered set of named elements. Each element is a scalar
// value, a list of scalar values, or a nested section. Values are raw bytes
// on the wire; string and integer helpers sit on top.

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;
use indexmap::IndexMap;

/// Key carrying the daemon's success flag on command responses.
pub const SUCCESS_KEY: &str = "success";
/// Key carrying the daemon's error text when `success` is `no`.
pub const ERRMSG_KEY: &str = "errmsg";

/// One node of a VICI message tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// A single value. VICI values are opaque bytes (certificates are DER).
    Scalar(Bytes),
    /// An ordered list of values.
    List(Vec<Bytes>),
    /// A nested, named sub-tree.
    Section(Message),
}

impl Element {
    /// Short name of the element shape, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::List(_) => "list",
            Self::Section(_) => "section",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// The scalar value as text, replacing invalid UTF-8.
    pub fn as_str(&self) -> Option<Cow<'_, str>> {
        self.as_bytes().map(String::from_utf8_lossy)
    }

    pub fn as_list(&self) -> Option<&[Bytes]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Message> {
        match self {
            Self::Section(message) => Some(message),
            _ => None,
        }
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Self::Scalar(Bytes::copy_from_slice(value.as_bytes()))
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Self::Scalar(Bytes::from(value))
    }
}

impl From<Vec<u8>> for Element {
    fn from(value: Vec<u8>) -> Self {
        Self::Scalar(Bytes::from(value))
    }
}

impl From<Bytes> for Element {
    fn from(value: Bytes) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Self::from(value.to_string())
    }
}

impl From<u64> for Element {
    fn from(value: u64) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Vec<&str>> for Element {
    fn from(items: Vec<&str>) -> Self {
        Self::List(
            items
                .into_iter()
                .map(|item| Bytes::copy_from_slice(item.as_bytes()))
                .collect(),
        )
    }
}

impl From<Vec<String>> for Element {
    fn from(items: Vec<String>) -> Self {
        Self::List(items.into_iter().map(Bytes::from).collect())
    }
}

impl From<Message> for Element {
    fn from(message: Message) -> Self {
        Self::Section(message)
    }
}

/// An ordered VICI message.
///
/// Insertion order is preserved so a message encodes back to the same byte
/// sequence it was decoded from, and so nested sections iterate in the order
/// the daemon reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    elements: IndexMap<String, Element>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Element>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace an element, returning the previous one.
    ///
    /// Replacing keeps the key at its original position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Element>) -> Option<Element> {
        self.elements.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Element> {
        self.elements.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The daemon's failure message, if this message is a failed response.
    ///
    /// Messages without a `success` key are treated as successful, since
    /// streamed events never carry one.
    pub fn err(&self) -> Option<String> {
        let success = self.get(SUCCESS_KEY)?.as_str()?;
        if success == "no" {
            let message = self
                .get(ERRMSG_KEY)
                .and_then(Element::as_str)
                .map_or_else(|| "command failed".to_owned(), Cow::into_owned);
            Some(message)
        } else {
            None
        }
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = (&'a String, &'a Element);
    type IntoIter = indexmap::map::Iter<'a, String, Element>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for Message {
    /// Compact, human-readable rendering for trace logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, element)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match element {
                Element::Scalar(value) => {
                    write!(f, "{key}={}", String::from_utf8_lossy(value))?;
                }
                Element::List(items) => {
                    write!(f, "{key}=[")?;
                    for (j, item) in items.iter().enumerate() {
                        if j > 0 {
                            f.write_str(", ")?;
                        }
                        f.write_str(&String::from_utf8_lossy(item))?;
                    }
                    f.write_str("]")?;
                }
                Element::Section(section) => write!(f, "{key}={section}")?,
            }
        }
        f.write_str("}")
    }
}
