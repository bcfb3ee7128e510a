// ── Field-tree decoding ──
//
// VICI hands back untyped trees. Domain types declare their fields through
// `Fields::get::<T>(key)`, and the coercion for each target type lives in
// exactly one `FromElement` impl. Absent or unparsable scalars coerce to
// zero values; only a structural mismatch (scalar vs list vs section) is an
// error.

use std::borrow::Cow;

use bytes::Bytes;
use indexmap::IndexMap;
use ipsec_vici::{Element, Message};

use crate::error::CoreError;

/// Conversion from one (possibly absent) tree node into a typed value.
pub trait FromElement: Sized {
    fn from_element(key: &str, element: Option<&Element>) -> Result<Self, CoreError>;
}

/// A record type built from the fields of one section.
pub trait Decode: Sized {
    /// `key` is the name the record was nested under in its parent.
    fn decode(key: &str, fields: &Fields<'_>) -> Result<Self, CoreError>;
}

/// Typed view over one section of a message.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    message: &'a Message,
}

impl<'a> Fields<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self { message }
    }

    pub fn get<T: FromElement>(&self, key: &str) -> Result<T, CoreError> {
        T::from_element(key, self.message.get(key))
    }
}

/// Decode the section nested under `key` as a `T`.
pub fn decode_section<T: Decode>(key: &str, element: &Element) -> Result<T, CoreError> {
    match element {
        Element::Section(section) => {
            T::decode(key, &Fields::new(section)).map_err(|e| e.within(key))
        }
        other => Err(mismatch(key, "section", other)),
    }
}

fn mismatch(key: &str, expected: &'static str, found: &Element) -> CoreError {
    CoreError::Decode {
        path: key.to_owned(),
        expected,
        found: found.kind(),
    }
}

fn scalar<'e>(key: &str, element: Option<&'e Element>) -> Result<Option<Cow<'e, str>>, CoreError> {
    match element {
        None => Ok(None),
        Some(Element::Scalar(value)) => Ok(Some(String::from_utf8_lossy(value))),
        Some(other) => Err(mismatch(key, "scalar", other)),
    }
}

// ── Scalar coercions ────────────────────────────────────────────────

impl FromElement for bool {
    fn from_element(key: &str, element: Option<&Element>) -> Result<Self, CoreError> {
        Ok(scalar(key, element)?.is_some_and(|v| v == "yes"))
    }
}

macro_rules! integer_from_element {
    ($($ty:ty),+) => {$(
        impl FromElement for $ty {
            fn from_element(key: &str, element: Option<&Element>) -> Result<Self, CoreError> {
                Ok(scalar(key, element)?
                    .and_then(|v| v.parse::<$ty>().ok())
                    .unwrap_or_default())
            }
        }
    )+};
}

integer_from_element!(u32, u64, i64);

impl FromElement for String {
    fn from_element(key: &str, element: Option<&Element>) -> Result<Self, CoreError> {
        Ok(scalar(key, element)?.map(Cow::into_owned).unwrap_or_default())
    }
}

impl FromElement for Bytes {
    fn from_element(key: &str, element: Option<&Element>) -> Result<Self, CoreError> {
        match element {
            None => Ok(Bytes::new()),
            Some(Element::Scalar(value)) => Ok(value.clone()),
            Some(other) => Err(mismatch(key, "scalar", other)),
        }
    }
}

// ── Compound coercions ──────────────────────────────────────────────

impl FromElement for Vec<String> {
    fn from_element(key: &str, element: Option<&Element>) -> Result<Self, CoreError> {
        match element {
            None => Ok(Vec::new()),
            Some(element) => element
                .as_list()
                .map(|items| {
                    items
                        .iter()
                        .map(|item| String::from_utf8_lossy(item).into_owned())
                        .collect()
                })
                .ok_or_else(|| mismatch(key, "list", element)),
        }
    }
}

impl<T: Decode> FromElement for IndexMap<String, T> {
    fn from_element(key: &str, element: Option<&Element>) -> Result<Self, CoreError> {
        match element {
            None => Ok(IndexMap::new()),
            Some(Element::Section(section)) => section
                .iter()
                .map(|(name, child)| {
                    let value = decode_section::<T>(name, child).map_err(|e| e.within(key))?;
                    Ok((name.to_owned(), value))
                })
                .collect(),
            Some(other) => Err(mismatch(key, "section", other)),
        }
    }
}
