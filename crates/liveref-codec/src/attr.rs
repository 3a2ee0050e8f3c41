//! Attribute tables and values
//!
//! Every reference node kind declares a static table of [`AttrSpec`] rows.
//! The codec is written once over that table, so adding an attribute to a node
//! kind means adding one row and one accessor arm.

use crate::error::AttrError;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Persisted markup attribute bag (key → raw string value)
///
/// Ordered so that encoding is deterministic.
pub type AttrBag = BTreeMap<String, String>;

/// Value shape of a declared attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Free-form text
    Text,
    /// Finite floating point number
    Number,
    /// Boolean flag, persisted as `"true"` / `"false"`
    Bool,
    /// Closed set of text values
    Choice(&'static [&'static str]),
}

/// Declared default of an attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrDefault {
    /// Absent
    Null,
    /// Text or choice default
    Text(&'static str),
    /// Boolean default
    Bool(bool),
}

impl AttrDefault {
    /// In-memory value of this default
    #[inline]
    #[must_use]
    pub fn to_value(self) -> AttrValue {
        match self {
            Self::Null => AttrValue::Null,
            Self::Text(s) => AttrValue::Text(s.to_string()),
            Self::Bool(b) => AttrValue::Bool(b),
        }
    }
}

/// One row of a node kind's attribute table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttrSpec {
    /// In-memory attribute name (`displayStyle`)
    pub name: &'static str,
    /// Canonical persisted key (`data-display-style`)
    pub key: &'static str,
    /// Legacy persisted keys still accepted on decode, in priority order
    pub aliases: &'static [&'static str],
    /// Value shape
    pub kind: AttrKind,
    /// Declared default
    pub default: AttrDefault,
}

impl AttrSpec {
    /// Whether `value` equals this attribute's declared default
    #[must_use]
    pub fn is_default(&self, value: &AttrValue) -> bool {
        *value == self.default.to_value()
    }

    /// Every persisted key this attribute may appear under, canonical first
    pub fn keys(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.key).chain(self.aliases.iter().copied())
    }
}

/// Dynamically typed attribute value
///
/// This is the currency between typed attribute structs, the codec, and the
/// document's allow-list merge.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Absent / unset
    Null,
    /// Text or choice value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
}

impl AttrValue {
    /// Collapse non-finite numbers to `Null`
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Number(n) if !n.is_finite() => Self::Null,
            other => other,
        }
    }

    /// Whether the value is `Null`
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the value's shape, for error messages
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
        }
    }

    pub(crate) fn into_text(self, name: &str) -> Result<Option<String>, AttrError> {
        match self {
            Self::Null => Ok(None),
            Self::Text(s) => Ok(Some(s)),
            other => Err(AttrError::type_mismatch(name, "text", other.shape())),
        }
    }

    pub(crate) fn into_number(self, name: &str) -> Result<Option<f64>, AttrError> {
        match self.normalized() {
            Self::Null => Ok(None),
            Self::Number(n) => Ok(Some(n)),
            other => Err(AttrError::type_mismatch(name, "number", other.shape())),
        }
    }

    pub(crate) fn into_bool(self, name: &str, default: bool) -> Result<bool, AttrError> {
        match self {
            Self::Null => Ok(default),
            Self::Bool(b) => Ok(b),
            other => Err(AttrError::type_mismatch(name, "bool", other.shape())),
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Sealed trait marker
#[doc(hidden)]
pub mod private {
    /// Only node kinds declared in this crate carry attribute tables
    pub trait Sealed {}
}

/// Typed attribute set of one reference node kind
///
/// Sealed: the persisted format is versioned here, in one place.
pub trait NodeAttrs: Default + Clone + PartialEq + std::fmt::Debug + private::Sealed {
    /// Attribute table, in encoding order
    const SPECS: &'static [AttrSpec];

    /// Read an attribute by in-memory name; unknown names read as `Null`
    fn get(&self, name: &str) -> AttrValue;

    /// Write an attribute by in-memory name
    ///
    /// # Errors
    /// - `AttrError::UnknownAttribute` if `name` is not in [`Self::SPECS`]
    /// - `AttrError::TypeMismatch` / `AttrError::InvalidChoice` on a shape mismatch
    fn set(&mut self, name: &str, value: AttrValue) -> Result<(), AttrError>;

    /// Look up the table row for `name`
    #[must_use]
    fn spec(name: &str) -> Option<&'static AttrSpec> {
        Self::SPECS.iter().find(|s| s.name == name)
    }
}
