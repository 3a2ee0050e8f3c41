//! Catalog keys
//!
//! Two disjoint identifier spaces: internal ids (UUIDs) and external catalog
//! codes (ten ASCII alphanumerics). Routing is a pure function of shape.

use crate::error::ResolutionError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

static CATALOG_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[A-Za-z0-9]{10}$").expect("catalog code pattern is valid")
});

/// Normalized cache key and backend route for an identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "route", content = "value", rename_all = "snake_case")]
pub enum CatalogKey {
    /// External catalog code, upper-cased; routed to query-by-code
    Code(String),
    /// Internal id; routed to fetch-by-id
    Internal(Uuid),
}

impl CatalogKey {
    /// Parse and normalize a raw identifier
    ///
    /// Surrounding whitespace is ignored and codes are upper-cased, so
    /// `" b07xj8c8f5"` and `"B07XJ8C8F5"` share one cache entry.
    ///
    /// # Errors
    /// `ResolutionError::UnrecognizedIdentifier` if the identifier has
    /// neither shape
    pub fn parse(raw: &str) -> Result<Self, ResolutionError> {
        let trimmed = raw.trim();
        if CATALOG_CODE.is_match(trimmed) {
            return Ok(Self::Code(trimmed.to_ascii_uppercase()));
        }
        Uuid::parse_str(trimmed)
            .map(Self::Internal)
            .map_err(|_| ResolutionError::UnrecognizedIdentifier(raw.to_string()))
    }

    /// Whether `raw` has the catalog code shape
    #[inline]
    #[must_use]
    pub fn is_catalog_code(raw: &str) -> bool {
        CATALOG_CODE.is_match(raw.trim())
    }

    /// Identifier as sent to the backend
    #[must_use]
    pub fn identifier(&self) -> String {
        match self {
            Self::Code(code) => code.clone(),
            Self::Internal(id) => id.to_string(),
        }
    }
}

impl FromStr for CatalogKey {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for CatalogKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "code:{code}"),
            Self::Internal(id) => write!(f, "id:{id}"),
        }
    }
}
