//! Catalog backend contract
//!
//! The transport belongs to the host application; this crate only consumes
//! the two query operations and normalizes what they return.

use crate::error::BackendError;
use crate::key::CatalogKey;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Backend catalog query operations
///
/// Both operations return the raw, possibly legacy-shaped payload, or
/// `Ok(None)` when the backend has no such entity.
#[async_trait]
pub trait CatalogBackend: Send + Sync + 'static {
    /// Fetch one entity by internal id
    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Value>, BackendError>;

    /// Query one entity by external catalog code
    async fn query_by_code(&self, code: &str) -> Result<Option<Value>, BackendError>;
}

/// Dispatch a key to the backend operation it routes to
pub(crate) async fn fetch(backend: &dyn CatalogBackend, key: &CatalogKey) -> Result<Option<Value>, BackendError> {
    match key {
        CatalogKey::Code(code) => backend.query_by_code(code).await,
        CatalogKey::Internal(id) => backend.fetch_by_id(*id).await,
    }
}

/// In-memory catalog indexed by internal id and catalog code
///
/// Serves payloads verbatim, so legacy shapes reach normalization untouched.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    by_id: HashMap<Uuid, Value>,
    by_code: HashMap<String, Value>,
}

impl InMemoryCatalog {
    /// Create empty catalog
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON array of payloads
    ///
    /// # Errors
    /// `BackendError::Unavailable` if the document is not a JSON array
    pub fn from_json_str(json: &str) -> Result<Self, BackendError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| BackendError::Unavailable(format!("invalid catalog json: {e}")))?;
        let Value::Array(items) = value else {
            return Err(BackendError::Unavailable("catalog json must be an array".to_string()));
        };
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        Ok(catalog)
    }

    /// Add a payload, indexed by its `id` (UUID) and `asin` / `code` fields
    ///
    /// Payloads with neither are ignored.
    pub fn insert(&mut self, payload: Value) -> bool {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok());
        let code = ["asin", "code"]
            .iter()
            .find_map(|k| payload.get(*k).and_then(Value::as_str))
            .filter(|c| CatalogKey::is_catalog_code(c))
            .map(|c| c.trim().to_ascii_uppercase());

        if id.is_none() && code.is_none() {
            tracing::debug!("ignoring catalog payload without id or code");
            return false;
        }
        if let Some(id) = id {
            self.by_id.insert(id, payload.clone());
        }
        if let Some(code) = code {
            self.by_code.insert(code, payload);
        }
        true
    }

    /// Remove every payload reachable through `key`
    pub fn remove(&mut self, key: &CatalogKey) {
        match key {
            CatalogKey::Code(code) => {
                self.by_code.remove(code);
            }
            CatalogKey::Internal(id) => {
                self.by_id.remove(id);
            }
        }
    }

    /// Number of indexed entries (ids plus codes)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_code.len()
    }

    /// Check if catalog is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_code.is_empty()
    }
}

#[async_trait]
impl CatalogBackend for InMemoryCatalog {
    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Value>, BackendError> {
        Ok(self.by_id.get(&id).cloned())
    }

    async fn query_by_code(&self, code: &str) -> Result<Option<Value>, BackendError> {
        Ok(self.by_code.get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UUID: &str = "7d444840-9dc0-11d1-b245-5ffdce74fad2";

    #[tokio::test]
    async fn routes_by_key_shape() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert(json!({"id": UUID, "asin": "b07xj8c8f5", "title": "Kettle"}));

        let by_code = fetch(&catalog, &CatalogKey::parse("B07XJ8C8F5").unwrap()).await.unwrap();
        let by_id = fetch(&catalog, &CatalogKey::parse(UUID).unwrap()).await.unwrap();
        assert_eq!(by_code, by_id);
        assert!(by_code.is_some());
    }

    #[test]
    fn from_json_requires_array() {
        assert!(InMemoryCatalog::from_json_str("{}").is_err());
        assert!(InMemoryCatalog::from_json_str("not json").is_err());

        let catalog = InMemoryCatalog::from_json_str(r#"[{"asin": "B07XJ8C8F5", "title": "Kettle"}, {"title": "orphan"}]"#).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn remove_by_key() {
        let mut catalog = InMemoryCatalog::new();
        catalog.insert(json!({"asin": "B07XJ8C8F5", "title": "Kettle"}));
        let key = CatalogKey::parse("B07XJ8C8F5").unwrap();
        catalog.remove(&key);
        assert_eq!(fetch(&catalog, &key).await.unwrap(), None);
        assert!(catalog.is_empty());
    }
}
