//! liveref Entity Resolution
//!
//! Turns a persisted identifier into a live, normalized catalog snapshot.
//!
//! # Architecture
//!
//! ```text
//! raw id ──CatalogKey::parse──▶ CatalogKey ──┬─ Code ────▶ query_by_code
//!                                            └─ Internal ─▶ fetch_by_id
//!                                                    │
//!                            normalize_payload ◀─────┘
//!                                    │
//!                     Cache<CatalogKey, Arc<ResolvedEntity>> (TTL, coalescing)
//! ```
//!
//! # Example
//!
//! ```rust
//! use liveref_resolve::{EntityResolver, InMemoryCatalog};
//!
//! let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! rt.block_on(async {
//!     let catalog = InMemoryCatalog::from_json_str(
//!         r#"[{"asin": "B07XJ8C8F5", "title": "Electric Kettle", "price": 29.99}]"#,
//!     ).unwrap();
//!     let resolver = EntityResolver::new(catalog);
//!     let entity = resolver.resolve("B07XJ8C8F5").await.unwrap();
//!     assert_eq!(entity.title, "Electric Kettle");
//! });
//! ```

#![deny(missing_docs)]
#![warn(unreachable_pub)]

mod backend;
mod cache;
mod entity;
mod error;
mod key;
mod normalize;

pub use backend::{CatalogBackend, InMemoryCatalog};
pub use cache::{
    CacheStats, EntityResolver, ReferenceLease, ResolverConfig, DEFAULT_CAPACITY, DEFAULT_TTL,
};
pub use entity::{FieldValue, ResolvedEntity};
pub use error::{BackendError, ResolutionError, ResolutionResult};
pub use key::CatalogKey;
pub use normalize::normalize_payload;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
