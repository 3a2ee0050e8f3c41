//! liveref
//!
//! Live catalog references embedded in rich-text documents: the persisted
//! node format, resolution against a catalog backend, and presentation.
//!
//! # Architecture
//!
//! ```text
//! liveref-codec ──▶ liveref-schema ──┐
//!       │                            ├──▶ liveref-render ──▶ liveref-core
//!       └─────────▶ liveref-resolve ─┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use liveref_core::{DocumentRenderer, InMemoryCatalog, LiverefConfig};
//!
//! let catalog = InMemoryCatalog::from_json_str(
//!     r#"[{"asin": "B07XJ8C8F5", "title": "Electric Kettle", "price": 29.99}]"#,
//! ).unwrap();
//! let renderer = DocumentRenderer::new(catalog, &LiverefConfig::default());
//!
//! let markup = r#"<p><span data-type="entity-reference" data-id="B07XJ8C8F5"></span></p>"#;
//! let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
//! let output = rt.block_on(renderer.render(markup));
//! assert!(output.html.contains("Electric Kettle"));
//! ```

#![deny(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod error;
mod renderer;

pub use config::{ConfigError, LiverefConfig};
pub use error::{CoreError, CoreResult};
pub use renderer::{inspect, DocumentRenderer, NodeSummary, RenderOutput, RenderReport};

pub use liveref_codec::{Alignment, CouponType, DisplayStyle, EntityReferenceAttrs, FieldProjectionAttrs};
pub use liveref_render::{FieldCategory, FieldDef, FieldRegistry, Presenters, ReferenceView, ViewState};
pub use liveref_resolve::{
    BackendError, CatalogBackend, CatalogKey, EntityResolver, InMemoryCatalog, ResolutionError, ResolvedEntity,
    ResolverConfig,
};
pub use liveref_schema::{Document, PartialAttrs, ReferenceNode};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
