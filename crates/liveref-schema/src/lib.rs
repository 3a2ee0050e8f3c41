//! liveref Reference Node Schema
//!
//! The two reference node kinds, their persisted markup, and the document
//! commands the host editor calls.
//!
//! # Architecture
//!
//! ```text
//! persisted markup ──parse_pieces──▶ Document ──to_markup──▶ persisted markup
//!                                      │
//!                    insert_entity_reference / insert_field_projection
//!                    update_attributes (attribute patch)
//! ```
//!
//! # Example
//!
//! ```rust
//! use liveref_schema::{Document, PartialAttrs};
//!
//! let mut doc = Document::from_markup("<p>Our pick: </p>");
//! doc.set_cursor(0);
//! let mut attrs = PartialAttrs::new();
//! attrs.insert("id".to_string(), "B07XJ8C8F5".into());
//! doc.insert_entity_reference(attrs).unwrap();
//!
//! assert!(doc.to_markup().starts_with(r#"<span data-type="entity-reference""#));
//! ```

#![deny(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod markup;
pub mod node;

pub use document::{merge_partial, Document, Inline, PartialAttrs};
pub use error::{SchemaError, SchemaResult};
pub use markup::{parse_node, parse_pieces, serialize_node};
pub use node::{NodeKind, NodeSpec, ReferenceNode, DISCRIMINATOR, ELEMENT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
