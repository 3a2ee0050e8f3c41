//! liveref Attribute Codec
//!
//! Typed attribute sets for the two reference node kinds and their
//! bidirectional mapping to a persisted markup attribute bag.
//!
//! # Core Concepts
//!
//! - [`NodeAttrs`]: typed attribute set backed by a static [`AttrSpec`] table
//! - [`EntityReferenceAttrs`]: one catalog entity plus an insertion-time snapshot
//! - [`FieldProjectionAttrs`]: one field of one entity
//! - [`encode`] / [`decode`]: default-suppressing, legacy-tolerant codec
//!
//! # Example
//!
//! ```rust
//! use liveref_codec::{decode, encode, Alignment, EntityReferenceAttrs};
//!
//! let attrs = EntityReferenceAttrs::new("B07XJ8C8F5").with_alignment(Alignment::Center);
//! let bag = encode(&attrs);
//! assert_eq!(bag.get("data-alignment").map(String::as_str), Some("center"));
//!
//! let back: EntityReferenceAttrs = decode(&bag);
//! assert_eq!(back, attrs);
//! ```

#![deny(missing_docs)]
#![warn(unreachable_pub)]

mod attr;
mod codec;
mod entity;
mod error;
mod projection;

pub use attr::{AttrBag, AttrDefault, AttrKind, AttrSpec, AttrValue, NodeAttrs};
pub use codec::{decode, encode, normalize, parse_bool, parse_number};
pub use entity::{Alignment, CouponType, DisplayStyle, EntityReferenceAttrs};
pub use error::AttrError;
pub use projection::FieldProjectionAttrs;

/// Sealed trait support
#[doc(hidden)]
pub mod __private {
    pub use super::attr::private::Sealed;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
