//! liveref Presentation
//!
//! Maps a reference node plus its resolution state to an HTML fragment.
//!
//! # Core Concepts
//!
//! - [`EntityPresenter`]: display style table with per-style skeletons,
//!   an unavailable fragment, and a stale snapshot fallback
//! - [`FieldRegistry`]: projectable fields by category, each with a formatter
//! - [`FieldPresenter`]: formatter calls contained per field, three placeholders
//! - [`ReferenceView`]: mounted node with its own `Loading | Ready | Failed` state
//!
//! Nothing here returns an error or panics past a node boundary: every
//! failure renders as a stable placeholder.

#![deny(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod field;
pub mod html;
mod presenter;
mod registry;
mod state;
mod view;

pub use error::{FormatError, FormatResult, RegistryError};
pub use field::{FieldPresenter, ABSENT_PLACEHOLDER, ERROR_PLACEHOLDER, LOADING_PLACEHOLDER};
pub use presenter::{unavailable, EntityPresenter, Freshness, SkeletonRenderer, StyleRenderer, STALE_CLASS, UNAVAILABLE_TEXT};
pub use registry::{FieldCategory, FieldDef, FieldRegistry, Formatter};
pub use state::ViewState;
pub use view::{Presenters, ReferenceView};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
