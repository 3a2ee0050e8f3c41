//! Reference node kinds
//!
//! Both kinds are atomic inline units: no editable children, selectable and
//! draggable as a whole, never split by the host editor.

use crate::error::{SchemaError, SchemaResult};
use liveref_codec::{encode, AttrBag, EntityReferenceAttrs, FieldProjectionAttrs};
use serde::Serialize;

/// Element attribute carrying the node-type discriminator
pub const DISCRIMINATOR: &str = "data-type";

/// Element name used when serializing reference nodes
pub const ELEMENT: &str = "span";

/// Kind of reference node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// One catalog entity
    EntityReference,
    /// One derived field of one catalog entity
    FieldProjection,
}

impl NodeKind {
    /// Canonical discriminator value
    #[inline]
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::EntityReference => "entity-reference",
            Self::FieldProjection => "field-projection",
        }
    }

    /// Discriminator values written by older documents
    #[inline]
    #[must_use]
    pub fn legacy_type_names(self) -> &'static [&'static str] {
        match self {
            Self::EntityReference => &["product-embed"],
            Self::FieldProjection => &["product-field"],
        }
    }

    /// Recognize a discriminator value, canonical or legacy
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        [Self::EntityReference, Self::FieldProjection]
            .into_iter()
            .find(|kind| kind.type_name() == name || kind.legacy_type_names().contains(&name))
    }

    /// Structural rules for this kind
    #[inline]
    #[must_use]
    pub fn spec(self) -> NodeSpec {
        NodeSpec::ATOMIC_INLINE
    }
}

/// Structural rules a host document applies to a node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeSpec {
    /// Participates in inline content
    pub inline: bool,
    /// Treated as a single unit by cursor motion and deletion
    pub atom: bool,
    /// Can be node-selected
    pub selectable: bool,
    /// Can be dragged as a whole
    pub draggable: bool,
    /// Has editable children
    pub has_content: bool,
    /// May be split by the host editor
    pub splittable: bool,
}

impl NodeSpec {
    /// Rules shared by every reference node kind
    pub const ATOMIC_INLINE: Self = Self {
        inline: true,
        atom: true,
        selectable: true,
        draggable: true,
        has_content: false,
        splittable: false,
    };
}

/// A reference node with its typed attributes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "attrs", rename_all = "kebab-case")]
pub enum ReferenceNode {
    /// Entity reference
    EntityReference(EntityReferenceAttrs),
    /// Field projection
    FieldProjection(FieldProjectionAttrs),
}

impl ReferenceNode {
    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::EntityReference(_) => NodeKind::EntityReference,
            Self::FieldProjection(_) => NodeKind::FieldProjection,
        }
    }

    /// Identifier of the referenced entity
    #[inline]
    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::EntityReference(attrs) => &attrs.id,
            Self::FieldProjection(attrs) => &attrs.entity_id,
        }
    }

    /// Check required identifiers
    ///
    /// # Errors
    /// `SchemaError::Validation` if a required identifier is empty
    pub fn validate(&self) -> SchemaResult<()> {
        match self {
            Self::EntityReference(attrs) => require("id", &attrs.id),
            Self::FieldProjection(attrs) => {
                require("entityId", &attrs.entity_id)?;
                require("fieldId", &attrs.field_id)
            }
        }
    }

    /// Persisted attribute bag (without the discriminator)
    #[must_use]
    pub fn encode(&self) -> AttrBag {
        match self {
            Self::EntityReference(attrs) => encode(attrs),
            Self::FieldProjection(attrs) => encode(attrs),
        }
    }
}

pub(crate) fn require(name: &str, value: &str) -> SchemaResult<()> {
    if value.trim().is_empty() {
        Err(SchemaError::missing(name))
    } else {
        Ok(())
    }
}
