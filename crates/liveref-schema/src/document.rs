//! Host document model and commands
//!
//! The document is an ordered run of inline pieces with a cursor. Commands
//! validate first and mutate second: a command that returns an error has not
//! touched the document.

use crate::error::{SchemaError, SchemaResult};
use crate::markup::{parse_pieces, serialize_node};
use crate::node::{require, NodeKind, ReferenceNode};
use indexmap::IndexSet;
use liveref_codec::{AttrValue, EntityReferenceAttrs, FieldProjectionAttrs, NodeAttrs};
use std::collections::BTreeMap;

/// Partial attribute set supplied to insert and patch commands
///
/// Keys are in-memory attribute names (`displayStyle`).
pub type PartialAttrs = BTreeMap<String, AttrValue>;

/// One piece of a document
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Host markup, carried verbatim
    Markup(String),
    /// Reference node
    Node(ReferenceNode),
}

/// Document holding host markup and reference nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pieces: Vec<Inline>,
    cursor: usize,
}

impl Document {
    /// Create empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a persisted document; the cursor is placed at the end
    ///
    /// Never fails: whatever cannot be read as a reference node stays
    /// host markup.
    #[must_use]
    pub fn from_markup(markup: &str) -> Self {
        let pieces = parse_pieces(markup);
        let cursor = pieces.len();
        Self { pieces, cursor }
    }

    /// Serialize to persisted markup
    #[must_use]
    pub fn to_markup(&self) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Inline::Markup(raw) => raw.clone(),
                Inline::Node(node) => serialize_node(node),
            })
            .collect()
    }

    /// All pieces in order
    #[inline]
    #[must_use]
    pub fn pieces(&self) -> &[Inline] {
        &self.pieces
    }

    /// Number of pieces
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Check if document is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Current cursor (insertion index)
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move the cursor, clamped to the document
    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index.min(self.pieces.len());
    }

    /// Reference nodes with their piece index
    pub fn references(&self) -> impl Iterator<Item = (usize, &ReferenceNode)> {
        self.pieces.iter().enumerate().filter_map(|(i, piece)| match piece {
            Inline::Node(node) => Some((i, node)),
            Inline::Markup(_) => None,
        })
    }

    /// Distinct entity identifiers referenced, in order of first appearance
    #[must_use]
    pub fn entity_ids(&self) -> IndexSet<String> {
        self.references()
            .map(|(_, node)| node.entity_id().trim().to_string())
            .collect()
    }

    /// Node at `index`, if that piece is a node
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&ReferenceNode> {
        match self.pieces.get(index) {
            Some(Inline::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// Insert host markup at the cursor
    pub fn insert_markup(&mut self, raw: impl Into<String>) -> usize {
        self.insert_at_cursor(Inline::Markup(raw.into()))
    }

    /// Insert an entity reference at the cursor
    ///
    /// `partial` is merged against the attribute allow-list: unknown keys are
    /// dropped, omitted keys take their declared defaults.
    ///
    /// # Returns
    /// Index of the inserted piece
    ///
    /// # Errors
    /// - `SchemaError::Validation` if `id` is missing or empty
    /// - `SchemaError::Attribute` if a recognized key has the wrong shape
    pub fn insert_entity_reference(&mut self, partial: PartialAttrs) -> SchemaResult<usize> {
        let attrs: EntityReferenceAttrs = merge_partial(EntityReferenceAttrs::default(), partial)?;
        require("id", &attrs.id)?;
        tracing::debug!(id = %attrs.id, style = %attrs.display_style, "inserting entity reference");
        Ok(self.insert_at_cursor(Inline::Node(ReferenceNode::EntityReference(attrs))))
    }

    /// Insert a field projection at the cursor
    ///
    /// `field_id` is not checked against any field registry; unknown fields
    /// render a raw-value fallback instead.
    ///
    /// # Errors
    /// `SchemaError::Validation` if either identifier is empty
    pub fn insert_field_projection(&mut self, entity_id: &str, field_id: &str) -> SchemaResult<usize> {
        require("entityId", entity_id)?;
        require("fieldId", field_id)?;
        let node = ReferenceNode::FieldProjection(FieldProjectionAttrs::new(entity_id, field_id));
        Ok(self.insert_at_cursor(Inline::Node(node)))
    }

    /// Patch attributes of the node at `index`
    ///
    /// This is the only path that may change a node's identifier.
    ///
    /// # Errors
    /// - `SchemaError::NoSuchPiece` / `SchemaError::WrongNodeKind` for a bad index
    /// - `SchemaError::Attribute` if a recognized key has the wrong shape
    /// - `SchemaError::Validation` if the patch would empty a required identifier
    pub fn update_attributes(&mut self, index: usize, patch: PartialAttrs) -> SchemaResult<()> {
        let current = match self.pieces.get(index) {
            Some(Inline::Node(node)) => node,
            Some(Inline::Markup(_)) => {
                return Err(SchemaError::WrongNodeKind {
                    index,
                    expected: "reference",
                })
            }
            None => return Err(SchemaError::NoSuchPiece(index)),
        };

        let updated = match current {
            ReferenceNode::EntityReference(attrs) => {
                ReferenceNode::EntityReference(merge_partial(attrs.clone(), patch)?)
            }
            ReferenceNode::FieldProjection(attrs) => {
                ReferenceNode::FieldProjection(merge_partial(attrs.clone(), patch)?)
            }
        };
        updated.validate()?;
        self.pieces[index] = Inline::Node(updated);
        Ok(())
    }

    /// Patch attributes of the node at `index`, requiring a specific kind
    ///
    /// # Errors
    /// As [`Self::update_attributes`], plus `SchemaError::WrongNodeKind`
    pub fn update_attributes_of(
        &mut self,
        kind: NodeKind,
        index: usize,
        patch: PartialAttrs,
    ) -> SchemaResult<()> {
        match self.node(index).map(ReferenceNode::kind) {
            Some(actual) if actual != kind => Err(SchemaError::WrongNodeKind {
                index,
                expected: kind.type_name(),
            }),
            _ => self.update_attributes(index, patch),
        }
    }

    /// Remove the piece at `index`
    ///
    /// # Errors
    /// `SchemaError::NoSuchPiece` if out of range
    pub fn remove(&mut self, index: usize) -> SchemaResult<Inline> {
        if index >= self.pieces.len() {
            return Err(SchemaError::NoSuchPiece(index));
        }
        if index < self.cursor {
            self.cursor -= 1;
        }
        Ok(self.pieces.remove(index))
    }

    fn insert_at_cursor(&mut self, piece: Inline) -> usize {
        let index = self.cursor;
        self.pieces.insert(index, piece);
        self.cursor += 1;
        index
    }
}

/// Merge `partial` into `base` through the node kind's allow-list
///
/// Unknown keys are dropped and never persisted.
///
/// # Errors
/// `SchemaError::Attribute` if a recognized key has the wrong shape
pub fn merge_partial<A: NodeAttrs>(mut base: A, partial: PartialAttrs) -> SchemaResult<A> {
    for (name, value) in partial {
        if A::spec(&name).is_none() {
            tracing::debug!(attribute = %name, "dropping unrecognized attribute");
            continue;
        }
        base.set(&name, value)?;
    }
    Ok(base)
}
