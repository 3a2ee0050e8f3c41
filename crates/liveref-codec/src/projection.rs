//! Field projection attributes

use crate::attr::{private, AttrDefault, AttrKind, AttrSpec, AttrValue, NodeAttrs};
use crate::error::AttrError;
use serde::{Deserialize, Serialize};

/// Attributes of a field projection node: one field of one entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldProjectionAttrs {
    /// Referenced entity (internal id or catalog code)
    pub entity_id: String,
    /// Field registry key; checked only at render time
    pub field_id: String,
}

impl FieldProjectionAttrs {
    /// Create attributes for `field_id` of `entity_id`
    #[must_use]
    pub fn new(entity_id: impl Into<String>, field_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            field_id: field_id.into(),
        }
    }
}

const PROJECTION_SPECS: &[AttrSpec] = &[
    AttrSpec {
        name: "entityId",
        key: "data-entity-id",
        aliases: &["data-product-id"],
        kind: AttrKind::Text,
        default: AttrDefault::Text(""),
    },
    AttrSpec {
        name: "fieldId",
        key: "data-field-id",
        aliases: &["data-field"],
        kind: AttrKind::Text,
        default: AttrDefault::Text(""),
    },
];

impl private::Sealed for FieldProjectionAttrs {}

impl NodeAttrs for FieldProjectionAttrs {
    const SPECS: &'static [AttrSpec] = PROJECTION_SPECS;

    fn get(&self, name: &str) -> AttrValue {
        match name {
            "entityId" => AttrValue::Text(self.entity_id.clone()),
            "fieldId" => AttrValue::Text(self.field_id.clone()),
            _ => AttrValue::Null,
        }
    }

    fn set(&mut self, name: &str, value: AttrValue) -> Result<(), AttrError> {
        match name {
            "entityId" => self.entity_id = value.into_text(name)?.unwrap_or_default(),
            "fieldId" => self.field_id = value.into_text(name)?.unwrap_or_default(),
            _ => return Err(AttrError::UnknownAttribute(name.to_string())),
        }
        Ok(())
    }
}
