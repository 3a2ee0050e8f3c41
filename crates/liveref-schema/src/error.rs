//! Error types for the node schema
//!
//! Provides error handling for:
//! - Command validation (rejected before the document is touched)
//! - Attribute writes with the wrong value shape
//! - Pieces addressed by a bad index or of the wrong kind

use liveref_codec::AttrError;

/// Errors from document commands
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Required identifier missing or empty
    #[error("validation failed: {0}")]
    Validation(String),

    /// Attribute value rejected by the node kind
    #[error("attribute error: {0}")]
    Attribute(#[from] AttrError),

    /// Index does not address a piece of the document
    #[error("no document piece at index {0}")]
    NoSuchPiece(usize),

    /// Piece exists but is not the expected node kind
    #[error("piece {index} is not a {expected} node")]
    WrongNodeKind {
        /// Piece index
        index: usize,
        /// Node type name the command needs
        expected: &'static str,
    },
}

impl SchemaError {
    /// Create validation error for an empty required attribute
    pub fn missing(name: &str) -> Self {
        Self::Validation(format!("'{name}' is required and must not be empty"))
    }
}

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_display() {
        let err = SchemaError::missing("id");
        assert_eq!(
            err.to_string(),
            "validation failed: 'id' is required and must not be empty"
        );
    }

    #[test]
    fn attribute_error_conversion() {
        let err: SchemaError = AttrError::UnknownAttribute("x".to_string()).into();
        assert!(matches!(err, SchemaError::Attribute(_)));
    }
}
