//! Error types for attribute access

/// Errors writing an attribute through [`NodeAttrs::set`](crate::NodeAttrs::set)
///
/// Decoding never produces these: malformed persisted values fall back to
/// their declared defaults instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttrError {
    /// Attribute name not declared for this node kind
    #[error("unknown attribute: '{0}'")]
    UnknownAttribute(String),

    /// Value shape does not match the declared kind
    #[error("attribute '{name}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Attribute name
        name: String,
        /// Declared value kind
        expected: &'static str,
        /// Kind of the rejected value
        actual: &'static str,
    },

    /// Text value outside a closed choice set
    #[error("attribute '{name}' does not accept '{value}'")]
    InvalidChoice {
        /// Attribute name
        name: String,
        /// Rejected text
        value: String,
    },
}

impl AttrError {
    /// Create type mismatch error
    pub fn type_mismatch(name: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    /// Create invalid choice error
    pub fn invalid_choice(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidChoice {
            name: name.into(),
            value: value.into(),
        }
    }
}
