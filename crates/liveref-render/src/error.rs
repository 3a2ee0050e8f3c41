//! Error types for presentation

/// Errors extending the field registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Field id already registered, possibly under another category
    #[error("field '{0}' is already registered")]
    DuplicateField(String),

    /// Field id is empty
    #[error("field id must not be empty")]
    EmptyFieldId,
}

/// Errors raised by a single field formatter
///
/// Never escapes the field it was raised for; the presenter falls back to
/// the raw value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// Value has a shape the formatter does not handle
    #[error("{formatter} cannot format {value}")]
    Unsupported {
        /// Formatter name
        formatter: &'static str,
        /// Rejected value, as text
        value: String,
    },

    /// Value has the right shape but unusable content
    #[error("invalid value for {formatter}: {reason}")]
    Invalid {
        /// Formatter name
        formatter: &'static str,
        /// What made the value unusable
        reason: String,
    },
}

impl FormatError {
    /// Create unsupported-shape error
    pub fn unsupported(formatter: &'static str, value: impl ToString) -> Self {
        Self::Unsupported {
            formatter,
            value: value.to_string(),
        }
    }

    /// Create invalid-content error
    pub fn invalid(formatter: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            formatter,
            reason: reason.into(),
        }
    }
}

/// Result type alias for formatters
pub type FormatResult = Result<String, FormatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            RegistryError::DuplicateField("price".to_string()).to_string(),
            "field 'price' is already registered"
        );
        assert_eq!(
            FormatError::unsupported("price", "true").to_string(),
            "price cannot format true"
        );
    }
}
