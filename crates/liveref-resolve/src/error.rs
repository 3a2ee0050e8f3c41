//! Error types for entity resolution
//!
//! Nothing in this crate panics or throws past [`EntityResolver::resolve`];
//! every failure surfaces as a [`ResolutionError`] value.
//!
//! [`EntityResolver::resolve`]: crate::EntityResolver::resolve

/// Errors reported by a catalog backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Transport failed (connection refused, DNS, TLS, ...)
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// Backend call exceeded its own timeout
    #[error("catalog request timed out")]
    Timeout,

    /// Backend answered with a non-success status
    #[error("catalog rejected request ({status}): {message}")]
    Rejected {
        /// Status code
        status: u16,
        /// Backend message
        message: String,
    },
}

impl BackendError {
    /// Create rejection error
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

/// Errors resolving an identifier to a live entity
///
/// Cloneable: every caller waiting on one in-flight request receives the
/// same error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// Identifier is neither an internal id nor a catalog code
    #[error("unrecognized identifier: '{0}'")]
    UnrecognizedIdentifier(String),

    /// Backend returned no entity for the identifier
    #[error("entity not found: {0}")]
    NotFound(String),

    /// Backend call failed
    #[error("backend error for {key}: {source}")]
    Backend {
        /// Key that was being resolved
        key: String,
        /// Backend failure
        #[source]
        source: BackendError,
    },

    /// Backend payload could not be normalized
    #[error("malformed payload for {key}: {reason}")]
    MalformedPayload {
        /// Key that was being resolved
        key: String,
        /// What made the payload unusable
        reason: String,
    },
}

impl ResolutionError {
    /// Create backend error for key
    pub fn backend(key: impl ToString, source: BackendError) -> Self {
        Self::Backend {
            key: key.to_string(),
            source,
        }
    }

    /// Create malformed payload error for key
    pub fn malformed(key: impl ToString, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for resolution
pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_display() {
        let err = BackendError::rejected(503, "maintenance");
        assert_eq!(err.to_string(), "catalog rejected request (503): maintenance");
    }

    #[test]
    fn resolution_error_display() {
        let err = ResolutionError::UnrecognizedIdentifier("???".to_string());
        assert_eq!(err.to_string(), "unrecognized identifier: '???'");

        let err = ResolutionError::backend("code:B07XJ8C8F5", BackendError::Timeout);
        assert_eq!(
            err.to_string(),
            "backend error for code:B07XJ8C8F5: catalog request timed out"
        );
    }

    #[test]
    fn errors_are_cloneable_and_comparable() {
        let err = ResolutionError::malformed("id:x", "missing title");
        assert_eq!(err.clone(), err);
    }
}
