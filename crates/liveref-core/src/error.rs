//! Error types for the liveref facade

use crate::config::ConfigError;
use liveref_render::RegistryError;
use liveref_schema::SchemaError;

/// Facade errors
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Persisted markup or a document command was rejected
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Field registry extension was rejected
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type alias for the facade
pub type CoreResult<T> = Result<T, CoreError>;
