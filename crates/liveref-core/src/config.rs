//! liveref configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! cache_ttl_secs = 45
//! cache_capacity = 10000
//! render_snapshot_fallback = true
//! ```

use liveref_resolve::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but a value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// liveref configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiverefConfig {
    /// Freshness window of a resolved snapshot, in seconds
    pub cache_ttl_secs: u64,
    /// Maximum number of cached snapshots
    pub cache_capacity: u64,
    /// Render the insertion-time snapshot when resolution fails
    pub render_snapshot_fallback: bool,
}

impl LiverefConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With cache TTL in seconds
    #[inline]
    #[must_use]
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With snapshot fallback enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_snapshot_fallback(mut self, enabled: bool) -> Self {
        self.render_snapshot_fallback = enabled;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` in addition to [`Self::from_toml_str`]'s errors
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_toml_str(&raw)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` for a zero TTL or zero capacity
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache_ttl_secs must be positive".to_string()));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::Invalid("cache_capacity must be positive".to_string()));
        }
        Ok(())
    }

    /// Resolver settings derived from this configuration
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new()
            .with_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_max_capacity(self.cache_capacity)
    }
}

impl Default for LiverefConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 45,
            cache_capacity: 10_000,
            render_snapshot_fallback: true,
        }
    }
}
