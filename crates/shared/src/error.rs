//! Shared error types

use thiserror::Error;

/// Errors raised while loading environment-driven configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    /// Read a required environment variable
    pub fn require(var: &'static str) -> Result<String, ConfigError> {
        std::env::var(var).map_err(|_| ConfigError::Missing(var))
    }
}
