//! Error types for the zonesync system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the zonesync system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Domain or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entry set rejected by the registrar
    #[error("Validation failed: {0}")]
    Validation(String),

    /// WAN address source errors
    #[error("Address source error: {0}")]
    AddressSource(String),

    /// Registrar-specific error
    #[error("Registrar error ({registrar}): {message}")]
    Registrar {
        /// Registrar name
        registrar: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an address source error
    pub fn address_source(msg: impl Into<String>) -> Self {
        Self::AddressSource(msg.into())
    }

    /// Create a registrar-specific error
    pub fn registrar(registrar: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registrar {
            registrar: registrar.into(),
            message: message.into(),
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
