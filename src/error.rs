//! Error types for noipv6-duc.

use crate::response::ProviderOutcome;
use thiserror::Error;

/// Result type alias for noipv6-duc.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// DDNS error types.
///
/// Every variant except a transient provider status ends the update loop.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Configuration file missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No local address parsed as IPv6.
    #[error("This device does not have an IPv6 address")]
    NoAddressFound,

    /// The local address listing could not be obtained.
    #[error("Address source failed: {0}")]
    AddressSource(String),

    /// The provider answered with a token outside the known set.
    #[error("Unknown provider status: {0:?}")]
    UnrecognizedStatus(String),

    /// The provider answered with a known, non-retryable failure.
    #[error("Got provider return code: {0}")]
    ProviderFailure(ProviderOutcome),

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DdnsError {
    fn from(e: reqwest::Error) -> Self {
        DdnsError::Network(e.to_string())
    }
}

impl From<toml::de::Error> for DdnsError {
    fn from(e: toml::de::Error) -> Self {
        DdnsError::Config(e.to_string())
    }
}
