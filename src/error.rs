//! Error types for the Shadow dialogue core

use thiserror::Error;

/// Result type alias for Shadow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or running the dialogue core
///
/// Only loading and configuration paths return these. The per-utterance
/// path recovers locally and always produces a textual response.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Language pack failed validation
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Template references a placeholder with no value
    #[error("missing template parameter: {0}")]
    Template(String),

    /// Generative fallback failed
    #[error("fallback error: {0}")]
    Fallback(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
