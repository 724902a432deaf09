//! Error types for Cherry

use std::path::PathBuf;

/// Result type alias using Cherry's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Message carried by [`Error::TokenNotFound`].
pub const TOKEN_NOT_FOUND_MESSAGE: &str =
    "Some of the tokens in text never appear in training data";

/// Core error type for Cherry operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input shares no token with the trained vocabulary
    #[error("Some of the tokens in text never appear in training data")]
    TokenNotFound,

    /// A cached artifact does not exist
    #[error("cache artifact not found: {}", path.display())]
    CacheNotFound { path: PathBuf },

    /// A cached artifact decoded but is not usable
    #[error("invalid artifact: {0}")]
    Artifact(String),

    /// Vectorizer errors
    #[error("vectorizer error: {0}")]
    Vectorizer(String),

    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    /// Create a new vectorizer error
    pub fn vectorizer(msg: impl Into<String>) -> Self {
        Self::Vectorizer(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error is the vocabulary-miss translation
    pub fn is_token_not_found(&self) -> bool {
        matches!(self, Self::TokenNotFound)
    }
}
