//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid page origin: {0}")]
    InvalidOrigin(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid config value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error("missing payload for {0}")]
    MissingPayload(String),
}

/// Client result type.
pub type Result<T> = std::result::Result<T, ClientError>;
