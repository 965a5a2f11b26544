use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid payload under '{key}': {message}")]
    InvalidPayload { key: String, message: String },

    #[error("unknown plan tier: {0}")]
    UnknownTier(String),
}
