use thiserror::Error;

/// Validation and contract errors exposed by `sociostat-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("handle cannot be empty")]
    EmptyHandle,
    #[error("handle length {len} exceeds max {max}")]
    HandleTooLong { len: usize, max: usize },
    #[error("handle contains invalid character '{ch}' at index {index}")]
    HandleInvalidChar { ch: char, index: usize },

    #[error("invalid platform '{value}', expected one of tiktok, twitter, twitch")]
    InvalidPlatform { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("platform list must contain at least one platform")]
    EmptyPlatformList,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
