//! Error types for the polystore data access layer
//!
//! Driver errors are passed through unchanged so callers always see the
//! native error, never a stringified wrapper. The only exception is the
//! benign "client already closed" teardown class, which the cleanup path
//! recognizes via [`Error::is_benign_close`] and suppresses.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for polystore
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or incomplete configuration (missing "default" entry,
    /// unrecognized datastore type). Fatal, raised before any connection
    /// attempt.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid caller input (malformed page token, model data without an id)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A state the data layer treats as unreachable, e.g. a persisted
    /// instance that cannot be re-read immediately after a successful save
    #[error("Invariant violation: {0}")]
    Invariant(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error(transparent)]
    BsonSer(#[from] mongodb::bson::ser::Error),

    #[error(transparent)]
    BsonDe(#[from] mongodb::bson::de::Error),

    #[error(transparent)]
    OpenSearch(#[from] opensearch::Error),

    #[error(transparent)]
    Dynamo(#[from] aws_sdk_dynamodb::Error),

    #[error(transparent)]
    SerdeDynamo(#[from] serde_dynamo::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Check whether this error is the well-known idempotent teardown class
    /// raised by the document-store driver when its client has already been
    /// shut down. Matched by message substring; everything else re-raises
    /// during cleanup.
    pub fn is_benign_close(&self) -> bool {
        let message = self.to_string().to_ascii_lowercase();
        message.contains("operation interrupted")
            || message.contains("client is closed")
            || message.contains("been shut down")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_close_matches_interrupted_signature() {
        let err = Error::invariant("Operation interrupted because the client was closed");
        assert!(err.is_benign_close());

        let err = Error::invariant("the client is closed");
        assert!(err.is_benign_close());
    }

    #[test]
    fn test_other_errors_are_not_benign() {
        assert!(!Error::configuration("missing default entry").is_benign_close());
        assert!(!Error::invariant("row vanished after save").is_benign_close());
    }

    #[test]
    fn test_error_display() {
        let err = Error::configuration("databases configuration is missing 'default'");
        assert_eq!(
            err.to_string(),
            "Configuration error: databases configuration is missing 'default'"
        );
    }
}
