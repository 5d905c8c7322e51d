use thiserror::Error;

/// Errors that can occur during dedup store operations.
#[derive(Debug, Error)]
pub enum DedupError {
    /// A SQLite operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Signing or sending a DynamoDB request failed.
    #[error("aws error: {0}")]
    Aws(#[from] threadbot_aws::AwsError),

    /// DynamoDB answered with an error other than a failed condition.
    #[error("dynamodb error ({status}) {kind}: {message}")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    /// A stored row or response body could not be interpreted.
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Status update for an event id that has no record.
    #[error("no dedup record for event {event_id}")]
    NotFound { event_id: String },
}

pub type Result<T> = std::result::Result<T, DedupError>;
