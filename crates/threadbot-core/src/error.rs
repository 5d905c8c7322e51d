use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThreadbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown event status: {0}")]
    InvalidStatus(String),
}

pub type Result<T> = std::result::Result<T, ThreadbotError>;
