use thiserror::Error;

/// Errors from the Slack Web API client.
#[derive(Debug, Error)]
pub enum SlackError {
    /// No bot token configured; every outbound call fails with this.
    #[error("Slack bot token is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered `ok: false`.
    #[error("Slack API {method} failed: {error}")]
    Api { method: String, error: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SlackError>;
