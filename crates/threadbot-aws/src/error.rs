use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwsError {
    /// No usable credentials in the environment or shared credentials file.
    #[error("AWS credentials unavailable: {0}")]
    Credentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    Url(String),
}

pub type Result<T> = std::result::Result<T, AwsError>;
