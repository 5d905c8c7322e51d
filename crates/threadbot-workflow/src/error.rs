use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Slack error: {0}")]
    Slack(#[from] threadbot_slack::SlackError),

    /// The dispatched event lacks a field the workflow cannot run without.
    #[error("event is missing {0}")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
