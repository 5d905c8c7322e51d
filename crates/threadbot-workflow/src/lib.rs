pub mod ack;
pub mod commands;
pub mod error;
pub mod prompt;
pub mod reply;
pub mod saga;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::Command;
pub use error::{Result, WorkflowError};
pub use saga::MentionWorkflow;
