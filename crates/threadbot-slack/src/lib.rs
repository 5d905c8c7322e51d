pub mod api;
pub mod client;
pub mod directory;
pub mod error;
pub mod mention;
pub mod thread;
pub mod types;

pub use api::SlackApi;
pub use client::SlackClient;
pub use directory::UserDirectory;
pub use error::{Result, SlackError};
pub use types::{ThreadMessage, UserInfo, UserProfile};
