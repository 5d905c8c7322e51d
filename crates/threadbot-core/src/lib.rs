pub mod config;
pub mod error;
pub mod types;

pub use error::{Result, ThreadbotError};
pub use types::{
    DedupRecord, DispatchPayload, EventStatus, InboundEvent, Mention, TaskAction, APP_MENTION,
    EVENT_CALLBACK,
};
