pub mod db;
pub mod dynamo;
pub mod error;
pub mod gate;
pub mod sqlite;
pub mod store;

pub use dynamo::DynamoDedupStore;
pub use error::DedupError;
pub use gate::DeduplicationGate;
pub use sqlite::SqliteDedupStore;
pub use store::{DedupStore, InsertOutcome};
