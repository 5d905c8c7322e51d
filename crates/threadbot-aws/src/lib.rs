//! Minimal AWS plumbing shared by the DynamoDB dedup store and the Bedrock
//! model provider: credential resolution and SigV4 request signing.

pub mod client;
pub mod credentials;
pub mod error;
pub mod sigv4;

pub use client::AwsClient;
pub use credentials::AwsCredentials;
pub use error::{AwsError, Result};
pub use sigv4::SigV4Signer;
