pub mod anthropic;
pub mod bedrock;
pub mod provider;

pub use anthropic::AnthropicProvider;
pub use bedrock::BedrockProvider;
pub use provider::{ChatRequest, ChatResponse, LlmProvider, Message, ProviderError, Role};
