pub mod azure_openai;
pub mod openai_messages_adapter;

pub use azure_openai::{AzureOpenAIConfig, AzureOpenAIGateway};
