//! # ticket-talk
//!
//! An interactive console chat with an LLM that can look up tickets in a
//! Jira-style tracker while it answers.
//!
//! The pieces, from the bottom up:
//!
//! - [`tracker`]: read-only search against the tracker's REST API
//! - [`llm`]: message types, the streaming gateway, the broker that runs
//!   tool calls, the bounded conversation history and the tracker tools
//! - [`command`]: classification of input lines into prompts and slash commands
//! - [`session`]: the chat loop tying it all together
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ticket_talk::prelude::*;
//!
//! let gateway = Arc::new(AzureOpenAIGateway::new(AzureOpenAIConfig::from_env()?)?);
//! let tracker = Arc::new(TrackerClient::new("https://jira.example.com", "dana", "token")?);
//! let broker = LlmBroker::new("gpt-4o", gateway);
//!
//! let mut session = ChatSession::new(
//!     broker,
//!     ticket_tools(tracker),
//!     Settings::default(),
//!     Box::new(JsonFileConfigStore::default_location()?),
//!     Console::stdout(),
//! );
//! session.run(&mut ReadlineSource::new()?).await?;
//! ```

pub mod build_info;
pub mod command;
pub mod console;
pub mod error;
pub mod llm;
pub mod session;
pub mod settings;
pub mod tracker;

pub use error::{Result, TicketTalkError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::console::{Console, LineSource, ReadlineSource};
    pub use crate::error::{Result, TicketTalkError};
    pub use crate::llm::gateways::{AzureOpenAIConfig, AzureOpenAIGateway};
    pub use crate::llm::tools::ticket_tools;
    pub use crate::llm::{
        CompletionConfig, ConversationHistory, LlmBroker, LlmGateway, LlmMessage, LlmTool,
        MessageRole,
    };
    pub use crate::session::ChatSession;
    pub use crate::settings::{ConfigStore, JsonFileConfigStore, Settings};
    pub use crate::tracker::{TicketResult, TrackerClient};
}
