//! LLM (Large Language Model) module
//!
//! This module talks to a hosted, OpenAI-compatible chat completions API
//! (xAI Grok by default):
//! - Chat message types shared by the prompt builders
//! - The [`ChatModel`] trait used by the RAG stages
//! - [`LlmService`], the HTTP implementation with SSE streaming
//! - Prompt templates for query rewriting and answering
//!
//! # Examples
//!
//! ```rust,no_run
//! use taxrag::config::AppConfig;
//! use taxrag::llm::{ChatMessage, ChatModel, LlmService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let llm = LlmService::new(&config)?;
//!
//!     let answer = llm.complete(&[ChatMessage::user("소득세란 무엇인가요?")]).await?;
//!     println!("{answer}");
//!
//!     Ok(())
//! }
//! ```

pub mod prompts;
pub mod service;
pub mod sse;
pub mod streaming;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

pub use prompts::PromptTemplate;
pub use prompts::TaxPrompts;
pub use service::LlmService;
pub use sse::SseDecoder;
pub use streaming::StreamingResponse;

use crate::errors::Result;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single message sent to the chat completions API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A hosted chat model
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the messages and wait for the complete response text
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Send the messages and stream the response as text fragments
    async fn stream(&self, messages: &[ChatMessage]) -> Result<StreamingResponse>;
}
