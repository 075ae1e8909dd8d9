//! RAG (Retrieval-Augmented Generation) module
//!
//! Answers income-tax questions in four ordered stages:
//! - Normalize: rewrite the question with a static synonym dictionary
//! - Retrieve: embed the rewrite and fetch the top-K passages
//! - Generate: stream an answer grounded on the passages and the session history
//! - Persist: append the user/assistant pair once the stream is drained
//!
//! # Examples
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use taxrag::config::AppConfig;
//! use taxrag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::from_config(&config).await?;
//!
//!     let mut answer = service.ask("연봉 5천만원인 직장인의 소득세는 얼마인가요?", "default");
//!     while let Some(fragment) = answer.next().await {
//!         print!("{}", fragment?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod generator;
pub mod history;
pub mod normalizer;
pub mod pipeline;
pub mod retriever;

pub use context::ContextAssembler;
pub use generator::AnswerGenerator;
pub use history::HistoryStore;
pub use history::Role;
pub use history::Session;
pub use history::Turn;
pub use normalizer::QueryNormalizer;
pub use pipeline::RagResponse;
pub use pipeline::RagService;
pub use retriever::Retriever;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// A reference passage returned by the vector index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub source_metadata: Map<String, Value>,
    pub score: f32,
}

impl RetrievedPassage {
    pub fn new(text: impl Into<String>, source_metadata: Map<String, Value>, score: f32) -> Self {
        Self {
            text: text.into(),
            source_metadata,
            score,
        }
    }
}

/// Per-request state handed from stage to stage
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub original_question: String,
    pub rewritten_question: String,
    /// Snapshot taken once when the request starts
    pub history: Vec<Turn>,
}

impl PipelineRequest {
    #[must_use]
    pub fn new(question: impl Into<String>, history: Vec<Turn>) -> Self {
        let original_question = question.into();
        Self {
            rewritten_question: original_question.clone(),
            original_question,
            history,
        }
    }
}
