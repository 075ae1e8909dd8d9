//! Query embedding module
//!
//! The document index is built out-of-band; at query time only the user's
//! (normalized) question is embedded, using the same model that produced
//! the index:
//! - OpenAI-compatible `/embeddings` servers (OpenAI, text-embeddings-inference, vLLM)
//! - Ollama (local models)
//!
//! # Examples
//!
//! ```rust,no_run
//! use taxrag::config::AppConfig;
//! use taxrag::embeddings::{EmbeddingClient, Embedder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_app_config(&config)?;
//!
//!     let embedding = client.embed("거주자의 기본공제").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

use async_trait::async_trait;
pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use crate::errors::Result;
use crate::errors::TaxRagError;

/// Turns text into a vector comparable with the index
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Configuration for query embedding
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = match config.embeddings.provider.as_str() {
            "openai" => EmbeddingProvider::OpenAI,
            "ollama" => EmbeddingProvider::Ollama,
            other => {
                return Err(TaxRagError::ConfigError(format!(
                    "unknown embeddings.provider '{other}'"
                )))
            }
        };

        Ok(Self {
            provider,
            model: config.embedding_model().to_string(),
            endpoint: config.embeddings.endpoint.trim_end_matches('/').to_string(),
            api_key: config.embeddings.api_key.clone(),
        })
    }
}
