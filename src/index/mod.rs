//! Hosted vector index access
//!
//! The index is populated out-of-band with embedded chunks of the tax-law
//! corpus. This module only queries it.

pub mod pinecone;

use async_trait::async_trait;
pub use pinecone::PineconeIndex;

use crate::errors::Result;
use crate::rag::RetrievedPassage;

/// Nearest-neighbour search over pre-embedded passages
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` passages nearest to `vector`
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<RetrievedPassage>>;
}
