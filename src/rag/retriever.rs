//! Retrieval of reference passages for a normalized query

use std::sync::Arc;

use tracing::debug;

use super::RetrievedPassage;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::index::VectorIndex;

/// Embeds queries and fetches the nearest passages
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, top_k: usize) -> Self {
        Self {
            embedder,
            index,
            top_k,
        }
    }

    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Top-K passages for `query`, most similar first
    ///
    /// # Errors
    /// Embedding or index failures, unchanged.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedPassage>> {
        let embedding = self.embedder.embed(query).await?;
        debug!("Query embedded into {} dimensions", embedding.len());

        let mut passages = self.index.query(embedding, self.top_k).await?;
        passages.sort_by(|a, b| b.score.total_cmp(&a.score));
        passages.truncate(self.top_k);

        debug!("Retrieved {} passages", passages.len());
        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::passage;
    use crate::tests::StubEmbedder;
    use crate::tests::StubIndex;

    #[tokio::test]
    async fn test_sorted_by_score_and_truncated() {
        let embedder = Arc::new(StubEmbedder::default());
        let index = StubIndex::new(vec![
            passage("low", 0.1),
            passage("high", 0.9),
            passage("mid", 0.5),
        ]);
        let retriever = Retriever::new(embedder.clone(), Arc::new(index), 2);

        let passages = retriever.retrieve("거주자").await.unwrap();
        let texts: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["high", "mid"]);
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_equal_scores_keep_index_order() {
        let index = StubIndex::new(vec![passage("first", 0.5), passage("second", 0.5)]);
        let retriever = Retriever::new(Arc::new(StubEmbedder::default()), Arc::new(index), 5);

        let passages = retriever.retrieve("q").await.unwrap();
        assert_eq!(passages[0].text, "first");
        assert_eq!(passages[1].text, "second");
    }

    #[tokio::test]
    async fn test_index_error_propagates() {
        let retriever = Retriever::new(
            Arc::new(StubEmbedder::default()),
            Arc::new(StubIndex::failing()),
            2,
        );
        assert!(retriever.retrieve("q").await.is_err());
    }
}
