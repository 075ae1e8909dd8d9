//! Shared test doubles for the hosted services (no network)

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Map;

use crate::embeddings::Embedder;
use crate::index::VectorIndex;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::llm::StreamingResponse;
use crate::rag::RetrievedPassage;
use crate::Result;
use crate::TaxRagError;

pub fn passage(text: &str, score: f32) -> RetrievedPassage {
    RetrievedPassage::new(text, Map::new(), score)
}

/// Chat model answering `complete` with a fixed rewrite and `stream` with fixed fragments
pub struct ScriptedChatModel {
    rewrite: String,
    fragments: Vec<String>,
    fail_after: Option<usize>,
    fail_complete: bool,
    streamed: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedChatModel {
    pub fn new(rewrite: &str, fragments: Vec<&str>) -> Self {
        Self {
            rewrite: rewrite.to_string(),
            fragments: fragments.into_iter().map(str::to_string).collect(),
            fail_after: None,
            fail_complete: false,
            streamed: Mutex::new(Vec::new()),
        }
    }

    /// Error out of the answer stream after `n` fragments
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn failing_rewrite(mut self) -> Self {
        self.fail_complete = true;
        self
    }

    /// Messages of every `stream` call so far
    pub fn streamed(&self) -> Vec<Vec<ChatMessage>> {
        self.streamed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        if self.fail_complete {
            return Err(TaxRagError::LlmError("rewrite unavailable".to_string()));
        }
        Ok(self.rewrite.clone())
    }

    async fn stream(&self, messages: &[ChatMessage]) -> Result<StreamingResponse> {
        self.streamed.lock().unwrap().push(messages.to_vec());

        let mut items: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(TaxRagError::LlmError("connection reset".to_string())));
        }
        Ok(StreamingResponse::from_stream(futures::stream::iter(items)))
    }
}

/// Embedder returning a constant vector
#[derive(Default)]
pub struct StubEmbedder {
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.1, 0.2, 0.3])
    }
}

/// Index returning fixed passages regardless of the query
pub struct StubIndex {
    passages: Vec<RetrievedPassage>,
    fail: bool,
}

impl StubIndex {
    pub fn new(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            passages: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl VectorIndex for StubIndex {
    async fn query(&self, _vector: Vec<f32>, _top_k: usize) -> Result<Vec<RetrievedPassage>> {
        if self.fail {
            return Err(TaxRagError::VectorIndexError("index unavailable".to_string()));
        }
        Ok(self.passages.clone())
    }
}
