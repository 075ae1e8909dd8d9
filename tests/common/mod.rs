//! Test doubles for the hosted services used by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Map;
use taxrag::embeddings::Embedder;
use taxrag::index::VectorIndex;
use taxrag::llm::ChatMessage;
use taxrag::llm::ChatModel;
use taxrag::llm::StreamingResponse;
use taxrag::rag::RagService;
use taxrag::rag::RetrievedPassage;
use taxrag::AppConfig;
use taxrag::Result;
use taxrag::TaxRagError;

/// Chat model whose rewrite echoes the question line of the prompt
/// and whose answer is a fixed list of fragments
pub struct StubChatModel {
    fragments: Vec<String>,
    fail_after: Option<usize>,
    streamed: Mutex<Vec<Vec<ChatMessage>>>,
}

impl StubChatModel {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| (*f).to_string()).collect(),
            fail_after: None,
            streamed: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn streamed(&self) -> Vec<Vec<ChatMessage>> {
        self.streamed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for StubChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let prompt = &messages[0].content;
        let question = prompt
            .lines()
            .find_map(|line| line.strip_prefix("질문: "))
            .unwrap_or_default();
        Ok(question.to_string())
    }

    async fn stream(&self, messages: &[ChatMessage]) -> Result<StreamingResponse> {
        self.streamed.lock().unwrap().push(messages.to_vec());

        let mut items: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        if let Some(n) = self.fail_after {
            items.truncate(n);
            items.push(Err(TaxRagError::LlmError("upstream closed".to_string())));
        }
        Ok(StreamingResponse::from_stream(futures::stream::iter(items)))
    }
}

pub struct StubEmbedder;

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(vec![text.chars().count() as f32, 1.0])
    }
}

/// Index with known scored documents
pub struct StubIndex {
    documents: Vec<(String, f32)>,
}

impl StubIndex {
    pub fn new(documents: &[(&str, f32)]) -> Self {
        Self {
            documents: documents
                .iter()
                .map(|(text, score)| ((*text).to_string(), *score))
                .collect(),
        }
    }
}

#[async_trait]
impl VectorIndex for StubIndex {
    async fn query(&self, _vector: Vec<f32>, _top_k: usize) -> Result<Vec<RetrievedPassage>> {
        Ok(self
            .documents
            .iter()
            .map(|(text, score)| RetrievedPassage::new(text.clone(), Map::new(), *score))
            .collect())
    }
}

pub fn rag_service(model: Arc<StubChatModel>, documents: &[(&str, f32)]) -> RagService {
    // Only the first test in the binary installs the subscriber
    let _ = taxrag::logging::init_simple_logging();
    RagService::from_parts(
        model,
        Arc::new(StubEmbedder),
        Arc::new(StubIndex::new(documents)),
        &AppConfig::default(),
    )
}
