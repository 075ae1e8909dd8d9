//! Complete RAG pipeline: Normalize -> Retrieve -> Generate -> Persist

use std::sync::Arc;

use async_stream::try_stream;
use futures::StreamExt;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::errors::Result;
use crate::errors::Stage;
use crate::errors::TaxRagError;
use crate::index::PineconeIndex;
use crate::index::VectorIndex;
use crate::llm::ChatModel;
use crate::llm::LlmService;
use crate::llm::StreamingResponse;
use crate::rag::AnswerGenerator;
use crate::rag::ContextAssembler;
use crate::rag::HistoryStore;
use crate::rag::PipelineRequest;
use crate::rag::QueryNormalizer;
use crate::rag::RetrievedPassage;
use crate::rag::Retriever;

/// Result of a fully drained exchange
#[derive(Debug, Clone, Serialize)]
pub struct RagResponse {
    pub answer: String,
    pub rewritten_question: String,
    pub passages: Vec<RetrievedPassage>,
}

struct Stages {
    normalizer: QueryNormalizer,
    retriever: Retriever,
    context_assembler: ContextAssembler,
    generator: AnswerGenerator,
}

/// An exchange whose answer is ready to stream
struct PreparedExchange {
    request: PipelineRequest,
    passages: Vec<RetrievedPassage>,
    answer: StreamingResponse,
}

impl Stages {
    async fn prepare(&self, mut request: PipelineRequest) -> Result<PreparedExchange> {
        debug!("Stage {}", Stage::Normalize);
        request.rewritten_question = self
            .normalizer
            .normalize(&request.original_question)
            .await
            .map_err(|e| TaxRagError::stage(Stage::Normalize, e))?;

        debug!("Stage {}", Stage::Retrieve);
        let passages = self
            .retriever
            .retrieve(&request.rewritten_question)
            .await
            .map_err(|e| TaxRagError::stage(Stage::Retrieve, e))?;
        let context = self.context_assembler.assemble(&passages);

        debug!("Stage {}", Stage::Generate);
        let answer = self
            .generator
            .generate(&request.original_question, &context, &request.history)
            .await
            .map_err(|e| TaxRagError::stage(Stage::Generate, e))?;

        Ok(PreparedExchange {
            request,
            passages,
            answer,
        })
    }
}

/// A failure while draining the answer; distinct once text has reached the caller
fn generation_failure(delivered: usize, err: TaxRagError) -> TaxRagError {
    if delivered == 0 {
        TaxRagError::stage(Stage::Generate, err)
    } else {
        warn!("Answer stream failed after {} fragments: {}", delivered, err);
        TaxRagError::PartialStream {
            delivered,
            message: err.to_string(),
        }
    }
}

/// Complete RAG service
///
/// Cloning is cheap; clones share the stages and the history store.
#[derive(Clone)]
pub struct RagService {
    stages: Arc<Stages>,
    history: HistoryStore,
}

impl RagService {
    /// Build every component once from configuration
    ///
    /// # Errors
    /// - `InitError` when a client cannot be built or the vector index cannot be resolved
    /// - `ConfigError` for an unknown embeddings provider
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let model: Arc<dyn ChatModel> = Arc::new(LlmService::new(config)?);
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingClient::from_app_config(config)?);
        let index: Arc<dyn VectorIndex> =
            Arc::new(PineconeIndex::connect(&config.vector_index).await?);

        info!(
            "RAG pipeline ready (model {}, top_k {})",
            config.llm_model(),
            config.top_k()
        );
        Ok(Self::from_parts(model, embedder, index, config))
    }

    /// Assemble the pipeline from existing services
    #[must_use]
    pub fn from_parts(
        model: Arc<dyn ChatModel>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        config: &AppConfig,
    ) -> Self {
        let stages = Stages {
            normalizer: QueryNormalizer::new(Arc::clone(&model), &config.normalizer.dictionary),
            retriever: Retriever::new(embedder, index, config.top_k()),
            context_assembler: ContextAssembler::new(),
            generator: AnswerGenerator::new(model, config.answer.examples.clone()),
        };

        Self {
            stages: Arc::new(stages),
            history: HistoryStore::new(),
        }
    }

    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Stream the answer to `question` within `session_id`
    ///
    /// Nothing runs until the stream is first polled. The exchange is
    /// recorded only after the last fragment has been consumed; dropping the
    /// stream early records nothing.
    pub fn ask(&self, question: &str, session_id: &str) -> StreamingResponse {
        let stages = Arc::clone(&self.stages);
        let history = self.history.clone();
        let question = question.to_string();
        let session_id = session_id.to_string();

        StreamingResponse::from_stream(try_stream! {
            info!("Question (session {}): {}", session_id, question);
            let request = PipelineRequest::new(question, history.get_or_create(&session_id));
            let PreparedExchange { request, mut answer, .. } = stages.prepare(request).await?;

            let mut full_answer = String::new();
            let mut delivered = 0;
            while let Some(fragment) = answer.next().await {
                let fragment = fragment.map_err(|e| generation_failure(delivered, e))?;
                full_answer.push_str(&fragment);
                delivered += 1;
                yield fragment;
            }

            debug!("Stage {}", Stage::Persist);
            history.append_exchange(&session_id, &request.original_question, &full_answer);
            info!("Answer: {}", full_answer);
        })
    }

    /// Run the whole exchange and return the complete answer
    ///
    /// # Errors
    /// Same stage-tagged failures as [`RagService::ask`].
    pub async fn ask_full(&self, question: &str, session_id: &str) -> Result<RagResponse> {
        info!("Question (session {}): {}", session_id, question);
        let request = PipelineRequest::new(question, self.history.get_or_create(session_id));
        let PreparedExchange {
            request,
            passages,
            mut answer,
        } = self.stages.prepare(request).await?;

        let mut full_answer = String::new();
        let mut delivered = 0;
        while let Some(fragment) = answer.next().await {
            full_answer.push_str(&fragment.map_err(|e| generation_failure(delivered, e))?);
            delivered += 1;
        }

        self.history
            .append_exchange(session_id, &request.original_question, &full_answer);
        info!("Answer: {}", full_answer);

        Ok(RagResponse {
            answer: full_answer,
            rewritten_question: request.rewritten_question,
            passages,
        })
    }
}
