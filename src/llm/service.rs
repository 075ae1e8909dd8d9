//! HTTP client for OpenAI-compatible chat completions (xAI Grok)

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tokio::time::timeout;
use tracing::debug;
use tracing::warn;

use super::sse::SseDecoder;
use super::ChatMessage;
use super::ChatModel;
use super::StreamingResponse;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::TaxRagError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Chat completions client
///
/// `request_timeout` bounds a whole blocking completion. Streams have no
/// overall limit; it bounds the wait for each next chunk instead.
#[derive(Clone)]
pub struct LlmService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    request_timeout: Duration,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl LlmService {
    /// Create a new LLM service from application config
    ///
    /// # Errors
    /// - HTTP client build errors (invalid TLS/proxy configuration)
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| TaxRagError::init("LLM client", e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.llm_endpoint().trim_end_matches('/').to_string(),
            api_key: config.llm_key().to_string(),
            model: config.llm_model().to_string(),
            request_timeout: Duration::from_secs(config.llm.request_timeout_secs),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, messages: &[ChatMessage], stream: bool) -> Result<reqwest::Response> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!(
            "Calling chat completions: {} (model {}, {} messages, stream={})",
            url,
            self.model,
            messages.len(),
            stream
        );

        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut builder = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request);
        if stream {
            builder = builder.header(header::ACCEPT, "text/event-stream");
        } else {
            builder = builder.timeout(self.request_timeout);
        }

        // Bounds the wait for response headers in both modes
        let response = timeout(self.request_timeout, builder.send())
            .await
            .map_err(|_| idle_timeout_error(self.request_timeout))??;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TaxRagError::LlmError(format!(
                "LLM API error ({status}): {error_text}"
            )));
        }

        Ok(response)
    }
}

fn idle_timeout_error(limit: Duration) -> TaxRagError {
    TaxRagError::LlmError(format!(
        "No data from LLM API within {}s",
        limit.as_secs()
    ))
}

/// Extract the text delta of one streamed chunk
fn chunk_text(frame: &super::sse::SseFrame) -> Result<Option<String>> {
    let chunk: ChatCompletionChunk = frame.parse()?;
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty()))
}

#[async_trait]
impl ChatModel for LlmService {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self.send(messages, false).await?;

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TaxRagError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| TaxRagError::LlmError("No content in response".to_string()))
    }

    async fn stream(&self, messages: &[ChatMessage]) -> Result<StreamingResponse> {
        let response = self.send(messages, true).await?;
        let mut bytes = response.bytes_stream();
        let idle_limit = self.request_timeout;

        let stream = try_stream! {
            let mut decoder = SseDecoder::new();
            let mut done = false;

            loop {
                let next = timeout(idle_limit, bytes.next())
                    .await
                    .map_err(|_| idle_timeout_error(idle_limit))?;
                let Some(chunk) = next else {
                    break;
                };
                let chunk = chunk
                    .map_err(|e| TaxRagError::LlmError(format!("Stream error: {e}")))?;

                for frame in decoder.push(&chunk)? {
                    if frame.is_done() {
                        done = true;
                        break;
                    }
                    if let Some(text) = chunk_text(&frame)? {
                        yield text;
                    }
                }
                if done {
                    break;
                }
            }

            if !done {
                if let Some(frame) = decoder.finish()? {
                    if !frame.is_done() {
                        if let Some(text) = chunk_text(&frame)? {
                            yield text;
                        }
                    }
                }
                warn!("Answer stream ended without a [DONE] marker");
            }
        };

        Ok(StreamingResponse::from_stream(stream))
    }
}
