//! Pinecone REST client (control plane lookup + data plane query)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::VectorIndex;
use crate::config::VectorIndexConfig;
use crate::errors::Result;
use crate::errors::TaxRagError;
use crate::rag::RetrievedPassage;

const API_KEY_HEADER: &str = "Api-Key";
const API_VERSION_HEADER: &str = "X-Pinecone-API-Version";

/// Query client for one Pinecone index
pub struct PineconeIndex {
    client: Client,
    host: String,
    api_key: String,
    api_version: String,
    namespace: String,
    text_key: String,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

impl PineconeIndex {
    /// Connect to the configured index, resolving its host when needed
    ///
    /// # Errors
    /// - `InitError` when the index does not exist or cannot be described
    pub async fn connect(config: &VectorIndexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TaxRagError::init("vector index", e.to_string()))?;

        let host = match &config.host {
            Some(host) => normalize_host(host),
            None => Self::describe_host(&client, config).await?,
        };
        info!("Using Pinecone index '{}' at {}", config.index_name, host);

        Ok(Self {
            client,
            host,
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            namespace: config.namespace.clone(),
            text_key: config.text_key.clone(),
        })
    }

    async fn describe_host(client: &Client, config: &VectorIndexConfig) -> Result<String> {
        let url = format!(
            "{}/indexes/{}",
            config.control_plane_url.trim_end_matches('/'),
            config.index_name
        );
        debug!("Describing Pinecone index: {}", url);

        let response = client
            .get(&url)
            .header(API_KEY_HEADER, &config.api_key)
            .header(API_VERSION_HEADER, &config.api_version)
            .send()
            .await
            .map_err(|e| TaxRagError::init("vector index", e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(TaxRagError::init(
                    "vector index",
                    format!("index '{}' not found", config.index_name),
                ))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(TaxRagError::init(
                    "vector index",
                    format!("describe index failed ({status}): {body}"),
                ));
            }
        }

        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| TaxRagError::init("vector index", format!("bad describe response: {e}")))?;

        if described.status.is_some_and(|s| !s.ready) {
            warn!("Pinecone index '{}' is not ready yet", config.index_name);
        }

        Ok(normalize_host(&described.host))
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<RetrievedPassage>> {
        let url = format!("{}/query", self.host);
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: &self.namespace,
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(API_VERSION_HEADER, &self.api_version)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TaxRagError::VectorIndexError(format!(
                "Pinecone query error ({status}): {error_text}"
            )));
        }

        let result: QueryResponse = response.json().await.map_err(|e| {
            TaxRagError::VectorIndexError(format!("Failed to parse query response: {e}"))
        })?;

        Ok(into_passages(result.matches, &self.text_key))
    }
}

/// Data-plane hosts are returned without a scheme
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

/// Pull the passage text out of each match's metadata; the rest stays as source metadata
fn into_passages(matches: Vec<QueryMatch>, text_key: &str) -> Vec<RetrievedPassage> {
    matches
        .into_iter()
        .filter_map(|m| {
            let mut metadata = m.metadata.unwrap_or_default();
            match metadata.remove(text_key) {
                Some(Value::String(text)) => Some(RetrievedPassage::new(text, metadata, m.score)),
                _ => {
                    warn!("Skipping match {} without a '{}' metadata field", m.id, text_key);
                    None
                }
            }
        })
        .collect()
}
