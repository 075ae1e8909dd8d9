use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

/// Environment variable holding the xAI (Grok) API key
pub const ENV_LLM_KEY: &str = "XAI_API_KEY";
/// Environment variable holding the Pinecone API key
pub const ENV_VECTOR_INDEX_KEY: &str = "PINECONE_API_KEY";
pub const ENV_VECTOR_INDEX_HOST: &str = "PINECONE_INDEX_HOST";
pub const ENV_EMBEDDING_KEY: &str = "EMBEDDING_API_KEY";
pub const ENV_LLM_MODEL: &str = "TAXRAG_LLM_MODEL";

pub const CONFIG_FILE: &str = "config.toml";
pub const EXAMPLE_CONFIG_FILE: &str = "config.example.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Also write a daily rolling log file under `log_dir`
    pub file_output: bool,
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_output: true,
            log_dir: "logs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub llm_endpoint: String,
    #[serde(skip_serializing)]
    pub llm_key: String,
    pub llm_model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: u64,
}

fn default_llm_model() -> String {
    "grok-4-1-fast-reasoning".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_endpoint: "https://api.x.ai/v1".to_string(),
            llm_key: String::new(),
            llm_model: default_llm_model(),
            temperature: None,
            max_tokens: None,
            request_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingsConfig {
    /// `openai` (any OpenAI-compatible `/embeddings` server) or `ollama`
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint: "http://localhost:8080/v1".to_string(),
            model: "Qwen/Qwen3-Embedding-0.6B".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorIndexConfig {
    pub index_name: String,
    /// Data-plane host; resolved from `index_name` when absent
    pub host: Option<String>,
    pub namespace: String,
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Number of passages retrieved per question
    pub top_k: usize,
    /// Metadata key that holds the passage text
    pub text_key: String,
    pub control_plane_url: String,
    pub api_version: String,
}

fn default_top_k() -> usize {
    2
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            index_name: "tax-markdown-index".to_string(),
            host: None,
            namespace: String::new(),
            api_key: String::new(),
            top_k: default_top_k(),
            text_key: "text".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2025-01".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Phrase substitution rules, e.g. `사람을 나타내는 표현 -> 거주자`
    pub dictionary: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            dictionary: vec!["사람을 나타내는 표현 -> 거주자".to_string()],
        }
    }
}

/// Worked question/answer pair included in the answer prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub input: String,
    pub answer: String,
}

impl FewShotExample {
    pub fn new(input: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub examples: Vec<FewShotExample>,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            examples: vec![
                FewShotExample::new(
                    "소득은 어떻게 구분되나요?",
                    "소득세법 제4조(소득의 구분)에 따르면 거주자의 소득은 종합소득, 퇴직소득, 양도소득으로 구분합니다. \
                     종합소득에는 이자소득, 배당소득, 사업소득, 근로소득, 연금소득, 기타소득이 포함됩니다.",
                ),
                FewShotExample::new(
                    "소득세의 과세 기간은 어떻게 되나요?",
                    "소득세법 제5조(과세기간)에 따르면 소득세의 과세기간은 1월 1일부터 12월 31일까지 1년입니다. \
                     다만 거주자가 사망한 경우에는 1월 1일부터 사망한 날까지, 출국하는 경우에는 출국한 날까지입니다.",
                ),
                FewShotExample::new(
                    "근로소득 원천징수영수증은 언제까지 발급해야 하나요?",
                    "소득세법 제143조(근로소득에 대한 원천징수영수증의 발급)에 따르면 원천징수의무자는 \
                     해당 과세기간의 다음 연도 2월 말일까지 근로소득자에게 원천징수영수증을 발급해야 합니다.",
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub default_session: String,
    /// Number of messages kept in the on-screen transcript
    pub max_display_messages: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_session: "default".to_string(),
            max_display_messages: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub embeddings: EmbeddingsConfig,
    pub vector_index: VectorIndexConfig,
    pub normalizer: NormalizerConfig,
    pub answer: AnswerConfig,
    pub chat: ChatConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default config file path, then apply `.env`
    /// and environment overrides
    pub fn load() -> crate::Result<Self> {
        Self::load_from(None)
    }

    /// The file `load_from` reads: the explicit path, else `config.toml`,
    /// else `config.example.toml`, else none (built-in defaults)
    pub fn config_path(path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(path.to_path_buf());
        }
        [CONFIG_FILE, EXAMPLE_CONFIG_FILE]
            .into_iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Whether `load_from` falls back to the sample configuration
    pub fn uses_example_config(path: Option<&Path>) -> bool {
        path.is_none()
            && Self::config_path(None).is_some_and(|file| file == Path::new(EXAMPLE_CONFIG_FILE))
    }

    /// Load from an explicit path, or fall back to `config.toml`,
    /// `config.example.toml` and finally the built-in defaults
    ///
    /// Runs before logging is initialized, so nothing here is logged.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        let mut config = match Self::config_path(path) {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };

        // A missing .env file is fine; the variables may come from the shell
        let _ = dotenvy::dotenv();
        config.apply_env_overrides_with(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get(ENV_LLM_KEY) {
            self.llm.llm_key = key;
        }
        if let Some(model) = get(ENV_LLM_MODEL) {
            self.llm.llm_model = model;
        }
        if let Some(key) = get(ENV_VECTOR_INDEX_KEY) {
            self.vector_index.api_key = key;
        }
        if let Some(host) = get(ENV_VECTOR_INDEX_HOST) {
            self.vector_index.host = Some(host);
        }
        if let Some(key) = get(ENV_EMBEDDING_KEY) {
            self.embeddings.api_key = Some(key);
        }
    }

    /// Environment variable names of the required secrets that are unset
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.llm.llm_key.trim().is_empty() {
            missing.push(ENV_LLM_KEY);
        }
        if self.vector_index.api_key.trim().is_empty() {
            missing.push(ENV_VECTOR_INDEX_KEY);
        }
        missing
    }

    /// Check that both secrets are present and the settings are usable
    pub fn validate(&self) -> crate::Result<()> {
        let missing = self.missing_secrets();
        if !missing.is_empty() {
            return Err(crate::TaxRagError::ConfigError(format!(
                "missing API key(s): {}. Check your .env file",
                missing.join(", ")
            )));
        }

        if self.vector_index.top_k == 0 {
            return Err(crate::TaxRagError::ConfigError(
                "vector_index.top_k must be at least 1".to_string(),
            ));
        }

        check_url("llm.llm_endpoint", &self.llm.llm_endpoint)?;
        check_url("embeddings.endpoint", &self.embeddings.endpoint)?;
        check_url(
            "vector_index.control_plane_url",
            &self.vector_index.control_plane_url,
        )?;

        if !matches!(self.embeddings.provider.as_str(), "openai" | "ollama") {
            return Err(crate::TaxRagError::ConfigError(format!(
                "unknown embeddings.provider '{}' (expected 'openai' or 'ollama')",
                self.embeddings.provider
            )));
        }

        Ok(())
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM key
    pub fn llm_key(&self) -> &str {
        &self.llm.llm_key
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Get number of passages retrieved per question
    pub fn top_k(&self) -> usize {
        self.vector_index.top_k
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get the session used when the caller does not name one
    pub fn default_session(&self) -> &str {
        &self.chat.default_session
    }
}

fn check_url(field: &str, value: &str) -> crate::Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| crate::TaxRagError::ConfigError(format!("{field} '{value}' is invalid: {e}")))
}
