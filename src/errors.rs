use std::fmt;

use thiserror::Error;

/// Pipeline stage that produced a per-request failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Retrieve,
    Generate,
    Persist,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Retrieve => "retrieve",
            Self::Generate => "generate",
            Self::Persist => "persist",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure kind callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing secrets or invalid settings; fatal before serving
    Configuration,
    /// A component could not be constructed; fatal for the process
    Initialization,
    /// An upstream call failed for one request; the user may resubmit
    Request,
    /// Generation failed after fragments were already delivered
    PartialStream,
    /// Local failures (I/O, parsing) outside the request taxonomy
    Internal,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Initialization => "initialization",
            Self::Request => "request",
            Self::PartialStream => "partial_stream",
            Self::Internal => "internal",
        }
    }
}

#[derive(Error, Debug)]
pub enum TaxRagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to initialize {component}: {message}")]
    InitError {
        component: &'static str,
        message: String,
    },

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<TaxRagError>,
    },

    #[error("Answer stream interrupted after {delivered} fragment(s): {message}")]
    PartialStream { delivered: usize, message: String },

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Vector index error: {0}")]
    VectorIndexError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl TaxRagError {
    /// Tag an upstream failure with the stage it happened in
    #[must_use]
    pub fn stage(stage: Stage, source: Self) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn init(component: &'static str, message: impl Into<String>) -> Self {
        Self::InitError {
            component,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(_) => ErrorKind::Configuration,
            Self::InitError { .. } => ErrorKind::Initialization,
            Self::StageFailed { .. }
            | Self::HttpError(_)
            | Self::LlmError(_)
            | Self::EmbeddingError(_)
            | Self::VectorIndexError(_) => ErrorKind::Request,
            Self::PartialStream { .. } => ErrorKind::PartialStream,
            Self::Serialization(_) | Self::TomlParsing(_) | Self::Io(_) | Self::Custom(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Stage tag of a per-request failure, if any
    #[must_use]
    pub const fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            Self::PartialStream { .. } => Some(Stage::Generate),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TaxRagError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TaxRagError>;
