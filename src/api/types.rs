//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::TaxRagError;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions: usize,
}

/// Chat request
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payload of a `chunk` event
#[derive(Debug, Serialize)]
pub struct ChunkEvent {
    pub text: String,
}

/// Payload of an `error` event
#[derive(Debug, Serialize)]
pub struct ErrorEvent {
    pub kind: &'static str,
    pub stage: Option<&'static str>,
    pub message: String,
}

impl From<&TaxRagError> for ErrorEvent {
    fn from(err: &TaxRagError) -> Self {
        Self {
            kind: err.kind().as_str(),
            stage: err.failed_stage().map(crate::errors::Stage::as_str),
            message: err.to_string(),
        }
    }
}

/// Session reset response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub session_id: String,
    pub cleared: bool,
}
