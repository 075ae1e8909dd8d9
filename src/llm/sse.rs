//! Server-Sent Events decoding for streamed chat completions

use serde::de::DeserializeOwned;

use crate::cli::output::truncate_str;
use crate::errors::Result;
use crate::errors::TaxRagError;

/// Incremental SSE decoder
///
/// Bytes are buffered until a full line arrives, so multi-byte UTF-8
/// characters split across network chunks are decoded intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Upper bound for a single unterminated line (1MB)
    const MAX_BUFFER_SIZE: usize = 1024 * 1024;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a network chunk and return every complete `data:` frame
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseFrame>> {
        self.buffer.extend_from_slice(chunk);

        if self.buffer.len() > Self::MAX_BUFFER_SIZE && !self.buffer.contains(&b'\n') {
            self.buffer.clear();
            return Err(TaxRagError::LlmError(format!(
                "SSE line exceeded {}KB without a newline",
                Self::MAX_BUFFER_SIZE / 1024
            )));
        }

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(frame) = Self::parse_line(&line)? {
                frames.push(frame);
            }
        }

        Ok(frames)
    }

    /// Flush a trailing line left without a newline at end of stream
    pub fn finish(&mut self) -> Result<Option<SseFrame>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let line = std::mem::take(&mut self.buffer);
        Self::parse_line(&line)
    }

    fn parse_line(raw: &[u8]) -> Result<Option<SseFrame>> {
        let line = std::str::from_utf8(raw)
            .map_err(|e| TaxRagError::LlmError(format!("SSE line is not valid UTF-8: {e}")))?;
        let line = line.trim_end_matches(['\r', '\n']);

        // Comments (":"), event names, ids and retry hints carry no text
        let Some(data) = line.strip_prefix("data:") else {
            return Ok(None);
        };
        let data = data.strip_prefix(' ').unwrap_or(data);
        if data.is_empty() {
            return Ok(None);
        }

        Ok(Some(SseFrame {
            data: data.to_string(),
        }))
    }
}

/// Payload of one `data:` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub data: String,
}

impl SseFrame {
    /// OpenAI-style end-of-stream sentinel
    pub fn is_done(&self) -> bool {
        self.data == "[DONE]"
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).map_err(|e| {
            TaxRagError::LlmError(format!(
                "Failed to parse stream chunk: {e}. Data: {}",
                truncate_str(&self.data, 200)
            ))
        })
    }
}
