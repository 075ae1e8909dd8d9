//! Context assembly from retrieved passages

use tracing::info;

use super::RetrievedPassage;
use crate::cli::output::truncate_str;

const PASSAGE_SEPARATOR: &str = "\n\n";
const PREVIEW_CHARS: usize = 500;

/// Joins passages into the context block of the answer prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextAssembler;

impl ContextAssembler {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Passage texts in retrieval order, separated by a blank line
    ///
    /// No deduplication, re-ranking or truncation.
    #[must_use]
    pub fn assemble(&self, passages: &[RetrievedPassage]) -> String {
        info!("Retrieved {} passages", passages.len());
        for (idx, passage) in passages.iter().enumerate() {
            info!(
                "Passage {} (score {:.4}, metadata {}): {}",
                idx + 1,
                passage.score,
                serde_json::Value::Object(passage.source_metadata.clone()),
                truncate_str(&passage.text, PREVIEW_CHARS)
            );
        }

        let context = passages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        info!("Context length: {} chars", context.chars().count());
        context
    }
}
