//! Dictionary-based question rewriting

use std::sync::Arc;

use tracing::info;
use tracing::warn;

use crate::errors::Result;
use crate::llm::prompts::format_dictionary;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::llm::PromptTemplate;
use crate::llm::TaxPrompts;

/// Rewrites colloquial questions into the corpus vocabulary
pub struct QueryNormalizer {
    model: Arc<dyn ChatModel>,
    dictionary: String,
    template: PromptTemplate,
}

impl QueryNormalizer {
    pub fn new(model: Arc<dyn ChatModel>, dictionary: &[String]) -> Self {
        Self {
            model,
            dictionary: format_dictionary(dictionary),
            template: TaxPrompts::dictionary_rewrite(),
        }
    }

    /// The rewrite prompt for `question`, sent as one user message
    #[must_use]
    pub fn prompt(&self, question: &str) -> String {
        self.template
            .render_with(&[("dictionary", &self.dictionary), ("question", question)])
    }

    /// Rewrite `question`
    ///
    /// A blank rewrite falls back to the original question; anything else
    /// is used as returned.
    ///
    /// # Errors
    /// Propagates model failures unchanged.
    pub async fn normalize(&self, question: &str) -> Result<String> {
        let messages = [ChatMessage::user(self.prompt(question))];
        let rewritten = self.model.complete(&messages).await?;

        info!("Original question: {}", question);
        if rewritten.trim().is_empty() {
            warn!("Rewrite came back empty, using the original question");
            return Ok(question.to_string());
        }
        info!("Rewritten question: {}", rewritten);

        Ok(rewritten)
    }
}
