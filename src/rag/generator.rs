//! Answer prompt assembly and streaming generation

use std::sync::Arc;

use tracing::debug;

use super::Turn;
use crate::config::FewShotExample;
use crate::errors::Result;
use crate::llm::ChatMessage;
use crate::llm::ChatModel;
use crate::llm::PromptTemplate;
use crate::llm::StreamingResponse;
use crate::llm::TaxPrompts;

/// Streams grounded answers from the chat model
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    examples: Vec<FewShotExample>,
    system: PromptTemplate,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>, examples: Vec<FewShotExample>) -> Self {
        Self {
            model,
            examples,
            system: TaxPrompts::answer_system(),
        }
    }

    /// Message layout: system + context, few-shot pairs, history, then the question
    #[must_use]
    pub fn build_messages(&self, question: &str, context: &str, history: &[Turn]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2 + self.examples.len() * 2 + history.len());

        messages.push(ChatMessage::system(
            self.system.render_with(&[("context", context)]),
        ));
        for example in &self.examples {
            messages.push(ChatMessage::user(example.input.clone()));
            messages.push(ChatMessage::assistant(example.answer.clone()));
        }
        messages.extend(history.iter().map(Turn::to_chat_message));
        messages.push(ChatMessage::user(question));

        messages
    }

    /// Start streaming the answer to `question`
    ///
    /// # Errors
    /// Model failures before the first fragment.
    pub async fn generate(
        &self,
        question: &str,
        context: &str,
        history: &[Turn],
    ) -> Result<StreamingResponse> {
        let messages = self.build_messages(question, context, history);
        debug!("Sending {} messages to the chat model", messages.len());
        self.model.stream(&messages).await
    }
}
