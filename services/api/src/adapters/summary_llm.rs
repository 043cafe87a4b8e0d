//! services/api/src/adapters/summary_llm.rs
//!
//! This module contains the adapter for the story-summarizing LLM.
//! It implements the `SummarizationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    error::OpenAIError,
    Client,
};
use async_trait::async_trait;
use storyteller_core::ports::{PortError, PortResult, SummarizationService};

/// Returned verbatim when the completion contains no text content.
const EMPTY_COMPLETION_FALLBACK: &str = "No summary generated.";

/// Builds the single instruction-style prompt, embedding the stories verbatim.
fn build_prompt(stories_text: &str) -> String {
    format!(
        "combine all the stories and Summarize it as a single story:\n\n\"{}\"",
        stories_text
    )
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` using an OpenAI-compatible LLM.
///
/// The client is pointed at Groq's OpenAI-compatible endpoint by default, so
/// the same adapter works against either provider.
#[derive(Clone)]
pub struct OpenAiSummaryAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryAdapter {
    /// Creates a new `OpenAiSummaryAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for OpenAiSummaryAdapter {
    /// Requests a single completion and returns the first choice's content.
    async fn summarize(&self, text: &str) -> PortResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(build_prompt(text))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response,
        // falling back to a fixed placeholder when there is none.
        let summary = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| EMPTY_COMPLETION_FALLBACK.to_string());

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_the_stories_verbatim() {
        let text = "I planted a garden.\n\nThe seeds sprouted.";
        let prompt = build_prompt(text);
        assert!(prompt.contains(text));
        assert!(prompt.starts_with("combine all the stories"));
    }

    #[test]
    fn prompt_quotes_the_story_block() {
        let prompt = build_prompt("a single day");
        assert!(prompt.ends_with("\"a single day\""));
    }
}
