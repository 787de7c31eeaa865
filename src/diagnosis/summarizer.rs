//! AI summarization boundary
//!
//! Failures never cross this boundary: a missing credential yields a fixed
//! placeholder and a failed call yields an explanatory string, so the
//! escalator's control flow only ever deals with text.

use crate::llm::{LLMClient, LLMRequest};
use std::sync::Arc;
use tracing::{debug, warn};

/// Text returned when no model credential is configured
pub const DISABLED_TEXT: &str = "AI analysis skipped: API key not configured.";

#[derive(Clone)]
pub struct AiSummarizer {
    client: Option<Arc<dyn LLMClient>>,
}

impl AiSummarizer {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// Summarizer that answers every request with [`DISABLED_TEXT`]
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn build_prompt(context: &str, instructions: &str) -> String {
        format!(
            "{}\n\n**Context:**\n---\n{}\n---",
            instructions, context
        )
    }

    /// Ask the model to analyze `context` following `instructions`
    pub async fn summarize(&self, context: &str, instructions: &str) -> String {
        let Some(client) = &self.client else {
            return DISABLED_TEXT.to_string();
        };

        let prompt = Self::build_prompt(context, instructions);
        debug!(
            "Requesting analysis from {} ({} prompt bytes)",
            client.name(),
            prompt.len()
        );

        match client.chat(LLMRequest::prompt(prompt)).await {
            Ok(response) => {
                debug!(
                    "Analysis received in {}ms",
                    response.response_time.as_millis()
                );
                response.content
            }
            Err(e) => {
                warn!("AI analysis failed: {}", e);
                format!("An error occurred during AI analysis: {}", e)
            }
        }
    }
}

impl std::fmt::Debug for AiSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiSummarizer")
            .field("client", &self.client.as_ref().map(|c| c.name().to_string()))
            .finish()
    }
}
