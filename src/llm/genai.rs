//! GenAI-based model client
//!
//! Wraps the `genai` crate. The model identifier selects the provider
//! (`gemini-*` routes to Google's Generative Language API); the credential is
//! injected from configuration instead of being read from the environment by
//! the library.

use super::client::LLMClient;
use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;
use genai::chat::{ChatMessage as GenAIChatMessage, ChatRequest as GenAIChatRequest};
use genai::resolver::{AuthData, ServiceTargetResolver};
use genai::{Client, ServiceTarget};
use std::time::Duration;
use tracing::{debug, error};

/// Model client backed by `genai`
pub struct GenAIClient {
    /// GenAI client instance
    client: Client,
    /// Model identifier, e.g. `gemini-2.5-flash`
    model: String,
    /// Request timeout
    timeout: Duration,
}

impl GenAIClient {
    /// Creates a client that authenticates every request with `api_key`
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        let resolver = ServiceTargetResolver::from_resolver_fn(
            move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let ServiceTarget {
                    endpoint, model, ..
                } = service_target;

                Ok(ServiceTarget {
                    endpoint,
                    auth: AuthData::from_single(api_key.clone()),
                    model,
                })
            },
        );

        let client = Client::builder()
            .with_service_target_resolver(resolver)
            .build();

        debug!("Creating GenAI client: model={}", model);

        Self {
            client,
            model,
            timeout,
        }
    }
}

#[async_trait]
impl LLMClient for GenAIClient {
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError> {
        let start = std::time::Instant::now();

        let genai_request = GenAIChatRequest::new(vec![GenAIChatMessage::user(request.prompt)]);

        let response = match tokio::time::timeout(
            self.timeout,
            self.client.exec_chat(&self.model, genai_request, None),
        )
        .await
        {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                error!("{} API error: {}", self.model, e);
                return Err(BackendError::ApiError {
                    message: format!("{} request failed: {}", self.model, e),
                    status_code: None,
                });
            }
            Err(_) => {
                error!(
                    "{} request timed out after {}s",
                    self.model,
                    self.timeout.as_secs()
                );
                return Err(BackendError::TimeoutError {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let content = response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| BackendError::InvalidResponse {
                message: format!("{} returned no text content", self.model),
            })?;

        Ok(LLMResponse::text(content, start.elapsed()))
    }

    fn name(&self) -> &str {
        "genai"
    }
}

impl std::fmt::Debug for GenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenAIClient")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genai_client_creation() {
        let client = GenAIClient::new(
            "test-key".to_string(),
            "gemini-2.5-flash".to_string(),
            Duration::from_secs(30),
        );
        assert_eq!(client.name(), "genai");
        assert_eq!(client.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_debug_hides_credential() {
        let client = GenAIClient::new(
            "super-secret".to_string(),
            "gemini-2.5-flash".to_string(),
            Duration::from_secs(30),
        );
        let debug = format!("{:?}", client);
        assert!(debug.contains("gemini-2.5-flash"));
        assert!(!debug.contains("super-secret"));
    }
}
