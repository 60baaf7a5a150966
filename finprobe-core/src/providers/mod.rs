//! LLM provider implementations.
//!
//! The pipeline talks to two responders through the same trait: the weaker
//! "target" model being evaluated and the stronger "judge" model that
//! classifies failures. Both are served by [`OpenAiProvider`] against any
//! OpenAI-compatible chat completions endpoint.

pub mod openai;

use crate::config::LlmSettings;
use crate::error::{ConfigError, LlmError};
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;

pub use openai::OpenAiProvider;

/// Interface to an external chat-completions responder.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Perform a full completion and return the response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// Resolve the API key for a provider from its configured environment
/// variable.
///
/// Absence is fatal: the batch refuses to start without a credential, so
/// this is checked before any dataset or provider work begins.
pub fn resolve_api_key(settings: &LlmSettings) -> Result<String, ConfigError> {
    std::env::var(&settings.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ConfigError::EnvVarMissing {
            var: settings.api_key_env.clone(),
        })
}

/// Mock LLM provider for testing.
///
/// Returns queued responses in order; `complete` fails with an API error
/// once the queue is exhausted, which exercises the pipeline's recovery
/// paths without a network.
pub struct MockProvider {
    model: String,
    responses: std::sync::Mutex<std::collections::VecDeque<Result<String, LlmError>>>,
}

impl MockProvider {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            responses: std::sync::Mutex::new(std::collections::VecDeque::new()),
        }
    }

    /// Create a provider that always returns the given text.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new("mock-model");
        for _ in 0..64 {
            provider.queue_text(text);
        }
        provider
    }

    /// Create a provider whose every call fails with an API error.
    pub fn always_failing(message: &str) -> Self {
        let provider = Self::new("mock-model");
        for _ in 0..64 {
            provider.queue_error(LlmError::ApiRequest {
                message: message.to_string(),
            });
        }
        provider
    }

    /// Queue a text response for the next `complete` call.
    pub fn queue_text(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    /// Queue an error for the next `complete` call.
    pub fn queue_error(&self, err: LlmError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(CompletionResponse {
                content,
                model: self.model.clone(),
                usage: Default::default(),
                finish_reason: Some("stop".to_string()),
            }),
            Some(Err(err)) => Err(err),
            None => Err(LlmError::ApiRequest {
                message: "mock provider queue exhausted".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_key_missing_is_fatal() {
        let settings = LlmSettings {
            api_key_env: "FINPROBE_TEST_KEY_THAT_DOES_NOT_EXIST".to_string(),
            ..LlmSettings::default()
        };
        let err = resolve_api_key(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarMissing { ref var }
            if var == "FINPROBE_TEST_KEY_THAT_DOES_NOT_EXIST"));
    }

    #[tokio::test]
    async fn test_mock_provider_queue_order() {
        let provider = MockProvider::new("mock-model");
        provider.queue_text("first");
        provider.queue_text("second");

        let resp = provider.complete(Default::default()).await.unwrap();
        assert_eq!(resp.content, "first");
        let resp = provider.complete(Default::default()).await.unwrap();
        assert_eq!(resp.content, "second");

        // Exhausted queue fails.
        assert!(provider.complete(Default::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_provider_queued_error() {
        let provider = MockProvider::always_failing("boom");
        let err = provider.complete(Default::default()).await.unwrap_err();
        assert!(matches!(err, LlmError::ApiRequest { ref message } if message == "boom"));
    }
}
