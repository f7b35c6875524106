//! Fake LLM provider for testing.
//!
//! Returns deterministic responses based on prompt substring matching, so
//! tests run without network access or API costs.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{LlmError, LlmProvider};

/// A fake LLM provider for testing.
///
/// Responses are matched by checking if the prompt contains a registered
/// substring. If no match is found, returns the default response or an error.
#[derive(Debug)]
pub struct FakeProvider {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    /// Default response if no match found
    default_response: Option<String>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: Some("{}".to_string()),
        }
    }
}

impl FakeProvider {
    /// Create a new FakeProvider with no registered responses.
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: None,
        }
    }

    /// Create a FakeProvider that returns a specific response for prompts
    /// containing a substring.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let mut provider = Self::new();
        provider.add_response(prompt_contains, response);
        provider
    }

    /// Add a response for prompts containing a specific substring.
    pub fn add_response(&mut self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap()
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let responses = self.responses.read().unwrap();

        let prompt_lower = prompt.to_lowercase();
        for (pattern, response) in responses.iter() {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(LlmError::RequestFailed(format!(
                "FakeProvider: No response configured for prompt (first 100 chars): {}",
                prompt.chars().take(100).collect::<String>()
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn matches_by_substring() {
        let provider = FakeProvider::with_response("topic brief", r#"{"title":"T"}"#);
        let result = provider
            .complete("Produce a topic brief as JSON")
            .await
            .unwrap();
        assert_eq!(result, r#"{"title":"T"}"#);
    }

    #[tokio::test]
    async fn no_match_without_default_is_an_error() {
        let provider = FakeProvider::new();
        assert!(provider.complete("anything").await.is_err());
    }

    #[tokio::test]
    async fn unmatched_multibyte_prompt_errors_without_panicking() {
        let provider = FakeProvider::new();
        // Each é is two bytes, so byte 100 is not a char boundary.
        let prompt = "é".repeat(120);
        let err = provider.complete(&prompt).await.unwrap_err();
        assert!(err.to_string().contains("No response configured"));
    }

    #[tokio::test]
    async fn default_response_applies() {
        let provider = FakeProvider::new().with_default_response("{}");
        assert_eq!(provider.complete("anything").await.unwrap(), "{}");
    }
}
