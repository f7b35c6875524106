//! Anthropic messages-API backend for topic research.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LlmError, LlmProvider};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A topic brief is a small JSON object; no reason to pay for a long
/// completion budget by default.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Framing sent as the `system` turn so the per-call prompt can stay focused
/// on the request itself.
const DEFAULT_SYSTEM_PROMPT: &str = "You are the research agent for an affiliate-marketing \
blog. Always respond with exactly the JSON the prompt asks for, with no surrounding prose.";

/// Provider backed by the Anthropic messages API.
pub struct ClaudeProvider {
    api_key: String,
    model: String,
    max_tokens: u32,
    system_prompt: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for ClaudeProvider {
    // The api_key stays out of Debug output so it cannot leak into logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeProvider")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the completion budget, e.g. from `AFFLUX_LLM_MAX_TOKENS`.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Replace the default system framing.
    pub fn with_system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = system_prompt.to_string();
        self
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Map a raw API response to the completion text. Split out from the
/// transport so the status handling is testable without a live endpoint.
fn extract_completion(status: u16, body: &str) -> Result<String, LlmError> {
    if status == 429 {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| "rate limited".to_string());
        return Err(LlmError::RateLimited(message));
    }
    if status != 200 {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        return Err(LlmError::ApiError { status, message });
    }

    let response: MessagesResponse =
        serde_json::from_str(body).map_err(|e| LlmError::ParseError(e.to_string()))?;
    response
        .content
        .into_iter()
        .find_map(|block| (block.kind == "text").then_some(block.text).flatten())
        .ok_or_else(|| LlmError::ParseError("response has no text block".to_string()))
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: &self.system_prompt,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        extract_completion(status, &body)
    }

    fn provider_name(&self) -> &'static str {
        "claude"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_text_is_extracted_from_the_first_text_block() {
        let body = r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"{\"title\":\"T\"}"}]}"#;
        assert_eq!(extract_completion(200, body).unwrap(), r#"{"title":"T"}"#);
    }

    #[test]
    fn missing_text_block_is_a_parse_error() {
        let body = r#"{"content":[{"type":"tool_use"}]}"#;
        assert!(matches!(
            extract_completion(200, body),
            Err(LlmError::ParseError(_))
        ));
    }

    #[test]
    fn rate_limiting_is_its_own_error() {
        let body = r#"{"error":{"type":"rate_limit_error","message":"Too many requests"}}"#;
        let err = extract_completion(429, body).unwrap_err();
        match err {
            LlmError::RateLimited(message) => assert_eq!(message, "Too many requests"),
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[test]
    fn api_errors_carry_status_and_message() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"model not found"}}"#;
        match extract_completion(404, body).unwrap_err() {
            LlmError::ApiError { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "model not found");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn unparsable_error_bodies_fall_back_to_raw_text() {
        match extract_completion(500, "upstream timeout").unwrap_err() {
            LlmError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream timeout");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn debug_output_omits_the_api_key() {
        let provider = ClaudeProvider::new("sk-secret".to_string(), "claude-test".to_string());
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("claude-test"));
    }
}
