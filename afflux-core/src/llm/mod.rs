//! The model seam behind LLM-driven topic research.
//!
//! [`LlmIdeation`](crate::ideation::LlmIdeation) only needs one capability:
//! send a prompt, get text back. Everything else (which vendor, which model,
//! completion budget) is configuration resolved once at startup via
//! [`create_provider_from_env`]. Tests substitute [`FakeProvider`] so no run
//! ever depends on a live endpoint.

mod claude;
mod fake;

pub use claude::ClaudeProvider;
pub use fake::FakeProvider;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The vendor is throttling us. A cron-driven caller should treat this as
    /// a skipped run and let the next trigger retry, not as a hard fault.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// One round-trip to a language model.
///
/// Implementations must be safe to share across tasks; the pipeline holds a
/// provider for the whole run.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Vendor label for logs, e.g. "claude" or "fake".
    fn provider_name(&self) -> &'static str;

    /// Concrete model identifier, e.g. "claude-3-5-sonnet-20241022".
    fn model_name(&self) -> &str;
}

/// Resolve the provider from the environment:
/// - `AFFLUX_LLM_PROVIDER`: "claude" | "fake" (default "fake")
/// - `AFFLUX_LLM_MODEL`: model identifier (Claude only)
/// - `AFFLUX_LLM_MAX_TOKENS`: completion budget override (Claude only)
/// - `ANTHROPIC_API_KEY`: credential for Claude
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let provider = std::env::var("AFFLUX_LLM_PROVIDER").unwrap_or_else(|_| "fake".to_string());

    match provider.as_str() {
        "fake" => Ok(Box::new(FakeProvider::default())),
        "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".to_string()))?;
            let model = std::env::var("AFFLUX_LLM_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet-20241022".to_string());
            let mut claude = ClaudeProvider::new(api_key, model);
            if let Ok(raw) = std::env::var("AFFLUX_LLM_MAX_TOKENS") {
                let max_tokens = raw.parse().map_err(|_| {
                    LlmError::NotConfigured(format!("AFFLUX_LLM_MAX_TOKENS is not a number: {}", raw))
                })?;
                claude = claude.with_max_tokens(max_tokens);
            }
            Ok(Box::new(claude))
        }
        other => Err(LlmError::NotConfigured(format!(
            "Unknown provider: {}",
            other
        ))),
    }
}
