//! Topic selection agents.
//!
//! The orchestrator only sees the [`IdeationAgent`] trait, so the curated
//! pool, the LLM-backed researcher, and test fixtures are interchangeable.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::brief::TopicBrief;
use crate::error::IdeationError;
use crate::llm::LlmProvider;
use crate::pool::TopicPool;

/// Produces the topic brief that seeds a pipeline run.
#[async_trait]
pub trait IdeationAgent: Send + Sync {
    async fn propose(&self) -> Result<TopicBrief, IdeationError>;

    /// Agent name for logging, e.g. "curated" or "llm".
    fn name(&self) -> &'static str;
}

/// Random (seedable) selection from a curated topic pool.
pub struct CuratedIdeation {
    pool: TopicPool,
    rng: Mutex<StdRng>,
}

impl CuratedIdeation {
    /// `seed` fixes the selection for reproducible runs; `None` draws from
    /// OS entropy.
    pub fn new(pool: TopicPool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            pool,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl IdeationAgent for CuratedIdeation {
    async fn propose(&self) -> Result<TopicBrief, IdeationError> {
        let mut rng = self.rng.lock().unwrap();
        self.pool.pick(&mut rng).ok_or(IdeationError::EmptyPool)
    }

    fn name(&self) -> &'static str {
        "curated"
    }
}

const IDEATION_PROMPT: &str = "You are the research agent for an affiliate-marketing blog. \
Propose one article topic with strong affiliate potential in the approved niches \
(technology, personal finance, productivity, online business). \
Respond with a single JSON object and nothing else, with the fields: \
title, category (kebab-case slug), keywords (array of strings), \
affiliates (array of {name, url, commission}), meta_description.";

/// LLM-driven topic research.
///
/// Asks the provider for a topic brief as JSON. A response that does not
/// parse yields an empty brief, which the orchestrator rejects as invalid
/// input before anything is written.
pub struct LlmIdeation {
    provider: Box<dyn LlmProvider>,
}

impl LlmIdeation {
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl IdeationAgent for LlmIdeation {
    async fn propose(&self) -> Result<TopicBrief, IdeationError> {
        let response = self.provider.complete(IDEATION_PROMPT).await?;
        match TopicBrief::from_llm_response(&response) {
            Some(brief) => Ok(brief.with_derived_fields()),
            None => {
                tracing::warn!(
                    provider = self.provider.provider_name(),
                    "ideation response was not a parsable topic brief"
                );
                Ok(TopicBrief::empty())
            }
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

impl TopicBrief {
    /// Parse a brief out of an LLM response, tolerating surrounding prose or
    /// a markdown code fence around the JSON object.
    fn from_llm_response(response: &str) -> Option<Self> {
        let start = response.find('{')?;
        let end = response.rfind('}')?;
        serde_json::from_str(&response[start..=end]).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeProvider;

    #[tokio::test]
    async fn curated_ideation_is_reproducible() {
        let a = CuratedIdeation::new(TopicPool::builtin(), Some(11));
        let b = CuratedIdeation::new(TopicPool::builtin(), Some(11));
        assert_eq!(a.propose().await.unwrap(), b.propose().await.unwrap());
    }

    #[tokio::test]
    async fn curated_ideation_fails_on_empty_pool() {
        let agent = CuratedIdeation::new(TopicPool { niches: vec![] }, Some(1));
        assert!(matches!(
            agent.propose().await,
            Err(IdeationError::EmptyPool)
        ));
    }

    #[tokio::test]
    async fn llm_ideation_parses_a_fenced_brief() {
        let response = "Here you go:\n```json\n{\"title\":\"Best Tools\",\"category\":\"productivity\",\"keywords\":[\"tools\"],\"affiliates\":[]}\n```";
        let agent = LlmIdeation::new(Box::new(FakeProvider::with_response(
            "topic",
            response,
        )));
        let brief = agent.propose().await.unwrap();
        assert_eq!(brief.title, "Best Tools");
        assert_eq!(brief.slug, "best-tools");
    }

    #[tokio::test]
    async fn llm_ideation_degrades_to_empty_brief() {
        // The default fake answers "{}" - parsable but contentless.
        let agent = LlmIdeation::new(Box::new(FakeProvider::default()));
        let brief = agent.propose().await.unwrap();
        assert!(brief.is_empty());
    }
}
