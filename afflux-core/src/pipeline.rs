//! Pipeline orchestrator: Select → Generate → Review → Validate → Publish.
//!
//! Stages run strictly sequentially with no retry or loop-back. The
//! orchestrator is the single place that decides fatal-vs-continue: stages
//! report results, never unwind across the stage boundary.

use uuid::Uuid;

use crate::generator::DraftGenerator;
use crate::http::HttpClient;
use crate::ideation::IdeationAgent;
use crate::pool::ImagePool;
use crate::publish::Publisher;
use crate::review::{review_draft, ReviewThresholds};
use crate::validate::validate_assets;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Select,
    Generate,
    Review,
    Validate,
    Publish,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: &'static [Stage] = &[
        Stage::Select,
        Stage::Generate,
        Stage::Review,
        Stage::Validate,
        Stage::Publish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Select => "select",
            Stage::Generate => "generate",
            Stage::Review => "review",
            Stage::Validate => "validate",
            Stage::Publish => "publish",
        }
    }
}

/// What to do when the review stage rejects a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewPolicy {
    /// Stop the run; nothing is written. The default: drafts are never
    /// auto-published anyway, so there is no reason to persist a rejected
    /// one.
    #[default]
    StrictHalt,
    /// Keep going and publish the imperfect draft for a human editor to fix,
    /// carrying the review feedback as warnings.
    BestEffort,
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub review_policy: ReviewPolicy,
    pub thresholds: ReviewThresholds,
    /// Seed for topic/image shuffling; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub success: bool,
    pub post_id: Option<Uuid>,
    pub post_slug: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub word_count: usize,
    pub image_count: usize,
    pub link_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// One pipeline run's collaborators, wired by the caller.
pub struct Pipeline<'a> {
    pub ideation: &'a dyn IdeationAgent,
    pub http: &'a dyn HttpClient,
    pub images: &'a ImagePool,
    pub publisher: &'a dyn Publisher,
    pub config: PipelineConfig,
}

impl Pipeline<'_> {
    /// Run the five stages. Never panics for expected failures; everything
    /// surfaces in the outcome's error and warning lists.
    pub async fn run(&self) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::default();

        tracing::info!(stage = Stage::Select.as_str(), agent = self.ideation.name(), "selecting topic");
        let brief = match self.ideation.propose().await {
            Ok(brief) => brief,
            Err(e) => {
                outcome.errors.push(format!("Topic selection failed: {}", e));
                return outcome;
            }
        };
        if brief.is_empty() {
            outcome
                .errors
                .push("Invalid topic brief: empty title or category".to_string());
            return outcome;
        }
        tracing::info!(title = %brief.title, category = %brief.category, "topic selected");
        outcome.title = Some(brief.title.clone());
        outcome.category = Some(brief.category.clone());

        tracing::info!(stage = Stage::Generate.as_str(), "generating article");
        let mut generator = DraftGenerator::new(self.http, self.images, self.config.seed);
        let draft = match generator.generate(&brief).await {
            Ok(draft) => draft,
            Err(e) => {
                outcome.errors.push(format!("Draft generation failed: {}", e));
                return outcome;
            }
        };
        tracing::info!(
            slug = %draft.slug,
            images = draft.images.len(),
            links = draft.affiliate_links.len(),
            "draft generated"
        );
        outcome.excerpt = Some(draft.excerpt.clone());
        outcome.image_count = draft.images.len();
        outcome.link_count = draft.affiliate_links.len();

        tracing::info!(stage = Stage::Review.as_str(), "reviewing draft");
        let review = review_draft(&draft, &self.config.thresholds);
        outcome.word_count = review.word_count;
        outcome.warnings.extend(review.feedback.iter().cloned());
        if !review.approved {
            match self.config.review_policy {
                ReviewPolicy::StrictHalt => {
                    outcome
                        .errors
                        .push("Review rejected the draft".to_string());
                    return outcome;
                }
                ReviewPolicy::BestEffort => {
                    tracing::warn!(feedback = ?review.feedback, "review rejected the draft, continuing");
                }
            }
        }

        tracing::info!(stage = Stage::Validate.as_str(), "validating assets");
        let validation = validate_assets(&draft, self.http).await;
        outcome.warnings.extend(validation.warnings.iter().cloned());
        if !validation.valid {
            outcome.errors.extend(validation.errors);
            return outcome;
        }

        tracing::info!(stage = Stage::Publish.as_str(), "publishing draft");
        match self.publisher.publish(&draft, review.word_count).await {
            Ok(receipt) => {
                tracing::info!(post_id = %receipt.post_id, slug = %receipt.slug, "post created");
                outcome.post_id = Some(receipt.post_id);
                outcome.post_slug = Some(receipt.slug);
                outcome.success = true;
            }
            Err(e) => {
                outcome.errors.push(format!("Publishing failed: {}", e));
            }
        }

        outcome
    }
}
