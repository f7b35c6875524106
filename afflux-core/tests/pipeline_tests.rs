//! End-to-end pipeline scenarios over test doubles: fixed topic pools, a
//! mock probe client, and the in-memory publisher.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use afflux_core::error::ProbeError;
use afflux_core::http::{HttpClient, MockClient, ProbeStatus};
use afflux_core::ideation::LlmIdeation;
use afflux_core::llm::FakeProvider;
use afflux_core::pool::{Niche, TopicPool, TopicSeed};
use afflux_core::{
    AffiliateCandidate, CuratedIdeation, ImagePool, MemoryPublisher, Pipeline, PipelineConfig,
    PublishError, PublishReceipt, Publisher, ReviewPolicy,
};

fn widget_pool(affiliate_count: usize) -> TopicPool {
    let affiliates = [
        ("WidgetPro", "https://widgetpro.test"),
        ("WidgetLite", "https://widgetlite.test"),
        ("WidgetFree", "https://widgetfree.test"),
    ]
    .iter()
    .take(affiliate_count)
    .map(|(name, url)| AffiliateCandidate {
        name: name.to_string(),
        url: url.to_string(),
        commission: "20%".to_string(),
    })
    .collect();

    TopicPool {
        niches: vec![Niche {
            niche: "productivity".to_string(),
            category: "productivity".to_string(),
            topics: vec![TopicSeed {
                title: "Best Widget Tools 2025: Complete Buyer's Guide".to_string(),
                keywords: vec![
                    "widget tools".to_string(),
                    "widget comparison".to_string(),
                    "best widgets".to_string(),
                    "workflow".to_string(),
                ],
                affiliates,
            }],
        }],
    }
}

#[tokio::test]
async fn full_run_publishes_exactly_one_draft_post() {
    let ideation = CuratedIdeation::new(widget_pool(3), Some(1));
    let http = MockClient::new().with_default_status(200);
    let images = ImagePool::builtin();
    let publisher = MemoryPublisher::new();

    let pipeline = Pipeline {
        ideation: &ideation,
        http: &http,
        images: &images,
        publisher: &publisher,
        config: PipelineConfig {
            seed: Some(1),
            ..PipelineConfig::default()
        },
    };
    let outcome = pipeline.run().await;

    assert!(outcome.success, "errors: {:?}", outcome.errors);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.post_slug.as_deref(), Some("best-widget-tools-2025-complete-buyer-s-guide"));
    assert_eq!(outcome.link_count, 3);
    assert!(outcome.image_count >= 3);
    assert!(outcome.word_count >= 2000);
    assert_eq!(publisher.post_count(), 1);
}

#[tokio::test]
async fn publishing_the_same_topic_twice_disambiguates_the_slug() {
    let ideation = CuratedIdeation::new(widget_pool(3), Some(1));
    let http = MockClient::new().with_default_status(200);
    let images = ImagePool::builtin();
    let publisher = MemoryPublisher::new();

    let pipeline = Pipeline {
        ideation: &ideation,
        http: &http,
        images: &images,
        publisher: &publisher,
        config: PipelineConfig {
            seed: Some(1),
            ..PipelineConfig::default()
        },
    };

    let first = pipeline.run().await;
    let second = pipeline.run().await;

    assert!(first.success && second.success);
    let first_slug = first.post_slug.unwrap();
    assert_eq!(second.post_slug.unwrap(), format!("{}-2", first_slug));
    assert_eq!(publisher.post_count(), 2);
}

#[tokio::test]
async fn strict_halt_stops_a_rejected_draft_before_any_write() {
    let ideation = CuratedIdeation::new(widget_pool(1), Some(1));
    let http = MockClient::new().with_default_status(200);
    let images = ImagePool::builtin();
    let publisher = MemoryPublisher::new();

    let pipeline = Pipeline {
        ideation: &ideation,
        http: &http,
        images: &images,
        publisher: &publisher,
        config: PipelineConfig {
            review_policy: ReviewPolicy::StrictHalt,
            seed: Some(1),
            ..PipelineConfig::default()
        },
    };
    let outcome = pipeline.run().await;

    assert!(!outcome.success);
    assert!(outcome
        .warnings
        .contains(&"Not enough affiliate links: 1 (minimum 3)".to_string()));
    assert!(outcome
        .errors
        .contains(&"Review rejected the draft".to_string()));
    assert_eq!(publisher.post_count(), 0);
}

#[tokio::test]
async fn best_effort_publishes_a_rejected_draft_with_warnings() {
    let ideation = CuratedIdeation::new(widget_pool(1), Some(1));
    let http = MockClient::new().with_default_status(200);
    let images = ImagePool::builtin();
    let publisher = MemoryPublisher::new();

    let pipeline = Pipeline {
        ideation: &ideation,
        http: &http,
        images: &images,
        publisher: &publisher,
        config: PipelineConfig {
            review_policy: ReviewPolicy::BestEffort,
            seed: Some(1),
            ..PipelineConfig::default()
        },
    };
    let outcome = pipeline.run().await;

    assert!(outcome.success);
    assert!(!outcome.warnings.is_empty());
    assert_eq!(publisher.post_count(), 1);
}

#[tokio::test]
async fn empty_llm_brief_aborts_before_generation() {
    // The default fake provider answers "{}": parsable, but an empty brief.
    let ideation = LlmIdeation::new(Box::new(FakeProvider::default()));
    let http = MockClient::new().with_default_status(200);
    let images = ImagePool::builtin();
    let publisher = MemoryPublisher::new();

    let pipeline = Pipeline {
        ideation: &ideation,
        http: &http,
        images: &images,
        publisher: &publisher,
        config: PipelineConfig::default(),
    };
    let outcome = pipeline.run().await;

    assert!(!outcome.success);
    assert!(outcome.errors[0].contains("Invalid topic brief"));
    assert_eq!(publisher.post_count(), 0);
}

/// Succeeds for the first `fail_after` probes, then returns 404: simulates an
/// image going dark between generation and validation.
struct FlakyClient {
    fail_after: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl HttpClient for FlakyClient {
    async fn head(&self, _url: &str) -> Result<ProbeStatus, ProbeError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.fail_after {
            Ok(ProbeStatus(200))
        } else {
            Ok(ProbeStatus(404))
        }
    }
}

#[tokio::test]
async fn validation_failure_halts_before_publish() {
    let ideation = CuratedIdeation::new(widget_pool(3), Some(1));
    // Generation probes 4 images successfully; validation then sees probes
    // 5 and 6 succeed and the rest 404.
    let http = FlakyClient {
        fail_after: 6,
        calls: AtomicUsize::new(0),
    };
    let images = ImagePool::builtin();
    let publisher = MemoryPublisher::new();

    let pipeline = Pipeline {
        ideation: &ideation,
        http: &http,
        images: &images,
        publisher: &publisher,
        config: PipelineConfig {
            seed: Some(1),
            ..PipelineConfig::default()
        },
    };
    let outcome = pipeline.run().await;

    assert!(!outcome.success);
    assert!(outcome.errors.iter().any(|e| e.contains("Broken image")));
    assert_eq!(publisher.post_count(), 0);
}

/// Publisher double that always reports no eligible author.
struct NoAuthorPublisher;

#[async_trait]
impl Publisher for NoAuthorPublisher {
    async fn publish(
        &self,
        _draft: &afflux_core::ArticleDraft,
        _word_count: usize,
    ) -> Result<PublishReceipt, PublishError> {
        Err(PublishError::NoAuthor)
    }
}

#[tokio::test]
async fn missing_author_is_a_fatal_publish_error() {
    let ideation = CuratedIdeation::new(widget_pool(3), Some(1));
    let http = MockClient::new().with_default_status(200);
    let images = ImagePool::builtin();
    let publisher = NoAuthorPublisher;

    let pipeline = Pipeline {
        ideation: &ideation,
        http: &http,
        images: &images,
        publisher: &publisher,
        config: PipelineConfig {
            seed: Some(1),
            ..PipelineConfig::default()
        },
    };
    let outcome = pipeline.run().await;

    assert!(!outcome.success);
    assert!(outcome
        .errors
        .iter()
        .any(|e| e.contains("No publisher account available")));
}
