//! Core library for the Afflux content pipeline: topic selection, draft
//! generation, review gates, asset validation, and the publishing seam.
//! The database-backed publisher and the cron entry point live in the CLI
//! crate.

pub mod brief;
pub mod document;
pub mod draft;
pub mod error;
pub mod generator;
pub mod http;
pub mod ideation;
pub mod llm;
pub mod pipeline;
pub mod pool;
pub mod publish;
pub mod review;
pub mod slug;
pub mod validate;

pub use brief::{AffiliateCandidate, TopicBrief};
pub use document::{Document, Mark, Node};
pub use draft::{AffiliateLink, ArticleDraft, ImageRef};
pub use error::{GenerateError, IdeationError, ProbeError, PublishError};
pub use generator::DraftGenerator;
pub use http::{HttpClient, MockClient, ProbeClient, ProbeClientBuilder, ProbeStatus};
pub use ideation::{CuratedIdeation, IdeationAgent, LlmIdeation};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutcome, ReviewPolicy, Stage};
pub use pool::{ImagePool, TopicPool};
pub use publish::{MemoryPublisher, PublishReceipt, Publisher};
pub use review::{read_time_minutes, review_draft, ReviewReport, ReviewThresholds};
pub use validate::{validate_assets, ValidationResult};
