//! Publishing seam between the pipeline and the backing store.
//!
//! The orchestrator only sees the [`Publisher`] trait; the diesel-backed
//! implementation lives in the CLI crate, and tests use [`MemoryPublisher`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::draft::ArticleDraft;
use crate::error::PublishError;
use crate::slug::unique_slug;

/// Identity of a freshly inserted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub post_id: Uuid,
    /// The slug actually written, after uniqueness resolution.
    pub slug: String,
}

/// Persists a validated draft as an unpublished post.
///
/// Implementations must insert the post in Draft status with a null publish
/// timestamp regardless of any downstream intent; promoting a post to
/// Published stays a human decision.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        draft: &ArticleDraft,
        word_count: usize,
    ) -> Result<PublishReceipt, PublishError>;
}

/// In-memory publisher for tests: tracks slugs, applies the same uniqueness
/// policy as the real store, never touches a database.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    posts: Mutex<HashMap<String, Uuid>>,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of posts "inserted" so far.
    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    /// Whether a post with this exact slug exists.
    pub fn has_slug(&self, slug: &str) -> bool {
        self.posts.lock().unwrap().contains_key(slug)
    }
}

#[async_trait]
impl Publisher for MemoryPublisher {
    async fn publish(
        &self,
        draft: &ArticleDraft,
        _word_count: usize,
    ) -> Result<PublishReceipt, PublishError> {
        let mut posts = self.posts.lock().unwrap();
        let slug = unique_slug::<PublishError, _>(&draft.slug, |candidate| {
            Ok(posts.contains_key(candidate))
        })?
        .ok_or_else(|| PublishError::SlugExhausted(draft.slug.clone()))?;

        let post_id = Uuid::new_v4();
        posts.insert(slug.clone(), post_id);
        Ok(PublishReceipt { post_id, slug })
    }
}
