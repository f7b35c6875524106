//! The generated article draft passed between pipeline stages.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// An image embedded in the article body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

/// An outbound affiliate link embedded in the article body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub text: String,
    pub url: String,
}

/// Article content prior to validation and publishing.
///
/// Transient state for a single pipeline run; only the publisher turns it
/// into a database row. `images` and `affiliate_links` duplicate what is in
/// the document tree so the review and validation stages don't have to walk
/// the tree to find them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: Document,
    pub featured_image: String,
    pub meta_title: String,
    pub meta_description: String,
    /// Comma-separated keyword string, as the posts table stores it.
    pub keywords: String,
    pub category_slug: String,
    pub tag_slugs: Vec<String>,
    pub images: Vec<ImageRef>,
    pub affiliate_links: Vec<AffiliateLink>,
}
