//! Topic briefs: the ephemeral input to draft generation.

use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// A product or service the article can link to for referral commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateCandidate {
    pub name: String,
    pub url: String,
    /// Commission descriptor, e.g. "25%" or "$50/signup". "N/A" means the
    /// partner has no affiliate program.
    #[serde(default)]
    pub commission: String,
}

/// The input spec for one article.
///
/// Produced by the topic-selection stage, consumed read-only downstream.
/// Never persisted. All fields default so a partial LLM response still
/// parses; an empty brief is rejected by the orchestrator before any write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicBrief {
    pub title: String,
    pub slug: String,
    pub category: String,
    pub tags: Vec<String>,
    pub outline: Vec<String>,
    pub affiliates: Vec<AffiliateCandidate>,
    pub keywords: Vec<String>,
    pub meta_description: String,
}

impl TopicBrief {
    /// A brief with nothing in it. Downstream stages must treat this as
    /// invalid input rather than publish garbage.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the brief cannot produce a publishable article.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() || self.category.trim().is_empty()
    }

    /// Fill in the derived fields (slug, tags, outline, meta description)
    /// that a curated pool entry leaves implicit.
    pub fn with_derived_fields(mut self) -> Self {
        if self.slug.is_empty() {
            self.slug = slugify(&self.title);
        }
        if self.tags.is_empty() {
            self.tags = self.keywords.iter().take(3).map(|k| slugify(k)).collect();
        }
        if self.outline.is_empty() {
            self.outline = self.default_outline();
        }
        self
    }

    fn default_outline(&self) -> Vec<String> {
        let mut outline = vec!["Quick Comparison Overview".to_string()];
        for (i, affiliate) in self.affiliates.iter().enumerate() {
            outline.push(format!("{}. {}", i + 1, affiliate.name));
        }
        outline.extend([
            "How to Choose the Right Option".to_string(),
            "Expert Tips for Getting Started".to_string(),
            "Frequently Asked Questions".to_string(),
            "Final Verdict".to_string(),
        ]);
        outline
    }

    /// The part of the title before any subtitle separator, e.g.
    /// "Best Widget Tools 2025" out of "Best Widget Tools 2025: Complete Guide".
    pub fn short_title(&self) -> &str {
        self.title.split(':').next().unwrap_or(&self.title).trim()
    }
}
