//! Topic and image pools.
//!
//! Both pools are plain data, loadable from JSON files so deployments can
//! swap in their own catalogues without a rebuild. The built-in defaults are
//! embedded at compile time.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::brief::{AffiliateCandidate, TopicBrief};

const BUILTIN_TOPICS: &str = include_str!("../data/topics.json");
const BUILTIN_IMAGES: &str = include_str!("../data/images.json");

/// Image pool category used when an article's category has no images of its
/// own.
const FALLBACK_IMAGE_CATEGORY: &str = "productivity";

/// One topic seed within a niche.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSeed {
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub affiliates: Vec<AffiliateCandidate>,
}

/// A niche groups topics that share a target category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Niche {
    pub niche: String,
    pub category: String,
    pub topics: Vec<TopicSeed>,
}

/// The curated catalogue of article ideas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicPool {
    pub niches: Vec<Niche>,
}

impl TopicPool {
    /// The compile-time default pool.
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_TOPICS).expect("built-in topic pool is valid JSON")
    }

    /// Parse a pool from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.niches.iter().all(|n| n.topics.is_empty())
    }

    /// Pick a random niche, then a random topic within it, and assemble a
    /// brief with the derived fields filled in. Returns `None` when the pool
    /// has no topics. There is no repetition guarantee across runs.
    pub fn pick(&self, rng: &mut StdRng) -> Option<TopicBrief> {
        let niche = self
            .niches
            .iter()
            .filter(|n| !n.topics.is_empty())
            .collect::<Vec<_>>()
            .choose(rng)
            .copied()?;
        let seed = niche.topics.choose(rng)?;

        let brief = TopicBrief {
            title: seed.title.clone(),
            category: niche.category.clone(),
            keywords: seed.keywords.clone(),
            affiliates: seed.affiliates.clone(),
            ..TopicBrief::default()
        };
        Some(brief.with_derived_fields())
    }
}

/// Candidate article images, keyed by category slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePool {
    categories: HashMap<String, Vec<String>>,
}

impl ImagePool {
    /// The compile-time default pool.
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_IMAGES).expect("built-in image pool is valid JSON")
    }

    /// Parse a pool from a JSON document.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Candidate image URLs for a category, falling back to the general
    /// productivity set for unknown categories.
    pub fn candidates(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .or_else(|| self.categories.get(FALLBACK_IMAGE_CATEGORY))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
