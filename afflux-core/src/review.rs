//! Heuristic quality gates applied to a generated draft.

use crate::draft::ArticleDraft;

/// Reading speed used for the read-time estimate, in words per minute.
const WORDS_PER_MINUTE: usize = 200;

/// Review gate thresholds. The defaults are the editorial policy; tests and
/// experiments can loosen them.
#[derive(Debug, Clone)]
pub struct ReviewThresholds {
    /// Minimum prose word count. Blocking.
    pub min_words: usize,
    /// Minimum number of affiliate links. Blocking.
    pub min_affiliate_links: usize,
    /// Minimum number of embedded images. Blocking.
    pub min_images: usize,
    /// Acceptable title length range in characters. Advisory only.
    pub title_chars: (usize, usize),
    /// Acceptable meta-description length range in characters. Advisory only.
    pub meta_description_chars: (usize, usize),
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            min_words: 2000,
            min_affiliate_links: 3,
            min_images: 3,
            title_chars: (50, 70),
            meta_description_chars: (140, 165),
        }
    }
}

/// Outcome of the review stage.
#[derive(Debug, Clone)]
pub struct ReviewReport {
    pub approved: bool,
    /// Human-readable feedback, blocking and advisory alike.
    pub feedback: Vec<String>,
    /// Prose word count computed during review, reused for the read-time
    /// estimate at publish time.
    pub word_count: usize,
}

/// Apply the quality gates to a draft.
///
/// Word count comes from a text-extraction walk over the document tree, so
/// markup does not inflate it. Length checks on the title and meta
/// description produce feedback but never fail approval on their own.
pub fn review_draft(draft: &ArticleDraft, thresholds: &ReviewThresholds) -> ReviewReport {
    let mut feedback = Vec::new();
    let mut approved = true;

    let word_count = draft.content.word_count();
    if word_count < thresholds.min_words {
        feedback.push(format!(
            "Word count too low: {} (minimum {})",
            word_count, thresholds.min_words
        ));
        approved = false;
    }

    if draft.affiliate_links.len() < thresholds.min_affiliate_links {
        feedback.push(format!(
            "Not enough affiliate links: {} (minimum {})",
            draft.affiliate_links.len(),
            thresholds.min_affiliate_links
        ));
        approved = false;
    }

    if draft.images.len() < thresholds.min_images {
        feedback.push(format!(
            "Not enough images: {} (minimum {})",
            draft.images.len(),
            thresholds.min_images
        ));
        approved = false;
    }

    let title_len = draft.title.chars().count();
    let (title_lo, title_hi) = thresholds.title_chars;
    if title_len < title_lo || title_len > title_hi {
        feedback.push(format!(
            "Title length issue: {} chars (target {}-{})",
            title_len, title_lo, title_hi
        ));
    }

    let meta_len = draft.meta_description.chars().count();
    let (meta_lo, meta_hi) = thresholds.meta_description_chars;
    if meta_len < meta_lo || meta_len > meta_hi {
        feedback.push(format!(
            "Meta description length: {} chars (target {}-{})",
            meta_len, meta_lo, meta_hi
        ));
    }

    ReviewReport {
        approved,
        feedback,
        word_count,
    }
}

/// Estimated minutes to read `word_count` words, rounded up, minimum 1.
pub fn read_time_minutes(word_count: usize) -> u32 {
    (word_count.div_ceil(WORDS_PER_MINUTE)).max(1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Node};
    use crate::draft::{AffiliateLink, ImageRef};

    fn draft_with(words: usize, links: usize, images: usize) -> ArticleDraft {
        let text = "word ".repeat(words);
        ArticleDraft {
            title: "A title sized to sit inside the advisory window ok".to_string(), // 50 chars
            slug: "a-slug".to_string(),
            excerpt: "An excerpt.".to_string(),
            content: Document::new(vec![Node::paragraph(vec![Node::text(text.trim())])]),
            featured_image: "https://img.test/f.jpg".to_string(),
            meta_title: "Meta title".to_string(),
            meta_description: "d".repeat(150),
            keywords: "a, b".to_string(),
            category_slug: "productivity".to_string(),
            tag_slugs: vec!["a".to_string()],
            images: (0..images)
                .map(|i| ImageRef {
                    src: format!("https://img.test/{i}.jpg"),
                    alt: format!("image {i}"),
                })
                .collect(),
            affiliate_links: (0..links)
                .map(|i| AffiliateLink {
                    text: format!("Try {i}"),
                    url: format!("https://partner{i}.test"),
                })
                .collect(),
        }
    }

    #[test]
    fn passing_draft_has_no_blocking_feedback() {
        let report = review_draft(&draft_with(2000, 3, 3), &ReviewThresholds::default());
        assert!(report.approved);
        assert!(report.feedback.is_empty());
        assert_eq!(report.word_count, 2000);
    }

    #[test]
    fn too_few_affiliate_links_blocks_with_exact_message() {
        let report = review_draft(&draft_with(2500, 1, 3), &ReviewThresholds::default());
        assert!(!report.approved);
        assert!(report
            .feedback
            .contains(&"Not enough affiliate links: 1 (minimum 3)".to_string()));
    }

    #[test]
    fn low_word_count_blocks() {
        let report = review_draft(&draft_with(500, 3, 3), &ReviewThresholds::default());
        assert!(!report.approved);
        assert!(report.feedback[0].starts_with("Word count too low: 500"));
    }

    #[test]
    fn title_length_is_advisory_only() {
        let mut draft = draft_with(2200, 3, 3);
        draft.title = "Short".to_string();
        let report = review_draft(&draft, &ReviewThresholds::default());
        assert!(report.approved);
        assert!(report
            .feedback
            .iter()
            .any(|f| f.starts_with("Title length issue: 5 chars")));
    }

    #[test]
    fn read_time_rounds_up_with_a_floor_of_one() {
        assert_eq!(read_time_minutes(400), 2);
        assert_eq!(read_time_minutes(150), 1);
        assert_eq!(read_time_minutes(0), 1);
        assert_eq!(read_time_minutes(401), 3);
    }
}
