//! Run-summary notification printed to stdout between sentinel markers, so
//! the invoking cron wrapper can cut it out of the log stream and forward it.

use serde::Serialize;

use afflux_core::PipelineOutcome;

pub const NOTIFICATION_START: &str = "---NOTIFICATION_START---";
pub const NOTIFICATION_END: &str = "---NOTIFICATION_END---";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification<'a> {
    pub success: bool,
    pub title: Option<&'a str>,
    pub slug: Option<&'a str>,
    pub category: Option<&'a str>,
    pub excerpt: Option<&'a str>,
    pub word_count: usize,
    pub image_count: usize,
    pub link_count: usize,
    /// Lifecycle state of the created post; absent when nothing was written.
    pub status: Option<&'a str>,
    pub errors: &'a [String],
    pub warnings: &'a [String],
}

impl<'a> Notification<'a> {
    pub fn from_outcome(outcome: &'a PipelineOutcome) -> Self {
        Self {
            success: outcome.success,
            title: outcome.title.as_deref(),
            slug: outcome.post_slug.as_deref(),
            category: outcome.category.as_deref(),
            excerpt: outcome.excerpt.as_deref(),
            word_count: outcome.word_count,
            image_count: outcome.image_count,
            link_count: outcome.link_count,
            status: outcome.success.then_some("DRAFT"),
            errors: &outcome.errors,
            warnings: &outcome.warnings,
        }
    }
}

/// Print the notification block. The markers must stay exactly as-is; the
/// wrapper script matches on them verbatim.
pub fn print_notification(outcome: &PipelineOutcome) {
    let notification = Notification::from_outcome(outcome);
    let body = serde_json::to_string_pretty(&notification)
        .unwrap_or_else(|_| r#"{"success":false,"errors":["notification serialization failed"]}"#.to_string());
    println!("{}", NOTIFICATION_START);
    println!("{}", body);
    println!("{}", NOTIFICATION_END);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_json_uses_camel_case_keys() {
        let outcome = PipelineOutcome {
            success: true,
            post_slug: Some("my-post".to_string()),
            title: Some("My Post".to_string()),
            word_count: 2100,
            image_count: 4,
            link_count: 3,
            ..PipelineOutcome::default()
        };
        let json = serde_json::to_value(Notification::from_outcome(&outcome)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["slug"], "my-post");
        assert_eq!(json["wordCount"], 2100);
        assert_eq!(json["imageCount"], 4);
        assert_eq!(json["linkCount"], 3);
        assert_eq!(json["status"], "DRAFT");
    }

    #[test]
    fn failed_run_has_no_status() {
        let outcome = PipelineOutcome {
            success: false,
            errors: vec!["Review rejected the draft".to_string()],
            ..PipelineOutcome::default()
        };
        let json = serde_json::to_value(Notification::from_outcome(&outcome)).unwrap();

        assert_eq!(json["success"], false);
        assert!(json["status"].is_null());
        assert_eq!(json["errors"][0], "Review rejected the draft");
    }
}
