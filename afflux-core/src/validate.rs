//! Asset validation: reachability probes and structural checks.

use crate::draft::ArticleDraft;
use crate::http::HttpClient;

/// Outcome of the validation stage. `valid` is true exactly when there are
/// no fatal errors; warnings never block publishing.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Probe every embedded image, the featured image, and every affiliate link.
///
/// Broken images are fatal. Affiliate endpoints frequently reject HEAD
/// probes with 403, so for links anything other than success-or-403 is
/// only a warning. Probes run sequentially; the cron-driven invocation model
/// doesn't justify the complexity of fanning them out.
pub async fn validate_assets(draft: &ArticleDraft, http: &dyn HttpClient) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for image in &draft.images {
        match http.head(&image.src).await {
            Ok(status) if status.is_success() => {}
            Ok(status) => errors.push(format!(
                "Broken image: {} - {} (status {})",
                image.alt, image.src, status.0
            )),
            Err(_) => errors.push(format!(
                "Image fetch failed: {} - {}",
                image.alt, image.src
            )),
        }
    }

    match http.head(&draft.featured_image).await {
        Ok(status) if status.is_success() => {}
        Ok(_) => errors.push(format!("Broken featured image: {}", draft.featured_image)),
        Err(_) => errors.push(format!(
            "Featured image fetch failed: {}",
            draft.featured_image
        )),
    }

    for link in &draft.affiliate_links {
        match http.head(&link.url).await {
            Ok(status) if status.is_success() || status.0 == 403 => {}
            Ok(_) => warnings.push(format!(
                "Affiliate link may be broken: {} - {}",
                link.text, link.url
            )),
            Err(_) => warnings.push(format!(
                "Could not verify affiliate link: {} - {}",
                link.text, link.url
            )),
        }
    }

    if !draft.content.is_well_formed() {
        errors.push("Invalid document structure: root node is not a doc".to_string());
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}
