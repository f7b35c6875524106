//! Slug derivation and the single slug-uniqueness policy.
//!
//! Every code path that writes a post goes through [`unique_slug`], so
//! duplicate handling cannot diverge between callers: collisions are always
//! disambiguated deterministically with a numeric suffix, never rejected and
//! never suffixed with a timestamp.

/// Maximum length of a derived slug.
pub const MAX_SLUG_LEN: usize = 60;

/// How many numeric suffixes to try before giving up.
const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Lowercase, replace runs of non-alphanumerics with single hyphens, trim
/// leading/trailing hyphens, and clip to [`MAX_SLUG_LEN`].
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(MAX_SLUG_LEN);
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Find the first free slug among `base`, `base-2`, `base-3`, ...
///
/// `is_taken` checks the backing store; its error propagates unchanged.
/// Returns `Ok(None)` when every candidate within the attempt budget is
/// taken.
pub fn unique_slug<E, F>(base: &str, mut is_taken: F) -> Result<Option<String>, E>
where
    F: FnMut(&str) -> Result<bool, E>,
{
    if !is_taken(base)? {
        return Ok(Some(base.to_string()));
    }
    for n in 2..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{}-{}", base, n);
        if !is_taken(&candidate)? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(
            slugify("Best Widget Tools 2025: Complete Guide"),
            "best-widget-tools-2025-complete-guide"
        );
        assert_eq!(slugify("  --Hello,  World!--  "), "hello-world");
    }

    #[test]
    fn slugify_clips_to_max_len() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn unique_slug_returns_base_when_free() {
        let got = unique_slug::<(), _>("my-post", |_| Ok(false)).unwrap();
        assert_eq!(got.as_deref(), Some("my-post"));
    }

    #[test]
    fn unique_slug_disambiguates_deterministically() {
        let taken = ["my-post", "my-post-2"];
        let got = unique_slug::<(), _>("my-post", |s| Ok(taken.contains(&s))).unwrap();
        assert_eq!(got.as_deref(), Some("my-post-3"));

        // Same inputs, same answer: the policy is deterministic.
        let again = unique_slug::<(), _>("my-post", |s| Ok(taken.contains(&s))).unwrap();
        assert_eq!(got, again);
    }

    #[test]
    fn unique_slug_gives_up_eventually() {
        let got = unique_slug::<(), _>("busy", |_| Ok(true)).unwrap();
        assert_eq!(got, None);
    }
}
