use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("invalid slug regex"));

const MAX_SLUG_LEN: usize = 80;

/// Extracts the host from an http(s) URL, with any `www.` prefix stripped.
/// Returns None for other schemes or unparsable input.
pub fn extract_domain(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Lowercases the title and collapses every non-alphanumeric run into a
/// single hyphen. Always returns a non-empty slug.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let replaced = NON_ALNUM.replace_all(&lowered, "-");
    let mut slug = replaced.trim_matches('-').to_string();

    if slug.len() > MAX_SLUG_LEN {
        // the replacement is pure ASCII, so byte truncation is safe
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }

    if slug.is_empty() { "post".to_string() } else { slug }
}

/// Picks the first free slug: the base itself, then `base-2`, `base-3`, ...
pub fn resolve_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    let mut counter = 2;
    loop {
        let candidate = format!("{base}-{counter}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
