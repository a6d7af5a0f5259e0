//! Cache key derivation.
//!
//! Keys have the shape `METHOD:space:path[?query]:caller`. `space` is the
//! upstream version label the request host selects, or `-` for the default
//! path space. `caller` is `sub:<id>` for a verified subject and `anon` for
//! unauthenticated callers. Colons inside the path and query are escaped so
//! the caller segment cannot be forged through the URL.
//!
//! Paths are normalized so that trivially different spellings of the same
//! resource share an entry.

/// Space marker for hosts that carry no version label.
pub const DEFAULT_SPACE: &str = "-";

/// Caller segment for unauthenticated requests.
pub const ANONYMOUS: &str = "anon";

/// Build the cache key for a request.
pub fn cache_key(
    method: &str,
    version: Option<&str>,
    path: &str,
    query: Option<&str>,
    subject: Option<&str>,
) -> String {
    let space = version.unwrap_or(DEFAULT_SPACE);
    let mut resource = escape(&normalize_path(path));
    if let Some(query) = query.map(normalize_query).filter(|q| !q.is_empty()) {
        resource.push('?');
        resource.push_str(&escape(&query));
    }
    match subject {
        Some(subject) => format!("{method}:{space}:{resource}:sub:{subject}"),
        None => format!("{method}:{space}:{resource}:{ANONYMOUS}"),
    }
}

fn escape(segment: &str) -> String {
    segment.replace(':', "%3A")
}

/// Collapse repeated slashes and drop a trailing slash.
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Sort query pairs so parameter order does not matter.
pub fn normalize_query(query: &str) -> String {
    let mut pairs: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
    pairs.sort_unstable();
    pairs.join("&")
}
