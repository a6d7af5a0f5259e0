//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefixes on segment boundaries (case-sensitive)
//! - Detect version labels in the Host header (case-insensitive)
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

/// Matches a request path against a prefix on `/` boundaries.
///
/// `/api/v1/users` matches `/api/v1/users` and `/api/v1/users/7`, never
/// `/api/v1/usersx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher. A trailing slash is ignored.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() },
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Longer prefixes are more specific.
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Matches Host headers carrying a version label, e.g. `v2.api.example.com`
/// or `api.v2.example.com`.
#[derive(Debug, Clone)]
pub struct VersionedHostMatcher {
    versions: Vec<String>,
}

impl VersionedHostMatcher {
    /// Versions are normalized to lowercase for case-insensitive matching.
    pub fn new(versions: &[String]) -> Self {
        Self {
            versions: versions.iter().map(|v| v.to_lowercase()).collect(),
        }
    }

    /// The version label the host carries, if it is one we know.
    pub fn version_of(&self, host: &str) -> Option<&str> {
        let host = host.to_lowercase();
        // Ports are irrelevant to the label check.
        let host = host.split(':').next().unwrap_or_default();
        host.split('.')
            .find_map(|label| self.versions.iter().find(|v| v.as_str() == label))
            .map(String::as_str)
    }
}
