//! Cache key types.
//!
//! A cache entry is identified by the pair of rewrite mode and document
//! path. The two are never collapsed: a disabled-rewrite request must not
//! be served a rewritten body, so `(Disabled, path)` and `(Enabled, path)`
//! are independent entries.

// =============================================================================
// RewriteMode
// =============================================================================

/// Whether freshness parameters are added to local references.
///
/// Parsed once at the serving boundary from optional header text via
/// [`RewriteMode::from_header`] and passed into every cache operation;
/// nothing downstream re-interprets the raw header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteMode {
    /// Explicitly enabled.
    Enabled,
    /// Explicitly disabled. No freshness parameter is appended and no
    /// dependencies are recorded; the served bytes match the source.
    Disabled,
    /// No explicit signal; rewriting proceeds as if enabled.
    Default,
}

impl RewriteMode {
    /// Parse a mode from optional header text.
    ///
    /// `"true"` enables and `"false"` disables, ASCII case-insensitively;
    /// any other value, including an absent header, is [`RewriteMode::Default`].
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("true") => Self::Enabled,
            Some(v) if v.eq_ignore_ascii_case("false") => Self::Disabled,
            _ => Self::Default,
        }
    }

    /// Whether this mode adds freshness parameters.
    pub fn rewrites(self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl Default for RewriteMode {
    fn default() -> Self {
        Self::Default
    }
}

// =============================================================================
// CacheKey
// =============================================================================

/// Identity of a cached artifact: rewrite mode plus canonical
/// context-relative document path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    mode: RewriteMode,
    path: String,
}

impl CacheKey {
    /// Create a key for the given mode and document path.
    pub fn new(mode: RewriteMode, path: impl Into<String>) -> Self {
        Self {
            mode,
            path: path.into(),
        }
    }

    /// The rewrite mode.
    pub fn mode(&self) -> RewriteMode {
        self.mode
    }

    /// The canonical context-relative document path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header() {
        assert_eq!(RewriteMode::from_header(Some("true")), RewriteMode::Enabled);
        assert_eq!(RewriteMode::from_header(Some("TRUE")), RewriteMode::Enabled);
        assert_eq!(
            RewriteMode::from_header(Some("false")),
            RewriteMode::Disabled
        );
        assert_eq!(
            RewriteMode::from_header(Some("False")),
            RewriteMode::Disabled
        );
        assert_eq!(RewriteMode::from_header(Some("yes")), RewriteMode::Default);
        assert_eq!(RewriteMode::from_header(Some("")), RewriteMode::Default);
        assert_eq!(RewriteMode::from_header(None), RewriteMode::Default);
    }

    #[test]
    fn test_rewrites() {
        assert!(RewriteMode::Enabled.rewrites());
        assert!(RewriteMode::Default.rewrites());
        assert!(!RewriteMode::Disabled.rewrites());
    }

    #[test]
    fn test_key_distinct_by_mode() {
        let enabled = CacheKey::new(RewriteMode::Enabled, "/css/site.css");
        let disabled = CacheKey::new(RewriteMode::Disabled, "/css/site.css");
        assert_ne!(enabled, disabled);
        assert_eq!(
            enabled,
            CacheKey::new(RewriteMode::Enabled, "/css/site.css")
        );
    }
}
