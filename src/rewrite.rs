//! Document reassembly with freshness parameters.
//!
//! The engine copies everything outside matched reference tokens verbatim
//! — surrounding quotes included, since the token span excludes them —
//! and re-emits each token with the parameter spliced in before the
//! fragment. Only local references with a known modification time gain a
//! parameter and become dependencies.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::error::RewriteResult;
use crate::freshness::{LAST_MODIFIED_PARAMETER, encode_last_modified};
use crate::key::RewriteMode;
use crate::resolve::{self, Target};
use crate::resource::MetadataProvider;
use crate::scan;

/// Result of rewriting one document.
#[derive(Debug)]
pub struct RewriteOutcome {
    /// The fully reassembled document.
    pub bytes: Vec<u8>,
    /// Resolved local reference path → modification time captured during
    /// this parse. These are the entries the cache re-checks for staleness.
    pub dependencies: FxHashMap<String, i64>,
}

/// Rewrite a document's local references, capturing dependencies.
///
/// Non-reference content is preserved byte for byte. With a
/// [`Disabled`](RewriteMode::Disabled) mode no parameter is appended and
/// no dependencies are recorded, which makes the reassembly a textual
/// no-op: the output equals the input.
///
/// # Errors
///
/// Propagates [`MalformedReference`](crate::RewriteError::MalformedReference)
/// from reference resolution; the document is then not usable under this
/// parse and nothing is cached.
pub fn rewrite_document<M: MetadataProvider + ?Sized>(
    metadata: &M,
    document_path: &str,
    text: &str,
    mode: RewriteMode,
) -> RewriteResult<RewriteOutcome> {
    let mut out = String::with_capacity(text.len() * 2);
    let mut dependencies = FxHashMap::default();
    let mut last_end = 0;

    for reference in scan::references(text) {
        out.push_str(&text[last_end..reference.span.start]);
        out.push_str(reference.target);
        if mode.rewrites()
            && let Target::Local(path) = resolve::classify(document_path, reference.target)?
        {
            let modified = metadata.last_modified(&path);
            trace!(
                reference = reference.target,
                resolved = %path,
                modified,
                "local reference"
            );
            if modified != 0 {
                out.push(if reference.target.contains('?') { '&' } else { '?' });
                out.push_str(LAST_MODIFIED_PARAMETER);
                out.push('=');
                out.push_str(&encode_last_modified(modified));
                dependencies.insert(path, modified);
            }
        }
        if let Some(fragment) = reference.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        last_end = reference.span.end;
    }
    out.push_str(&text[last_end..]);

    Ok(RewriteOutcome {
        bytes: out.into_bytes(),
        dependencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MemoryResources;

    const X_PNG_MODIFIED: i64 = 1_700_000_000_000;

    fn fixture() -> MemoryResources {
        let resources = MemoryResources::new();
        resources.insert_bytes("/images/x.png", vec![0u8; 4], X_PNG_MODIFIED);
        resources.insert_bytes("/shared/x.png", vec![0u8; 4], X_PNG_MODIFIED);
        resources
    }

    fn rewrite(document: &str, text: &str, mode: RewriteMode) -> String {
        let outcome = rewrite_document(&fixture(), document, text, mode).unwrap();
        String::from_utf8(outcome.bytes).unwrap()
    }

    #[test]
    fn test_local_reference_gains_parameter() {
        let out = rewrite(
            "/css/site.css",
            ".a { background: url(/images/x.png); }",
            RewriteMode::Default,
        );
        assert_eq!(
            out,
            ".a { background: url(/images/x.png?lastModified=1il7s80); }"
        );
    }

    #[test]
    fn test_existing_query_uses_ampersand() {
        let out = rewrite(
            "/css/site.css",
            "url('/images/x.png?v=2')",
            RewriteMode::Default,
        );
        // The parameter lands inside the preserved quotes.
        assert_eq!(out, "url('/images/x.png?v=2&lastModified=1il7s80')");
    }

    #[test]
    fn test_external_reference_unchanged() {
        let out = rewrite(
            "/css/site.css",
            "url(http://example.com/x.png)",
            RewriteMode::Default,
        );
        assert_eq!(out, "url(http://example.com/x.png)");
    }

    #[test]
    fn test_unknown_resource_unchanged() {
        let outcome = rewrite_document(
            &fixture(),
            "/css/site.css",
            "url(/missing.png)",
            RewriteMode::Default,
        )
        .unwrap();
        assert_eq!(outcome.bytes, b"url(/missing.png)");
        assert!(outcome.dependencies.is_empty());
    }

    #[test]
    fn test_fragment_after_parameter() {
        let out = rewrite(
            "/css/site.css",
            "url(../shared/x.png#frag)",
            RewriteMode::Default,
        );
        assert_eq!(out, "url(/shared/x.png?lastModified=1il7s80#frag)");
    }

    #[test]
    fn test_no_reference_identity() {
        let text = ".a { color: red; }\n/* url-free */\n";
        let outcome =
            rewrite_document(&fixture(), "/css/site.css", text, RewriteMode::Default).unwrap();
        assert_eq!(outcome.bytes, text.as_bytes());
        assert!(outcome.dependencies.is_empty());
    }

    #[test]
    fn test_surrounding_text_preserved() {
        let out = rewrite(
            "/css/site.css",
            "before url( '/images/x.png' ) after",
            RewriteMode::Default,
        );
        assert_eq!(
            out,
            "before url( '/images/x.png?lastModified=1il7s80' ) after"
        );
    }

    #[test]
    fn test_dependencies_captured() {
        let outcome = rewrite_document(
            &fixture(),
            "/css/site.css",
            "url(/images/x.png) url(../shared/x.png) url(http://example.com/y.png)",
            RewriteMode::Default,
        )
        .unwrap();
        assert_eq!(outcome.dependencies.len(), 2);
        assert_eq!(outcome.dependencies["/images/x.png"], X_PNG_MODIFIED);
        assert_eq!(outcome.dependencies["/shared/x.png"], X_PNG_MODIFIED);
    }

    #[test]
    fn test_disabled_mode_is_identity() {
        let text = "url('/images/x.png#frag')";
        let outcome =
            rewrite_document(&fixture(), "/css/site.css", text, RewriteMode::Disabled).unwrap();
        assert_eq!(outcome.bytes, text.as_bytes());
        assert!(outcome.dependencies.is_empty());
    }

    #[test]
    fn test_enabled_matches_default() {
        let text = "url(/images/x.png)";
        assert_eq!(
            rewrite("/css/site.css", text, RewriteMode::Enabled),
            rewrite("/css/site.css", text, RewriteMode::Default)
        );
    }

    #[test]
    fn test_malformed_reference_fails_parse() {
        let err = rewrite_document(
            &fixture(),
            "/css/site.css",
            "url(/images/x%zz.png)",
            RewriteMode::Default,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::RewriteError::MalformedReference { .. }
        ));
    }
}
