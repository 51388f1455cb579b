//! Reference resolution and local/external classification.
//!
//! A reference is resolved against its enclosing document's canonical
//! context-relative path. References that resolve to a path rooted at the
//! serving context (`/...`) are local and may receive a freshness
//! parameter; everything else — scheme-qualified URLs, protocol-relative
//! URLs, and relative paths that climb out of the root — is external and
//! left untouched.

use percent_encoding::percent_decode_str;

use crate::error::{RewriteError, RewriteResult};

/// Classification of a reference target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A local resource. Carries the canonical context-relative path:
    /// dot segments collapsed, percent-encoding decoded. This is the path
    /// used for metadata lookups and dependency keys.
    Local(String),
    /// Not served from the local context; contributes no dependency and
    /// receives no freshness parameter.
    External,
}

/// Resolve a reference target against the enclosing document's path.
///
/// `target` is the quote- and fragment-stripped reference text as produced
/// by the scanner; any query string is split off here and ignored for
/// resolution. `document_path` must be a canonical context-relative path
/// starting with `/`.
///
/// # Errors
///
/// Returns [`RewriteError::MalformedReference`] when a local target carries
/// invalid percent-encoding or does not decode to UTF-8.
pub fn classify(document_path: &str, target: &str) -> RewriteResult<Target> {
    let path_part = match target.find('?') {
        Some(pos) => &target[..pos],
        None => target,
    };

    if has_scheme(path_part) || path_part.starts_with("//") {
        return Ok(Target::External);
    }

    let candidate = if path_part.starts_with('/') {
        path_part.to_string()
    } else {
        let dir_end = document_path.rfind('/').map_or(0, |pos| pos + 1);
        format!("{}{}", &document_path[..dir_end], path_part)
    };
    if !candidate.starts_with('/') {
        return Ok(Target::External);
    }

    let Some(collapsed) = collapse_segments(&candidate) else {
        // `..` climbed out of the root.
        return Ok(Target::External);
    };

    let malformed = |reason: String| RewriteError::MalformedReference {
        document: document_path.to_string(),
        reference: target.to_string(),
        reason,
    };
    validate_percent(&collapsed).map_err(&malformed)?;
    let decoded = percent_decode_str(&collapsed)
        .decode_utf8()
        .map_err(|_| malformed("percent-encoded bytes are not valid UTF-8".to_string()))?;
    Ok(Target::Local(decoded.into_owned()))
}

/// Whether the target starts with a URI scheme (`scheme:`).
fn has_scheme(target: &str) -> bool {
    let mut chars = target.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for c in chars {
        match c {
            ':' => return true,
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-') => {}
            _ => return false,
        }
    }
    false
}

/// Collapse `.`, `..`, and empty segments of an absolute path.
///
/// Returns `None` when a `..` pops past the root. A trailing slash (or a
/// trailing dot segment) keeps the result directory-shaped.
fn collapse_segments(candidate: &str) -> Option<String> {
    let mut stack: Vec<&str> = Vec::new();
    for segment in candidate.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            other => stack.push(other),
        }
    }

    let mut out = String::with_capacity(candidate.len());
    for segment in &stack {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    } else if candidate.ends_with('/') || candidate.ends_with("/.") || candidate.ends_with("/..") {
        out.push('/');
    }
    Some(out)
}

/// Reject `%` sequences that are not followed by two hex digits.
fn validate_percent(path: &str) -> Result<(), String> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return Err(format!("invalid percent-encoding at byte {i}"));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}
