//! Lexical `url(...)` reference extraction.
//!
//! The scan is deliberately limited: it matches `url( token )` with a
//! case-insensitive keyword, arbitrary whitespace around the token, and a
//! non-greedy non-whitespace token. It does not understand escape
//! sequences, nested parentheses, or parentheses inside quoted strings.
//! That is a stated design boundary of the rewriter, not a gap to close
//! with a grammar parser.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

/// The reference pattern.
///
/// Group 1 captures the raw token between the parentheses.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)url\s*\(\s*(\S+?)\s*\)").expect("url pattern is valid"));

/// A single `url(...)` match within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Byte range of the token within the document, with at most one layer
    /// of matching surrounding quotes excluded. Text outside these spans is
    /// copied verbatim by the rewrite engine.
    pub span: Range<usize>,
    /// The reference text with quotes and any `#fragment` stripped.
    /// Includes any query string.
    pub target: &'a str,
    /// Fragment text following the first `#`, without the `#` itself.
    pub fragment: Option<&'a str>,
}

/// Scan document text for `url(...)` references, in document order.
///
/// Pure function over the text; performs no I/O and records nothing.
pub fn references(text: &str) -> impl Iterator<Item = Reference<'_>> {
    URL_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let (start, end) = strip_quotes(text, m.start(), m.end());
            let token = &text[start..end];
            let (target, fragment) = match token.find('#') {
                Some(pos) => (&token[..pos], Some(&token[pos + 1..])),
                None => (token, None),
            };
            Reference {
                span: start..end,
                target,
                fragment,
            }
        })
}

/// Strip at most one layer of matching leading/trailing quotes.
fn strip_quotes(text: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = text.as_bytes();
    if end - start >= 2 {
        let first = bytes[start];
        if first == bytes[end - 1] && (first == b'"' || first == b'\'') {
            return (start + 1, end - 1);
        }
    }
    (start, end)
}
