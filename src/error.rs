//! Crate error type.

use std::io;
use std::path::Path;

use thiserror::Error;

/// A result with the crate's error type.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Error type for document loading and reference rewriting.
///
/// Absence (`NotFound`) is deliberately distinct from other I/O failures:
/// callers map it to a client-visible "missing resource" outcome, while
/// `Io` is an internal error. Neither is ever cached.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The source document or a scanned resource cannot be found.
    #[error("resource not found: {path}")]
    NotFound {
        /// Context-relative path of the missing resource.
        path: String,
    },

    /// A reference could not be resolved into a valid path.
    #[error("malformed reference `{reference}` in {document}: {reason}")]
    MalformedReference {
        /// Context-relative path of the document containing the reference.
        document: String,
        /// The reference text as written.
        reference: String,
        /// What made it unresolvable.
        reason: String,
    },

    /// The document bytes are not valid UTF-8.
    #[error("document is not valid UTF-8: {path}")]
    InvalidUtf8 {
        /// Context-relative path of the document.
        path: String,
    },

    /// An underlying read failed for a reason other than absence.
    #[error("I/O error reading {path}")]
    Io {
        /// Context-relative path of the resource being read.
        path: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
}

impl RewriteError {
    /// Map an I/O error for the given resource, folding
    /// [`io::ErrorKind::NotFound`] into [`RewriteError::NotFound`].
    pub fn from_io(source: io::Error, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().display().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Whether this error is the absence of a resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
