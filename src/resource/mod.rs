//! Resource access abstraction.
//!
//! The rewriter core never touches storage directly. It talks to two
//! injected collaborators:
//!
//! - [`MetadataProvider`] answers "when was this path last modified?"
//!   (`0` = unknown/absent, never an error).
//! - [`ResourceReader`] loads document bytes and is where absence and
//!   I/O failures surface.
//!
//! Two implementations ship with the crate: [`DiskResources`] serves a
//! directory tree, [`MemoryResources`] serves an in-memory map (embedded
//! assets, tests).

mod disk;
mod memory;

pub use disk::DiskResources;
pub use memory::MemoryResources;

use crate::error::RewriteResult;

/// Source of resource modification times.
///
/// Paths are canonical context-relative paths starting with `/`. A return
/// of `0` means unknown or absent; providers fold their own lookup errors
/// to `0` rather than failing.
pub trait MetadataProvider: Send + Sync {
    /// Modification time of `path` in epoch milliseconds, or `0` when
    /// unknown.
    fn last_modified(&self, path: &str) -> i64;
}

/// Source of resource bytes.
pub trait ResourceReader: Send + Sync {
    /// Read the resource at the given canonical context-relative path.
    ///
    /// # Errors
    ///
    /// [`RewriteError::NotFound`](crate::RewriteError::NotFound) when the
    /// resource does not exist, [`RewriteError::Io`](crate::RewriteError::Io)
    /// for any other read failure.
    fn open(&self, path: &str) -> RewriteResult<Vec<u8>>;
}
