//! Dependency-aware artifact cache.
//!
//! # Caching strategy
//!
//! ```text
//! RewriteCache
//! └── DashMap<CacheKey, Arc<ParsedArtifact>>
//!     └── ParsedArtifact
//!         ├── source_modified   ─┐
//!         ├── dependencies      ─┼── staleness check against current metadata
//!         ├── bytes              │
//!         └── newest_modified   ─┘
//! ```
//!
//! An artifact is reused only while the source document's modification
//! time and every captured dependency's modification time still match the
//! provider's current values. On miss or staleness the document is read,
//! rewritten, and the new artifact unconditionally replaces the old one.
//!
//! The check-reparse-store sequence is not atomic: two threads may both
//! observe staleness and reparse the same key, and the slower write wins.
//! Entries are pure re-derivations of current file state, so the race
//! costs duplicate work, never a wrong result. There is no per-key
//! locking, no eviction, and no memory bound; the map grows with the
//! number of distinct `(mode, path)` combinations served.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::{FxBuildHasher, FxHashMap};
use tracing::debug;

use crate::error::{RewriteError, RewriteResult};
use crate::key::{CacheKey, RewriteMode};
use crate::resource::{MetadataProvider, ResourceReader};
use crate::rewrite::{self, RewriteOutcome};

// =============================================================================
// ParsedArtifact
// =============================================================================

/// An immutable parse result: rewritten bytes plus the modification-time
/// snapshot that decides when it goes stale.
///
/// Artifacts are replaced, never mutated; they are reclaimed when
/// overwritten or when the owning cache is dropped.
#[derive(Debug)]
pub struct ParsedArtifact {
    source_modified: i64,
    bytes: Vec<u8>,
    dependencies: FxHashMap<String, i64>,
    newest_modified: i64,
}

impl ParsedArtifact {
    fn new(source_modified: i64, outcome: RewriteOutcome) -> Self {
        // Aggregate freshness comes from the same snapshot the staleness
        // check compares against, not a second metadata read.
        let newest_modified = outcome
            .dependencies
            .values()
            .copied()
            .fold(source_modified, i64::max);
        Self {
            source_modified,
            bytes: outcome.bytes,
            dependencies: outcome.dependencies,
            newest_modified,
        }
    }

    /// The fully rewritten document.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Modification time of the source document at parse time.
    pub fn source_modified(&self) -> i64 {
        self.source_modified
    }

    /// The newest modification time among the document and all captured
    /// dependencies.
    pub fn newest_modified(&self) -> i64 {
        self.newest_modified
    }

    /// Captured dependencies: resolved local path → modification time at
    /// parse time.
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, i64)> {
        self.dependencies.iter().map(|(path, t)| (path.as_str(), *t))
    }

    /// Whether this artifact still reflects current file state.
    fn is_current<M: MetadataProvider + ?Sized>(&self, metadata: &M, source_now: i64) -> bool {
        self.source_modified == source_now
            && self
                .dependencies
                .iter()
                .all(|(path, captured)| metadata.last_modified(path) == *captured)
    }
}

// =============================================================================
// RewriteCache
// =============================================================================

/// Concurrent cache of rewritten documents, keyed by `(mode, path)`.
///
/// Construct one instance at application start, share it across serving
/// threads, and drop it at shutdown; it is deliberately not ambient
/// global state.
pub struct RewriteCache<M, R> {
    metadata: M,
    reader: R,
    entries: DashMap<CacheKey, Arc<ParsedArtifact>, FxBuildHasher>,
}

impl<M: MetadataProvider, R: ResourceReader> RewriteCache<M, R> {
    /// Create an empty cache over the given collaborators.
    pub fn new(metadata: M, reader: R) -> Self {
        Self {
            metadata,
            reader,
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// Get the current artifact for a document, reparsing if needed.
    ///
    /// On a valid hit this performs no reader I/O and copies no bytes —
    /// the returned [`Arc`] shares the stored artifact. On miss or
    /// staleness the document is read, rewritten, and stored, replacing
    /// any previous entry under the same key.
    ///
    /// # Errors
    ///
    /// [`NotFound`](RewriteError::NotFound) when the source document is
    /// absent, [`InvalidUtf8`](RewriteError::InvalidUtf8) when it is not
    /// UTF-8 text, [`MalformedReference`](RewriteError::MalformedReference)
    /// when a reference cannot be resolved, and
    /// [`Io`](RewriteError::Io) for other read failures. Failures are
    /// never cached and never displace an existing entry.
    pub fn rewritten(&self, path: &str, mode: RewriteMode) -> RewriteResult<Arc<ParsedArtifact>> {
        let key = CacheKey::new(mode, path);
        let source_now = self.metadata.last_modified(path);

        // Clone the Arc out so no shard lock is held during metadata
        // lookups or the reparse.
        let cached = self.entries.get(&key).map(|entry| Arc::clone(entry.value()));
        if let Some(artifact) = cached
            && artifact.is_current(&self.metadata, source_now)
        {
            return Ok(artifact);
        }
        self.reparse(key, source_now)
    }

    /// Aggregate freshness for a document: the newest modification time of
    /// the document and everything it references.
    ///
    /// Returns `0` when the document is absent or unresolvable. On a
    /// cached hit no bytes are materialized; on miss the full reparse
    /// runs, so the rewritten bytes are ready for a following
    /// [`rewritten`](Self::rewritten) call.
    pub fn newest_modified(&self, path: &str, mode: RewriteMode) -> i64 {
        match self.rewritten(path, mode) {
            Ok(artifact) => artifact.newest_modified(),
            Err(_) => 0,
        }
    }

    /// Drop all cached artifacts.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of cached artifacts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reparse(&self, key: CacheKey, source_modified: i64) -> RewriteResult<Arc<ParsedArtifact>> {
        debug!(path = key.path(), mode = ?key.mode(), "reparsing document");
        let raw = self.reader.open(key.path())?;
        let text = String::from_utf8(raw).map_err(|_| RewriteError::InvalidUtf8 {
            path: key.path().to_string(),
        })?;
        let outcome = rewrite::rewrite_document(&self.metadata, key.path(), &text, key.mode())?;
        let artifact = Arc::new(ParsedArtifact::new(source_modified, outcome));
        // Unconditional insert: racing reparses are allowed and the last
        // write wins.
        self.entries.insert(key, Arc::clone(&artifact));
        Ok(artifact)
    }
}
