//! Map-backed resources.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{RewriteError, RewriteResult};
use crate::resource::{MetadataProvider, ResourceReader};

struct MemoryEntry {
    bytes: Vec<u8>,
    modified: i64,
}

/// In-memory resources with explicit modification times.
///
/// Useful for embedded assets and for tests that need to control mtimes
/// precisely. Clones share the same underlying map, so a clone handed to a
/// cache observes later [`insert`](MemoryResources::insert) and
/// [`set_modified`](MemoryResources::set_modified) calls.
#[derive(Default, Clone)]
pub struct MemoryResources {
    inner: Arc<RwLock<FxHashMap<String, MemoryEntry>>>,
}

impl MemoryResources {
    /// Create an empty resource map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text resource with the given modification time.
    pub fn insert(&self, path: impl Into<String>, content: impl AsRef<str>, modified: i64) {
        self.insert_bytes(path, content.as_ref().as_bytes().to_vec(), modified);
    }

    /// Insert a binary resource with the given modification time.
    pub fn insert_bytes(&self, path: impl Into<String>, content: impl Into<Vec<u8>>, modified: i64) {
        self.inner.write().insert(
            path.into(),
            MemoryEntry {
                bytes: content.into(),
                modified,
            },
        );
    }

    /// Change the modification time of an existing resource.
    ///
    /// Returns `false` when the path is not present.
    pub fn set_modified(&self, path: &str, modified: i64) -> bool {
        match self.inner.write().get_mut(path) {
            Some(entry) => {
                entry.modified = modified;
                true
            }
            None => false,
        }
    }

    /// Remove a resource. Returns `true` when it was present.
    pub fn remove(&self, path: &str) -> bool {
        self.inner.write().remove(path).is_some()
    }

    /// Check if a path exists.
    pub fn contains(&self, path: &str) -> bool {
        self.inner.read().contains_key(path)
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl MetadataProvider for MemoryResources {
    fn last_modified(&self, path: &str) -> i64 {
        self.inner.read().get(path).map_or(0, |e| e.modified)
    }
}

impl ResourceReader for MemoryResources {
    fn open(&self, path: &str) -> RewriteResult<Vec<u8>> {
        self.inner
            .read()
            .get(path)
            .map(|e| e.bytes.clone())
            .ok_or_else(|| RewriteError::NotFound {
                path: path.to_string(),
            })
    }
}
