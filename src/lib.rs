//! # stylemod
//!
//! A dependency-aware rewrite cache for stylesheet-like text assets.
//!
//! The cache parses a document, finds `url(...)` references, appends a
//! `lastModified` cache-busting parameter to each local reference, and
//! memoizes the rewritten output — invalidating only when the document or
//! any referenced resource changes. Replaced assets become visible to
//! browsers immediately while the referencing document keeps long-lived
//! cache-control headers.
//!
//! What this crate does **not** do, by design:
//!
//! - No HTTP handling, header injection, or configuration loading — those
//!   belong to the serving layer, which injects its decisions (the
//!   [`RewriteMode`]) into every call.
//! - No grammar-correct CSS parsing: the reference scan is a deliberately
//!   limited lexical pass (see [`scan`]).
//! - No recursive rewriting: a referenced document that is itself a
//!   stylesheet is treated as a leaf.
//! - No eviction: the cache grows with the set of distinct
//!   `(mode, path)` keys served and lives until dropped.
//!
//! ## Quick Start
//!
//! ```ignore
//! use stylemod::{DiskResources, RewriteCache, RewriteMode};
//!
//! // One cache per application, built at startup.
//! let resources = DiskResources::new("/var/www/webapp");
//! let cache = RewriteCache::new(resources.clone(), resources);
//!
//! // Per request: mode comes from the boundary, e.g. a request header.
//! let mode = RewriteMode::from_header(request.header("X-Rewrite-Enabled"));
//! let artifact = cache.rewritten("/css/site.css", mode)?;
//! respond(artifact.bytes(), artifact.newest_modified());
//! ```
//!
//! ## Modules
//!
//! - [`cache`]: the concurrent dependency-aware store
//! - [`rewrite`]: document reassembly
//! - [`scan`]: lexical `url(...)` extraction
//! - [`resolve`]: reference resolution and local/external classification
//! - [`freshness`]: the stable parameter name and timestamp encoding
//! - [`resource`]: collaborator traits plus disk/memory implementations
//! - [`key`]: rewrite mode and cache key types

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod freshness;
pub mod key;
pub mod resolve;
pub mod resource;
pub mod rewrite;
pub mod scan;

// =============================================================================
// Prelude - import commonly used items with a single `use`
// =============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use stylemod::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CacheKey, DiskResources, MemoryResources, MetadataProvider, ParsedArtifact, ResourceReader,
        RewriteCache, RewriteError, RewriteMode, RewriteResult,
    };
}

// =============================================================================
// Core API
// =============================================================================

pub use cache::{ParsedArtifact, RewriteCache};
pub use error::{RewriteError, RewriteResult};
pub use key::{CacheKey, RewriteMode};

// =============================================================================
// Collaborators
// =============================================================================

pub use resource::{DiskResources, MemoryResources, MetadataProvider, ResourceReader};

// =============================================================================
// Wire contract
// =============================================================================

pub use freshness::{LAST_MODIFIED_PARAMETER, encode_last_modified};
