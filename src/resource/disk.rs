//! Filesystem-backed resources.

use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{RewriteError, RewriteResult};
use crate::resource::{MetadataProvider, ResourceReader};

/// Resources served from a directory tree.
///
/// Context-relative paths map under the root: `/css/site.css` reads
/// `<root>/css/site.css`. Paths that try to climb out of the root (parent
/// segments, absolute components) read as absent rather than escaping.
#[derive(Debug, Clone)]
pub struct DiskResources {
    root: PathBuf,
}

impl DiskResources {
    /// Create a provider rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a context-relative path to a filesystem path within the root.
    ///
    /// Returns `None` for any component that would leave the root.
    fn locate(&self, path: &str) -> Option<PathBuf> {
        let relative = path.strip_prefix('/').unwrap_or(path);
        let mut located = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(segment) => located.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(located)
    }
}

impl MetadataProvider for DiskResources {
    fn last_modified(&self, path: &str) -> i64 {
        let Some(file) = self.locate(path) else {
            return 0;
        };
        match fs::metadata(&file) {
            Ok(metadata) if metadata.is_file() => match metadata.modified() {
                Ok(time) => DateTime::<Utc>::from(time).timestamp_millis(),
                Err(_) => 0,
            },
            _ => 0,
        }
    }
}

impl ResourceReader for DiskResources {
    fn open(&self, path: &str) -> RewriteResult<Vec<u8>> {
        let Some(file) = self.locate(path) else {
            return Err(RewriteError::NotFound {
                path: path.to_string(),
            });
        };
        let metadata = fs::metadata(&file).map_err(|e| RewriteError::from_io(e, path))?;
        if !metadata.is_file() {
            return Err(RewriteError::NotFound {
                path: path.to_string(),
            });
        }
        fs::read(&file).map_err(|e| RewriteError::from_io(e, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, DiskResources) {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/site.css"), "body {}").unwrap();
        let resources = DiskResources::new(dir.path());
        (dir, resources)
    }

    #[test]
    fn test_open_reads_bytes() {
        let (_dir, resources) = fixture();
        assert_eq!(resources.open("/css/site.css").unwrap(), b"body {}");
    }

    #[test]
    fn test_open_missing_is_not_found() {
        let (_dir, resources) = fixture();
        let err = resources.open("/css/other.css").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_open_directory_is_not_found() {
        let (_dir, resources) = fixture();
        assert!(resources.open("/css").unwrap_err().is_not_found());
    }

    #[test]
    fn test_last_modified_nonzero_for_file() {
        let (_dir, resources) = fixture();
        assert!(resources.last_modified("/css/site.css") > 0);
    }

    #[test]
    fn test_last_modified_zero_for_missing() {
        let (_dir, resources) = fixture();
        assert_eq!(resources.last_modified("/css/other.css"), 0);
        assert_eq!(resources.last_modified("/css"), 0);
    }

    #[test]
    fn test_traversal_contained() {
        let (dir, resources) = fixture();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();
        assert_eq!(resources.last_modified("/css/../../secret.txt"), 0);
        assert!(resources.open("/../secret.txt").unwrap_err().is_not_found());
    }
}
