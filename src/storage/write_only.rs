//! Write-only filesystem stores
//!
//! For artifacts produced for outside consumption (rendered docs, exports),
//! never read back through a store. Both variants resolve paths under a base
//! directory and create intermediate directories on demand.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};
use super::filesystem::{resolve_base_directory, write_atomic};

/// Configuration shared by both write-only stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOnlyStoreConfig {
    pub base_directory: String,
}

fn check_segment(segment: &str) -> StoreResult<()> {
    if segment.is_empty() || segment == "." || segment == ".." || segment.contains(['/', '\\']) {
        return Err(StoreError::InvalidKey(format!(
            "'{}' is not a valid path segment",
            segment
        )));
    }
    Ok(())
}

fn join_segments<'a>(base: &Path, segments: impl IntoIterator<Item = &'a str>) -> StoreResult<PathBuf> {
    let mut path = base.to_path_buf();
    let mut any = false;

    for segment in segments {
        check_segment(segment)?;
        path.push(segment);
        any = true;
    }

    if !any {
        return Err(StoreError::InvalidKey("empty path".to_string()));
    }
    Ok(path)
}

/// Write-only store addressed by `/`-delimited relative paths
#[derive(Debug)]
pub struct FileSystemWriteOnlyStore {
    base_directory: PathBuf,
}

impl FileSystemWriteOnlyStore {
    pub fn new(config: &WriteOnlyStoreConfig, root_directory: Option<&Path>) -> StoreResult<Self> {
        Ok(Self {
            base_directory: resolve_base_directory(&config.base_directory, root_directory)?,
        })
    }

    /// Writes `value` to `path_fragment`, e.g. `"a/b/index.html"`
    pub fn set(&self, path_fragment: &str, value: impl AsRef<[u8]>) -> StoreResult<PathBuf> {
        let path = join_segments(&self.base_directory, path_fragment.split('/'))?;
        tracing::debug!(path = %path.display(), "write-only set");
        write_atomic(&path, value.as_ref())?;
        Ok(path)
    }
}

/// Write-only store addressed by a sequence of path segments
#[derive(Debug)]
pub struct DelimitedFileSystemWriteOnlyStore {
    base_directory: PathBuf,
}

impl DelimitedFileSystemWriteOnlyStore {
    pub fn new(config: &WriteOnlyStoreConfig, root_directory: Option<&Path>) -> StoreResult<Self> {
        Ok(Self {
            base_directory: resolve_base_directory(&config.base_directory, root_directory)?,
        })
    }

    /// Writes `value` to the file named by `segments`, joined with the platform separator
    pub fn set<S: AsRef<str>>(&self, segments: &[S], value: impl AsRef<[u8]>) -> StoreResult<PathBuf> {
        let path = join_segments(&self.base_directory, segments.iter().map(|s| s.as_ref()))?;
        tracing::debug!(path = %path.display(), "write-only set");
        write_atomic(&path, value.as_ref())?;
        Ok(path)
    }
}
