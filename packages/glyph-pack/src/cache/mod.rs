//! Content-addressed artifact store
//!
//! Every derived artifact (merged atlas, packaged addon) lives in one flat
//! directory under `<digest>.<extension>`. A file existing at the derived
//! path is the only validity check: entries are never re-read, compared by
//! size or mtime, or evicted. The directory is treated as append-only; all
//! writes go through a temporary file and a rename so no entry is ever
//! visible half-written.

pub mod key;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub use key::{CacheKey, CompositeKey};
use tempfile::NamedTempFile;

use crate::error::{GlyphPackError, PackResult};

/// Flat `<digest>.<ext>` file store
#[derive(Debug, Clone)]
pub struct HashingCache {
    root: PathBuf,
}

impl HashingCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache directory; returns `true` if it did not exist before
    pub fn ensure_dir(&self) -> PackResult<bool> {
        if self.root.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(&self.root).map_err(|e| GlyphPackError::io_at(&self.root, &e))?;
        Ok(true)
    }

    /// Location of an entry, whether or not it exists
    #[inline]
    pub fn path(&self, key: &CacheKey, extension: &str) -> PathBuf {
        self.root.join(key.file_name(extension))
    }

    /// Whether an entry exists; contents are not inspected
    #[inline]
    pub fn has(&self, key: &CacheKey, extension: &str) -> bool {
        self.path(key, extension).is_file()
    }

    /// Existing entry path, if any
    pub fn lookup(&self, key: &CacheKey, extension: &str) -> Option<PathBuf> {
        let path = self.path(key, extension);
        path.is_file().then_some(path)
    }

    /// Write an entry from bytes and return its path
    pub fn store(&self, key: &CacheKey, extension: &str, bytes: &[u8]) -> PackResult<PathBuf> {
        let mut staged = self.stage()?;
        staged
            .write_all(bytes)
            .map_err(|e| GlyphPackError::io_at(staged.path(), &e))?;
        self.commit(staged, key, extension)
    }

    /// Store only when absent; returns `true` if the entry was written
    pub fn seed(&self, key: &CacheKey, extension: &str, bytes: &[u8]) -> PackResult<bool> {
        if self.has(key, extension) {
            return Ok(false);
        }
        self.store(key, extension, bytes)?;
        Ok(true)
    }

    /// Temporary file inside the cache directory, for writers that stream
    /// their output (see [`HashingCache::commit`])
    pub fn stage(&self) -> PackResult<NamedTempFile> {
        tempfile::Builder::new()
            .prefix(".staging-")
            .tempfile_in(&self.root)
            .map_err(|e| GlyphPackError::io_at(&self.root, &e))
    }

    /// Move a staged file into place under `key`
    pub fn commit(
        &self,
        staged: NamedTempFile,
        key: &CacheKey,
        extension: &str,
    ) -> PackResult<PathBuf> {
        let path = self.path(key, extension);
        staged.persist(&path)?;
        log::debug!("Cached {}", path.display());
        Ok(path)
    }
}
