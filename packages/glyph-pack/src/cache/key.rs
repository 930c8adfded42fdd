//! MD5 cache keys and the hash-of-hashes rule for file sets

use std::fmt;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::{GlyphPackError, PackResult};

/// Lowercase hex MD5 digest naming one cache entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheKey(String);

impl CacheKey {
    /// Hex digest length of a 128-bit hash
    pub const HEX_LEN: usize = 32;

    /// Hash raw bytes
    pub fn compute(bytes: impl AsRef<[u8]>) -> Self {
        Self(format!("{:x}", Md5::digest(bytes.as_ref())))
    }

    /// Hash the raw contents of a file
    pub fn of_file(path: &Path) -> PackResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| GlyphPackError::io_at(path, &e))?;
        Ok(Self::compute(bytes))
    }

    /// Wrap an existing digest, validating its shape
    pub fn parse(text: &str) -> PackResult<Self> {
        if text.len() == Self::HEX_LEN
            && text
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            Ok(Self(text.to_string()))
        } else {
            Err(GlyphPackError::Config(format!(
                "cache key must be {} lowercase hex digits: {:?}",
                Self::HEX_LEN,
                text
            )))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cache file name `<digest>.<extension>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0, extension)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CacheKey {
    type Error = GlyphPackError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

/// Per-file digests of an ordered file set, plus their combined key
///
/// `source` is the concatenation of every file digest in enumeration
/// order and `key` is the hash of that string. Identifiers derived from
/// the same inputs need `source` as well as `key`.
#[derive(Debug, Clone)]
pub struct CompositeKey {
    pub source: String,
    pub key: CacheKey,
}

impl CompositeKey {
    /// Hash an ordered set of files
    pub fn of_files<I, P>(paths: I) -> PackResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut source = String::new();
        for path in paths {
            let path: PathBuf = path.into();
            source.push_str(CacheKey::of_file(&path)?.as_str());
        }

        Ok(Self {
            key: CacheKey::compute(source.as_bytes()),
            source,
        })
    }

    /// Key derived from `source` with a suffix appended
    pub fn derive(&self, suffix: &str) -> CacheKey {
        CacheKey::compute(format!("{}{}", self.source, suffix))
    }
}
