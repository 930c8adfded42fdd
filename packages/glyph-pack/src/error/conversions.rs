use std::path::Path;

use crate::error::types::GlyphPackError;

impl From<zip::result::ZipError> for GlyphPackError {
    fn from(error: zip::result::ZipError) -> Self {
        GlyphPackError::PackagingFailure(format!("zip: {}", error))
    }
}

impl From<tempfile::PersistError> for GlyphPackError {
    fn from(error: tempfile::PersistError) -> Self {
        GlyphPackError::io_at(error.file.path(), &error.error)
    }
}

/// Context constructors; most failures are only useful with the offending path attached
impl GlyphPackError {
    /// Create an Io error for a filesystem operation on `path`
    pub fn io_at(path: &Path, error: &std::io::Error) -> Self {
        GlyphPackError::Io {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create a DecodeFailure for the image at `path`
    pub fn decode_at(path: &Path, error: impl std::fmt::Display) -> Self {
        GlyphPackError::DecodeFailure {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create a WriteFailure for a derived image at `path`
    pub fn write_at(path: &Path, error: impl std::fmt::Display) -> Self {
        GlyphPackError::WriteFailure {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create an InvalidGeometry error
    pub fn geometry(path: &Path, width: u32, height: u32, reason: &'static str) -> Self {
        GlyphPackError::InvalidGeometry {
            path: path.to_path_buf(),
            width,
            height,
            reason,
        }
    }

    /// Create a PackagingFailure with operation context
    pub fn packaging(operation: &str, error: impl std::fmt::Display) -> Self {
        GlyphPackError::PackagingFailure(format!("{} failed: {}", operation, error))
    }

    /// Create a Config error naming the offending field
    pub fn config_field(field: &str, message: impl Into<String>) -> Self {
        GlyphPackError::Config(format!("'{}': {}", field, message.into()))
    }

    /// Create a Resource error for a bundled resource name
    pub fn resource(name: &str, error: impl std::fmt::Display) -> Self {
        GlyphPackError::Resource {
            name: name.to_string(),
            message: error.to_string(),
        }
    }
}
