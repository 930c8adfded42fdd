use std::path::PathBuf;

use thiserror::Error;

/// Glyph pipeline errors, split by how far their damage reaches
#[derive(Error, Debug, Clone)]
pub enum GlyphPackError {
    /// Atlas is not square, empty, or its side is not a multiple of 16
    #[error("Invalid atlas geometry {width}x{height} in {}: {reason}", path.display())]
    InvalidGeometry {
        path: PathBuf,
        width: u32,
        height: u32,
        reason: &'static str,
    },

    /// An image file could not be read or decoded
    #[error("Failed to decode {}: {message}", path.display())]
    DecodeFailure { path: PathBuf, message: String },

    /// A derived image could not be persisted
    #[error("Failed to write {}: {message}", path.display())]
    WriteFailure { path: PathBuf, message: String },

    /// The addon archive could not be built
    #[error("Packaging failed: {0}")]
    PackagingFailure(String),

    /// Filesystem error outside of image handling
    #[error("I/O error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// Invalid pipeline configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A bundled resource could not be read
    #[error("Resource '{name}' unavailable: {message}")]
    Resource { name: String, message: String },

    /// The registration collaborator rejected the archive
    #[error("Registration failed: {0}")]
    Registration(String),
}

/// Result type alias for pipeline operations
pub type PackResult<T> = Result<T, GlyphPackError>;

/// Error severity levels, mirroring how the orchestrator reacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// One item failed; the run continues with the next one
    Item,
    /// The run cannot produce a valid archive
    Fatal,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Item => write!(f, "ITEM"),
            ErrorSeverity::Fatal => write!(f, "FATAL"),
        }
    }
}

impl GlyphPackError {
    /// Get the severity level of this error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GlyphPackError::InvalidGeometry { .. } => ErrorSeverity::Item,
            GlyphPackError::DecodeFailure { .. } => ErrorSeverity::Item,
            GlyphPackError::WriteFailure { .. } => ErrorSeverity::Item,
            GlyphPackError::PackagingFailure(_) => ErrorSeverity::Fatal,
            GlyphPackError::Io { .. } => ErrorSeverity::Fatal,
            GlyphPackError::Config(_) => ErrorSeverity::Fatal,
            GlyphPackError::Resource { .. } => ErrorSeverity::Fatal,
            GlyphPackError::Registration(_) => ErrorSeverity::Fatal,
        }
    }

    /// Whether this error aborts the whole run
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }

    /// Get error category as string
    pub fn category(&self) -> &'static str {
        match self {
            GlyphPackError::InvalidGeometry { .. } => "invalid_geometry",
            GlyphPackError::DecodeFailure { .. } => "decode",
            GlyphPackError::WriteFailure { .. } => "write",
            GlyphPackError::PackagingFailure(_) => "packaging",
            GlyphPackError::Io { .. } => "io",
            GlyphPackError::Config(_) => "config",
            GlyphPackError::Resource { .. } => "resource",
            GlyphPackError::Registration(_) => "registration",
        }
    }
}
