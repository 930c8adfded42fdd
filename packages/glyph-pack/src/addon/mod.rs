//! Addon packaging
//!
//! An addon is a zip archive holding one `font/glyph_<XX>.png` per glyph
//! group plus a `manifest.json`. Archives are cached by the composite hash
//! of their atlases and their identifiers are derived from that hash, so
//! unchanged inputs always yield the same archive.

pub mod builder;
pub mod manifest;

pub use builder::{ARCHIVE_EXTENSION, AddonBuilder, BuildOutcome, MANIFEST_ENTRY};
pub use manifest::{AddonManifest, ManifestConfig, ManifestHeader, ManifestModule, derive_id};
