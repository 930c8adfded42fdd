//! Atlas decomposition and recomposition
//!
//! - [`GlyphSeparator`] splits a square atlas into its non-empty 16x16 grid cells
//! - [`GlyphMerger`] reassembles a directory of cells into one cached atlas

pub mod merger;
pub mod separator;

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, RgbaImage};

pub use merger::{GlyphMerger, MergeOutcome, MergerStats};
pub use separator::{CONTENT_ALPHA_THRESHOLD, GlyphSeparator, SeparationReport};

use crate::error::{GlyphPackError, PackResult};

/// Decode any supported image file into RGBA8
pub(crate) fn decode_rgba(path: &Path) -> PackResult<RgbaImage> {
    let image = image::open(path).map_err(|e| GlyphPackError::decode_at(path, e))?;
    Ok(image.into_rgba8())
}

/// Encode an RGBA8 buffer as PNG bytes
pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
