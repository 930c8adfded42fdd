//! Atlas to cell decomposition

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage, imageops};

use crate::error::{GlyphPackError, PackResult};
use crate::types::{CellId, GRID_SIZE};

/// Pixels with alpha strictly below this value mark a cell as having content.
///
/// A cell that is opaque everywhere counts as empty and is dropped.
pub const CONTENT_ALPHA_THRESHOLD: u8 = 127;

/// What one separation produced
#[derive(Debug, Clone)]
pub struct SeparationReport {
    pub atlas: PathBuf,
    pub output_dir: PathBuf,
    pub atlas_size: u32,
    pub cell_size: u32,
    /// Cells written, in row-major order
    pub cells: Vec<CellId>,
}

/// Splits square glyph atlases into 16x16 cells
pub struct GlyphSeparator;

impl GlyphSeparator {
    /// Validate atlas dimensions and return the side of one cell
    pub fn cell_size(path: &Path, width: u32, height: u32) -> PackResult<u32> {
        if width != height {
            return Err(GlyphPackError::geometry(path, width, height, "atlas must be square"));
        }
        if width == 0 || width % GRID_SIZE != 0 {
            return Err(GlyphPackError::geometry(
                path,
                width,
                height,
                "atlas side must be a positive multiple of 16",
            ));
        }
        Ok(width / GRID_SIZE)
    }

    /// Whether the `size`-square region at `(x0, y0)` holds any content pixel
    #[inline]
    pub fn has_content(atlas: &RgbaImage, x0: u32, y0: u32, size: u32) -> bool {
        for x in x0..x0 + size {
            for y in y0..y0 + size {
                if atlas.get_pixel(x, y).0[3] < CONTENT_ALPHA_THRESHOLD {
                    return true;
                }
            }
        }
        false
    }

    /// Extract every non-empty cell of an in-memory atlas
    ///
    /// `path` only labels errors.
    pub fn scan(path: &Path, atlas: &RgbaImage) -> PackResult<Vec<(CellId, RgbaImage)>> {
        let size = Self::cell_size(path, atlas.width(), atlas.height())?;

        let cells = CellId::all()
            .filter_map(|cell| {
                let (x, y) = (cell.col() * size, cell.row() * size);
                Self::has_content(atlas, x, y, size)
                    .then(|| (cell, imageops::crop_imm(atlas, x, y, size, size).to_image()))
            })
            .collect();
        Ok(cells)
    }

    /// Decompose the atlas at `atlas_path` into `<CellId>.png` files in `output_dir`
    pub fn separate(atlas_path: &Path, output_dir: &Path) -> PackResult<SeparationReport> {
        let atlas = super::decode_rgba(atlas_path)?;
        let cells = Self::scan(atlas_path, &atlas)?;

        fs::create_dir_all(output_dir).map_err(|e| GlyphPackError::write_at(output_dir, e))?;

        let mut written = Vec::with_capacity(cells.len());
        let mut failures = Vec::new();
        for (cell, image) in &cells {
            let path = output_dir.join(cell.file_name());
            match image.save_with_format(&path, ImageFormat::Png) {
                Ok(()) => written.push(*cell),
                Err(e) => {
                    log::warn!("Failed to write glyph cell {}: {}", path.display(), e);
                    failures.push(GlyphPackError::write_at(&path, e));
                }
            }
        }

        if let Some(first) = failures.into_iter().next() {
            return Err(first);
        }

        log::debug!(
            "Separated {} into {} cells of {}px",
            atlas_path.display(),
            written.len(),
            atlas.width() / GRID_SIZE
        );

        Ok(SeparationReport {
            atlas: atlas_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            atlas_size: atlas.width(),
            cell_size: atlas.width() / GRID_SIZE,
            cells: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    const OPAQUE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const INK: Rgba<u8> = Rgba([10, 20, 30, 0]);

    fn opaque_atlas(side: u32) -> RgbaImage {
        RgbaImage::from_pixel(side, side, OPAQUE)
    }

    #[test]
    fn test_geometry_validation() {
        let path = Path::new("glyph_E0.png");
        assert_eq!(GlyphSeparator::cell_size(path, 64, 64).unwrap(), 4);
        assert!(matches!(
            GlyphSeparator::cell_size(path, 64, 48),
            Err(GlyphPackError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            GlyphSeparator::cell_size(path, 40, 40),
            Err(GlyphPackError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            GlyphSeparator::cell_size(path, 0, 0),
            Err(GlyphPackError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_fully_opaque_atlas_has_no_cells() {
        let cells = GlyphSeparator::scan(Path::new("a"), &opaque_atlas(32)).unwrap();
        assert!(cells.is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut atlas = opaque_atlas(16);
        atlas.put_pixel(0, 0, Rgba([0, 0, 0, CONTENT_ALPHA_THRESHOLD]));
        atlas.put_pixel(2, 0, Rgba([0, 0, 0, CONTENT_ALPHA_THRESHOLD - 1]));

        let cells = GlyphSeparator::scan(Path::new("a"), &atlas).unwrap();
        let ids: Vec<_> = cells.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![CellId::new(0x02)]);
    }

    #[test]
    fn test_cells_are_exact_crops_in_row_major_order() {
        let mut atlas = opaque_atlas(32);
        // cell (row 1, col 3) and cell (row 0, col 15)
        atlas.put_pixel(3 * 2 + 1, 2, INK);
        atlas.put_pixel(15 * 2, 1, INK);

        let cells = GlyphSeparator::scan(Path::new("a"), &atlas).unwrap();
        let ids: Vec<_> = cells.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["0F", "13"]);

        let (_, cell) = &cells[1];
        assert_eq!(cell.dimensions(), (2, 2));
        assert_eq!(*cell.get_pixel(1, 0), INK);
        assert_eq!(*cell.get_pixel(0, 0), OPAQUE);
    }

    #[test]
    fn test_separate_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let atlas_path = dir.path().join("glyph_E0.png");
        let mut atlas = opaque_atlas(64);
        atlas.put_pixel(4 * 10, 4 * 2, INK);
        atlas.save(&atlas_path).unwrap();

        let out = dir.path().join("glyph_E0");
        let report = GlyphSeparator::separate(&atlas_path, &out).unwrap();
        assert_eq!(report.cell_size, 4);
        assert_eq!(report.cells, vec![CellId::from_row_col(2, 10)]);
        assert!(out.join("2A.png").is_file());
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn test_invalid_geometry_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let atlas_path = dir.path().join("glyph_E0.png");
        RgbaImage::from_pixel(32, 16, INK).save(&atlas_path).unwrap();

        let out = dir.path().join("glyph_E0");
        let err = GlyphSeparator::separate(&atlas_path, &out).unwrap_err();
        assert_eq!(err.category(), "invalid_geometry");
        assert!(!out.exists());
    }

    #[test]
    fn test_unwritable_cell_is_write_failure_after_other_cells() {
        let dir = tempfile::tempdir().unwrap();
        let atlas_path = dir.path().join("glyph_E0.png");
        let mut atlas = opaque_atlas(32);
        atlas.put_pixel(0, 0, INK);
        atlas.put_pixel(2, 0, INK);
        atlas.save(&atlas_path).unwrap();

        let out = dir.path().join("glyph_E0");
        fs::create_dir_all(out.join("00.png")).unwrap();

        let err = GlyphSeparator::separate(&atlas_path, &out).unwrap_err();
        match &err {
            GlyphPackError::WriteFailure { path, .. } => assert_eq!(path, &out.join("00.png")),
            other => panic!("expected WriteFailure, got {other:?}"),
        }
        assert!(!err.is_fatal());
        assert!(out.join("01.png").is_file(), "remaining cells are still written");
    }

    #[test]
    fn test_undecodable_atlas() {
        let dir = tempfile::tempdir().unwrap();
        let atlas_path = dir.path().join("glyph_E0.png");
        fs::write(&atlas_path, b"definitely not png").unwrap();

        let err = GlyphSeparator::separate(&atlas_path, &dir.path().join("out")).unwrap_err();
        assert!(matches!(err, GlyphPackError::DecodeFailure { .. }));
    }
}
