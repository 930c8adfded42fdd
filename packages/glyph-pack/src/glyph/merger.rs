//! Cell directory to atlas recomposition, cached by composite file hash

use std::fs;
use std::path::{Path, PathBuf};

use image::{RgbaImage, imageops};

use crate::cache::{CacheKey, CompositeKey, HashingCache};
use crate::error::{GlyphPackError, PackResult};
use crate::types::{CellId, GRID_SIZE, PNG_EXTENSION};

/// Smallest cell side a merged atlas is built with
pub const MIN_CELL_SIZE: u32 = 2;

/// Result of merging one cell directory
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub cell_dir: PathBuf,
    pub path: PathBuf,
    pub key: CacheKey,
    pub cache_hit: bool,
    pub cell_count: usize,
}

/// Merge counters for one merger instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergerStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Cell images decoded on cache misses
    pub decoded_cells: u64,
}

/// Reassembles `<CellId>.png` directories into atlases stored in a [`HashingCache`]
#[derive(Debug, Clone)]
pub struct GlyphMerger {
    cache: HashingCache,
    stats: MergerStats,
}

impl GlyphMerger {
    pub fn new(cache: HashingCache) -> Self {
        Self {
            cache,
            stats: MergerStats::default(),
        }
    }

    #[inline]
    pub fn stats(&self) -> MergerStats {
        self.stats
    }

    /// Cell files of a directory, ordered by raw file name bytes
    ///
    /// The order feeds the composite key, so `0B.png` sorts before `0a.png`
    /// even though its cell comes later in the grid.
    pub fn list_cells(cell_dir: &Path) -> PackResult<Vec<(CellId, PathBuf)>> {
        let entries = fs::read_dir(cell_dir).map_err(|e| GlyphPackError::io_at(cell_dir, &e))?;

        let mut cells = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GlyphPackError::io_at(cell_dir, &e))?;
            let path = entry.path();
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let Some(cell) = CellId::from_file_name(&name) else {
                continue;
            };
            if path.is_file() {
                cells.push((name, cell, path));
            }
        }
        cells.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        Ok(cells
            .into_iter()
            .map(|(_, cell, path)| (cell, path))
            .collect())
    }

    /// Offset of a `width`x`height` cell inside its `cell_size` slot
    ///
    /// Vertical placement rounds with a half-pixel bias; merged output must
    /// stay bit-identical to existing atlases.
    #[inline]
    pub fn slot_offset(cell_size: u32, width: u32, height: u32) -> (u32, u32) {
        let x = cell_size.saturating_sub(width) / 2;
        let y = ((cell_size.saturating_sub(height) as f64 + 0.5) / 2.0).floor() as u32;
        (x, y)
    }

    /// Compose decoded cells onto a fresh transparent atlas
    pub fn compose(cells: &[(CellId, RgbaImage)]) -> RgbaImage {
        let cell_size = cells
            .iter()
            .map(|(_, image)| image.width().max(image.height()))
            .fold(MIN_CELL_SIZE, u32::max);

        let mut canvas = RgbaImage::new(cell_size * GRID_SIZE, cell_size * GRID_SIZE);
        for (cell, image) in cells {
            let (dx, dy) = Self::slot_offset(cell_size, image.width(), image.height());
            let x = cell.col() * cell_size + dx;
            let y = cell.row() * cell_size + dy;
            imageops::replace(&mut canvas, image, i64::from(x), i64::from(y));
        }
        canvas
    }

    /// Merge the cells under `cell_dir`, reusing a cached atlas when the
    /// cell files are unchanged
    pub fn merge(&mut self, cell_dir: &Path) -> PackResult<MergeOutcome> {
        let cells = Self::list_cells(cell_dir)?;
        let composite = CompositeKey::of_files(cells.iter().map(|(_, path)| path.clone()))?;

        if let Some(path) = self.cache.lookup(&composite.key, PNG_EXTENSION) {
            self.stats.cache_hits += 1;
            log::debug!("Atlas for {} is cached at {}", cell_dir.display(), path.display());
            return Ok(MergeOutcome {
                cell_dir: cell_dir.to_path_buf(),
                path,
                key: composite.key,
                cache_hit: true,
                cell_count: cells.len(),
            });
        }

        let mut decoded = Vec::with_capacity(cells.len());
        for (cell, path) in &cells {
            decoded.push((*cell, super::decode_rgba(path)?));
            self.stats.decoded_cells += 1;
        }

        let atlas = Self::compose(&decoded);
        let target = self.cache.path(&composite.key, PNG_EXTENSION);
        let bytes = super::encode_png(&atlas).map_err(|e| GlyphPackError::write_at(&target, e))?;
        let path = self
            .cache
            .store(&composite.key, PNG_EXTENSION, &bytes)
            .map_err(|e| GlyphPackError::write_at(&target, e))?;
        self.stats.cache_misses += 1;

        log::debug!(
            "Merged {} cells from {} into {}",
            cells.len(),
            cell_dir.display(),
            path.display()
        );

        Ok(MergeOutcome {
            cell_dir: cell_dir.to_path_buf(),
            path,
            key: composite.key,
            cache_hit: false,
            cell_count: cells.len(),
        })
    }
}
