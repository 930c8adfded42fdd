//! Separation/merge round trips and cache-key behaviour of the merger

use std::fs;
use std::path::{Path, PathBuf};

use glyph_pack::{
    CacheKey, CompositeKey, GlyphMerger, GlyphSeparator, HashingCache, MergerStats,
};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn setup() -> (TempDir, HashingCache) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let cache = HashingCache::new(dir.path().join(".cache"));
    cache.ensure_dir().unwrap();
    (dir, cache)
}

/// Atlas where every pixel is translucent, so no cell is dropped
fn translucent_atlas(side: u32) -> RgbaImage {
    RgbaImage::from_fn(side, side, |x, y| {
        Rgba([
            (x * 5) as u8,
            (y * 5) as u8,
            ((x + y) % 256) as u8,
            ((x * 7 + y * 3) % 120) as u8,
        ])
    })
}

fn separate_into(dir: &Path, name: &str, atlas: &RgbaImage) -> PathBuf {
    let atlas_path = dir.join(format!("{name}.png"));
    atlas.save(&atlas_path).unwrap();
    let cells = dir.join(name);
    GlyphSeparator::separate(&atlas_path, &cells).unwrap();
    cells
}

#[test]
fn test_separate_then_merge_round_trip() {
    let (dir, cache) = setup();
    let original = translucent_atlas(48);
    let cells = separate_into(dir.path(), "glyph_20", &original);
    assert_eq!(fs::read_dir(&cells).unwrap().count(), 256);

    let mut merger = GlyphMerger::new(cache);
    let outcome = merger.merge(&cells).unwrap();
    let merged = image::open(&outcome.path).unwrap().into_rgba8();

    assert_eq!(merged.dimensions(), original.dimensions());
    assert_eq!(merged.as_raw(), original.as_raw());
}

#[test]
fn test_round_trip_drops_opaque_cells_only() {
    let (dir, cache) = setup();
    let mut original = translucent_atlas(32);
    // make cell (row 4, col 9) opaque everywhere
    for y in 8..10 {
        for x in 18..20 {
            original.put_pixel(x, y, Rgba([1, 2, 3, 255]));
        }
    }
    let cells = separate_into(dir.path(), "glyph_21", &original);
    assert!(!cells.join("49.png").exists());

    let merged = image::open(GlyphMerger::new(cache).merge(&cells).unwrap().path)
        .unwrap()
        .into_rgba8();
    for (x, y, pixel) in merged.enumerate_pixels() {
        if (18..20).contains(&x) && (8..10).contains(&y) {
            assert_eq!(pixel.0[3], 0, "dropped cell is transparent");
        } else {
            assert_eq!(pixel, original.get_pixel(x, y));
        }
    }
}

#[test]
fn test_second_merge_is_pure_cache_hit() {
    let (dir, cache) = setup();
    let cells = separate_into(dir.path(), "glyph_30", &translucent_atlas(16));

    let mut merger = GlyphMerger::new(cache);
    let first = merger.merge(&cells).unwrap();
    let after_first = merger.stats();
    let mtime = fs::metadata(&first.path).unwrap().modified().unwrap();

    let second = merger.merge(&cells).unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.path, first.path);
    assert_eq!(fs::metadata(&second.path).unwrap().modified().unwrap(), mtime);
    assert_eq!(
        merger.stats(),
        MergerStats {
            cache_hits: 1,
            decoded_cells: after_first.decoded_cells,
            ..after_first
        }
    );
}

#[test]
fn test_corrupt_cached_atlas_is_returned_as_is() {
    let (dir, cache) = setup();
    let cells = separate_into(dir.path(), "glyph_31", &translucent_atlas(16));

    let listed = GlyphMerger::list_cells(&cells).unwrap();
    let key = CompositeKey::of_files(listed.into_iter().map(|(_, p)| p))
        .unwrap()
        .key;
    fs::write(cache.path(&key, "png"), b"hand placed garbage").unwrap();

    let mut merger = GlyphMerger::new(cache);
    let outcome = merger.merge(&cells).unwrap();
    assert!(outcome.cache_hit);
    assert_eq!(fs::read(&outcome.path).unwrap(), b"hand placed garbage");
    assert_eq!(merger.stats().decoded_cells, 0);
}

#[test]
fn test_one_byte_change_only_misses_its_own_group() {
    let (dir, cache) = setup();
    let mut other = translucent_atlas(16);
    other.put_pixel(0, 0, Rgba([9, 9, 9, 9]));
    let changed = separate_into(dir.path(), "glyph_40", &translucent_atlas(16));
    let untouched = separate_into(dir.path(), "glyph_41", &other);

    let mut merger = GlyphMerger::new(cache.clone());
    let before_changed = merger.merge(&changed).unwrap();
    let before_untouched = merger.merge(&untouched).unwrap();

    let cell = changed.join("00.png");
    let mut bytes = fs::read(&cell).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&cell, bytes).unwrap();

    let listed = GlyphMerger::list_cells(&changed).unwrap();
    let new_key = CompositeKey::of_files(listed.into_iter().map(|(_, p)| p))
        .unwrap()
        .key;
    assert_ne!(new_key, before_changed.key);
    assert!(!cache.has(&new_key, "png"), "changed group misses the cache");
    assert!(cache.has(&before_changed.key, "png"), "old entry is left alone");

    let again = merger.merge(&untouched).unwrap();
    assert!(again.cache_hit);
    assert_eq!(again.path, before_untouched.path);
}

#[test]
fn test_single_digit_cell_names_merge_into_canonical_slots() {
    let (dir, cache) = setup();
    let cells = dir.path().join("glyph_50");
    fs::create_dir(&cells).unwrap();
    let ink = Rgba([255, 0, 0, 200]);
    RgbaImage::from_pixel(4, 4, ink).save(cells.join("a.png")).unwrap();

    let outcome = GlyphMerger::new(cache).merge(&cells).unwrap();
    let merged = image::open(&outcome.path).unwrap().into_rgba8();

    assert_eq!(merged.dimensions(), (64, 64));
    // cell 0A is row 0, col 10
    assert_eq!(*merged.get_pixel(40, 0), ink);
    assert_eq!(merged.get_pixel(39, 0).0[3], 0);
    assert_eq!(outcome.cell_count, 1);
    assert_ne!(outcome.key, CacheKey::compute(b""));
}
