use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::manifest::{AddonManifest, ManifestConfig};
use crate::cache::{CacheKey, CompositeKey, HashingCache};
use crate::error::{GlyphPackError, PackResult};
use crate::types::GroupId;

pub const ARCHIVE_EXTENSION: &str = "zip";

pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Result of one addon build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub path: PathBuf,
    pub key: CacheKey,
    pub cache_hit: bool,
    pub groups: Vec<GroupId>,
}

/// Packages merged atlases and a manifest into a cached zip addon
#[derive(Debug, Clone)]
pub struct AddonBuilder {
    cache: HashingCache,
    manifest: ManifestConfig,
}

impl AddonBuilder {
    pub fn new(cache: HashingCache, manifest: ManifestConfig) -> Self {
        Self { cache, manifest }
    }

    /// Composite key over the atlases in group order
    pub fn composite(atlases: &BTreeMap<GroupId, PathBuf>) -> PackResult<CompositeKey> {
        CompositeKey::of_files(atlases.values().cloned())
            .map_err(|e| GlyphPackError::packaging("atlas hashing", e))
    }

    /// Build (or reuse) the addon for `atlases`
    pub fn build(&self, atlases: &BTreeMap<GroupId, PathBuf>) -> PackResult<BuildOutcome> {
        let composite = Self::composite(atlases)?;
        self.build_composite(atlases, composite)
    }

    /// Build (or reuse) the addon for `atlases` whose key was already
    /// computed with [`AddonBuilder::composite`]
    pub fn build_composite(
        &self,
        atlases: &BTreeMap<GroupId, PathBuf>,
        composite: CompositeKey,
    ) -> PackResult<BuildOutcome> {
        let groups: Vec<GroupId> = atlases.keys().copied().collect();

        if let Some(path) = self.cache.lookup(&composite.key, ARCHIVE_EXTENSION) {
            log::debug!("Addon is cached at {}", path.display());
            return Ok(BuildOutcome {
                path,
                key: composite.key,
                cache_hit: true,
                groups,
            });
        }

        let path = self.write_archive(atlases, &composite)?;
        log::info!("Built addon with {} glyph groups: {}", groups.len(), path.display());

        Ok(BuildOutcome {
            path,
            key: composite.key,
            cache_hit: false,
            groups,
        })
    }

    fn write_archive(
        &self,
        atlases: &BTreeMap<GroupId, PathBuf>,
        composite: &CompositeKey,
    ) -> PackResult<PathBuf> {
        // Fixed timestamps keep archives byte-identical across runs
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let staged = self
            .cache
            .stage()
            .map_err(|e| GlyphPackError::packaging("archive creation", e))?;
        let mut zip = ZipWriter::new(staged);

        for (group, atlas) in atlases {
            let entry = group.archive_entry();
            let bytes = fs::read(atlas).map_err(|e| {
                GlyphPackError::packaging(&format!("reading {}", atlas.display()), e)
            })?;
            zip.start_file(entry.as_str(), options)?;
            zip.write_all(&bytes)
                .map_err(|e| GlyphPackError::packaging(&format!("adding {entry}"), e))?;
        }

        let manifest = AddonManifest::for_content(&self.manifest, composite)?.to_json()?;
        zip.start_file(MANIFEST_ENTRY, options)?;
        zip.write_all(manifest.as_bytes())
            .map_err(|e| GlyphPackError::packaging("adding manifest", e))?;

        let staged = zip.finish()?;
        self.cache
            .commit(staged, &composite.key, ARCHIVE_EXTENSION)
            .map_err(|e| GlyphPackError::packaging("archive commit", e))
    }
}
