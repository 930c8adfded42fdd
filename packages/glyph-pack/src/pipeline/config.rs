//! Pipeline configuration

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::addon::ManifestConfig;
use crate::cache::CacheKey;
use crate::error::{GlyphPackError, PackResult};
use crate::types::GroupId;

/// Bundled atlas written into a freshly created atlas directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAtlas {
    /// Resource name passed to the [`ResourceReader`](super::ResourceReader)
    pub resource: String,
    pub group: GroupId,
}

/// Bundled atlas copied verbatim into a freshly created cache directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSeed {
    pub resource: String,
    /// Composite key under which the merger will look the atlas up
    pub digest: CacheKey,
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory scanned for `glyph_XX.png` atlases and `glyph_XX/` cell directories
    pub atlas_dir: PathBuf,
    /// Content-addressed store for merged atlases and addons
    pub cache_dir: PathBuf,
    pub default_atlases: Vec<DefaultAtlas>,
    pub cache_seeds: Vec<CacheSeed>,
    /// Addon key of the stock atlases; matching addons are not registered
    pub default_pack_digest: Option<CacheKey>,
    pub manifest: ManifestConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            atlas_dir: PathBuf::from("resource_packs/fonts"),
            cache_dir: PathBuf::from(".cache"),
            default_atlases: Vec::new(),
            cache_seeds: Vec::new(),
            default_pack_digest: None,
            manifest: ManifestConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; absent fields take their defaults
    pub fn from_json_file(path: &Path) -> PackResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GlyphPackError::io_at(path, &e))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| GlyphPackError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PackResult<()> {
        if self.atlas_dir.as_os_str().is_empty() {
            return Err(GlyphPackError::config_field("atlas_dir", "must not be empty"));
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(GlyphPackError::config_field("cache_dir", "must not be empty"));
        }
        if self.atlas_dir == self.cache_dir {
            return Err(GlyphPackError::config_field(
                "cache_dir",
                "must differ from atlas_dir",
            ));
        }

        let mut groups = HashSet::new();
        for atlas in &self.default_atlases {
            if !groups.insert(atlas.group) {
                return Err(GlyphPackError::config_field(
                    "default_atlases",
                    format!("group {} listed twice", atlas.group),
                ));
            }
        }
        Ok(())
    }

    pub fn builder(
        atlas_dir: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
    ) -> PipelineConfigBuilder {
        PipelineConfigBuilder::new(atlas_dir, cache_dir)
    }
}

/// Fluent builder for [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new(atlas_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: PipelineConfig {
                atlas_dir: atlas_dir.into(),
                cache_dir: cache_dir.into(),
                ..PipelineConfig::default()
            },
        }
    }

    /// Seed a new atlas directory with `resource` as group `group`
    #[inline]
    pub fn with_default_atlas(mut self, resource: impl Into<String>, group: GroupId) -> Self {
        self.config.default_atlases.push(DefaultAtlas {
            resource: resource.into(),
            group,
        });
        self
    }

    /// Seed a new cache directory with `resource` stored as `<digest>.png`
    #[inline]
    pub fn with_cache_seed(mut self, resource: impl Into<String>, digest: CacheKey) -> Self {
        self.config.cache_seeds.push(CacheSeed {
            resource: resource.into(),
            digest,
        });
        self
    }

    #[inline]
    pub fn with_default_pack_digest(mut self, digest: CacheKey) -> Self {
        self.config.default_pack_digest = Some(digest);
        self
    }

    #[inline]
    pub fn with_manifest(mut self, manifest: ManifestConfig) -> Self {
        self.config.manifest = manifest;
        self
    }

    /// The stock E0/E1 unicode font atlases, their pre-merged cache entries,
    /// and the addon key they produce
    pub fn with_bundled_defaults(self) -> PackResult<Self> {
        Ok(self
            .with_default_atlas("glyph_E0.png", GroupId::new(0xE0))
            .with_default_atlas("glyph_E1.png", GroupId::new(0xE1))
            .with_cache_seed("glyph_E0.png", CacheKey::parse("ad4aeeba5a240136a0f599d0aabfdcb8")?)
            .with_cache_seed("glyph_E1.png", CacheKey::parse("1f8c1a31a544a7052b12b037c77a5116")?)
            .with_default_pack_digest(CacheKey::parse("902010d76c4f95ba4f59a412b97b5327")?))
    }

    pub fn build(self) -> PackResult<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_validates() {
        assert!(PipelineConfig::builder("fonts", "fonts").build().is_err());
        assert!(PipelineConfig::builder("", ".cache").build().is_err());

        let duplicated = PipelineConfig::builder("fonts", ".cache")
            .with_default_atlas("a.png", GroupId::new(1))
            .with_default_atlas("b.png", GroupId::new(1))
            .build();
        assert!(matches!(duplicated, Err(GlyphPackError::Config(_))));
    }

    #[test]
    fn test_bundled_defaults() {
        let config = PipelineConfig::builder("fonts", ".cache")
            .with_bundled_defaults()
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.default_atlases.len(), 2);
        assert_eq!(config.cache_seeds.len(), 2);
        assert!(config.default_pack_digest.is_some());
    }

    #[test]
    fn test_json_round_trip_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "atlas_dir": "fonts",
                "cache_seeds": [{
                    "resource": "glyph_E0.png",
                    "digest": "ad4aeeba5a240136a0f599d0aabfdcb8"
                }],
                "default_atlases": [{ "resource": "glyph_E0.png", "group": "e0" }],
                "manifest": { "name": "CustomFont" }
            }"#,
        )
        .unwrap();

        let config = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(config.atlas_dir, PathBuf::from("fonts"));
        assert_eq!(config.cache_dir, PathBuf::from(".cache"));
        assert_eq!(config.default_atlases[0].group, GroupId::new(0xE0));
        assert_eq!(config.manifest.name, "CustomFont");
        assert_eq!(config.manifest.min_engine_version, [1, 20, 0]);
    }

    #[test]
    fn test_json_rejects_malformed_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_pack_digest": "not-a-digest" }"#).unwrap();
        assert!(matches!(
            PipelineConfig::from_json_file(&path),
            Err(GlyphPackError::Config(_))
        ));
    }
}
