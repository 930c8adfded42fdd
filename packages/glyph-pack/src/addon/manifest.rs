//! Addon `manifest.json` model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{CacheKey, CompositeKey};
use crate::error::{GlyphPackError, PackResult};

/// Manifest schema version written into every addon
pub const FORMAT_VERSION: u32 = 2;

/// Module type carried by font addons
pub const RESOURCES_MODULE: &str = "resources";

/// Format a 128-bit digest as a hyphenated UUID string.
///
/// The digest bits are kept verbatim, so the same digest always yields the
/// same identifier.
pub fn derive_id(key: &CacheKey) -> PackResult<String> {
    let uuid = Uuid::parse_str(key.as_str())
        .map_err(|e| GlyphPackError::packaging("identifier derivation", e))?;
    Ok(uuid.hyphenated().to_string())
}

/// Fixed descriptive fields of generated manifests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub name: String,
    pub description: String,
    pub version: [u32; 3],
    pub min_engine_version: [u32; 3],
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            name: "UnicodeFont".to_string(),
            description: "Unicode font addon built automatically by Unicode FontLoader plug-in"
                .to_string(),
            version: [1, 0, 0],
            min_engine_version: [1, 20, 0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub name: String,
    pub description: String,
    pub uuid: String,
    pub version: [u32; 3],
    pub min_engine_version: [u32; 3],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestModule {
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub uuid: String,
    pub version: [u32; 3],
}

/// Complete `manifest.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonManifest {
    pub format_version: u32,
    pub header: ManifestHeader,
    pub modules: Vec<ManifestModule>,
}

impl AddonManifest {
    /// Build the manifest for an addon whose atlases hash to `composite`
    pub fn for_content(config: &ManifestConfig, composite: &CompositeKey) -> PackResult<Self> {
        let module_key = composite.derive(RESOURCES_MODULE);

        Ok(Self {
            format_version: FORMAT_VERSION,
            header: ManifestHeader {
                name: config.name.clone(),
                description: config.description.clone(),
                uuid: derive_id(&composite.key)?,
                version: config.version,
                min_engine_version: config.min_engine_version,
            },
            modules: vec![ManifestModule {
                description: config.description.clone(),
                kind: RESOURCES_MODULE.to_string(),
                uuid: derive_id(&module_key)?,
                version: config.version,
            }],
        })
    }

    /// Compact UTF-8 JSON; serde_json leaves `/` and non-ASCII unescaped
    pub fn to_json(&self) -> PackResult<String> {
        serde_json::to_string(self).map_err(|e| GlyphPackError::packaging("manifest encoding", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_id_is_hyphenated_digest() {
        let key = CacheKey::parse("902010d76c4f95ba4f59a412b97b5327").unwrap();
        assert_eq!(
            derive_id(&key).unwrap(),
            "902010d7-6c4f-95ba-4f59-a412b97b5327"
        );
    }

    #[test]
    fn test_derive_id_is_pure() {
        let key = CacheKey::compute(b"same input");
        assert_eq!(derive_id(&key).unwrap(), derive_id(&key.clone()).unwrap());
    }

    #[test]
    fn test_manifest_json_shape() {
        let composite = CompositeKey {
            source: "abc".to_string(),
            key: CacheKey::compute(b"abc"),
        };
        let manifest = AddonManifest::for_content(&ManifestConfig::default(), &composite).unwrap();
        let json = manifest.to_json().unwrap();

        assert!(json.starts_with(r#"{"format_version":2,"header":{"name":"UnicodeFont""#));
        assert!(json.contains(r#""type":"resources""#));
        assert!(json.contains(r#""min_engine_version":[1,20,0]"#));
        assert!(!json.contains("\\/"));

        let module_id = derive_id(&CacheKey::compute(b"abcresources")).unwrap();
        assert_eq!(manifest.modules[0].uuid, module_id);
        assert_ne!(manifest.header.uuid, module_id);
    }
}
