use std::fs;
use std::path::{Path, PathBuf};

use super::collaborators::{RegistrationSink, ResourceReader};
use super::config::PipelineConfig;
use super::report::{ItemFailure, RunReport, RunStage};
use crate::addon::AddonBuilder;
use crate::cache::HashingCache;
use crate::error::{GlyphPackError, PackResult};
use crate::glyph::{GlyphMerger, GlyphSeparator};
use crate::types::{GroupId, PNG_EXTENSION};

/// Drives one pass over an atlas directory:
/// bootstrap, separate, merge, package, register.
pub struct Orchestrator<'a> {
    config: &'a PipelineConfig,
    cache: HashingCache,
    merger: GlyphMerger,
    resources: &'a dyn ResourceReader,
    registration: &'a mut dyn RegistrationSink,
    report: RunReport,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        resources: &'a dyn ResourceReader,
        registration: &'a mut dyn RegistrationSink,
    ) -> Self {
        let cache = HashingCache::new(&config.cache_dir);
        Self {
            config,
            merger: GlyphMerger::new(cache.clone()),
            cache,
            resources,
            registration,
            report: RunReport::new(),
        }
    }

    #[inline]
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    #[inline]
    pub fn stage(&self) -> RunStage {
        self.report.stage
    }

    /// Run every stage; per-item failures are collected in the report,
    /// anything else aborts the run
    pub fn run(mut self) -> PackResult<RunReport> {
        self.config.validate()?;
        self.bootstrap()?;
        self.separate_all()?;
        self.merge_all()?;
        self.package()?;
        Ok(self.report)
    }

    /// Ensure both directories exist, seeding them when newly created
    pub fn bootstrap(&mut self) -> PackResult<()> {
        self.report.stage = RunStage::Bootstrapping;
        let atlas_dir = &self.config.atlas_dir;

        if !atlas_dir.is_dir() {
            fs::create_dir_all(atlas_dir).map_err(|e| GlyphPackError::io_at(atlas_dir, &e))?;
            for default in &self.config.default_atlases {
                let bytes = self.resources.read_resource(&default.resource)?;
                let path = atlas_dir.join(default.group.atlas_file_name());
                fs::write(&path, bytes).map_err(|e| GlyphPackError::io_at(&path, &e))?;
                self.report.seeded_atlases.push(default.group);
            }
            log::info!(
                "Created {} with {} default glyph groups",
                atlas_dir.display(),
                self.report.seeded_atlases.len()
            );
        }

        if self.cache.ensure_dir()? {
            for seed in &self.config.cache_seeds {
                let bytes = self.resources.read_resource(&seed.resource)?;
                if self.cache.seed(&seed.digest, PNG_EXTENSION, &bytes)? {
                    self.report.seeded_cache_entries += 1;
                }
            }
            log::debug!(
                "Created cache {} with {} seeded entries",
                self.cache.root().display(),
                self.report.seeded_cache_entries
            );
        }
        Ok(())
    }

    /// Split every `glyph_XX.png` into its `glyph_XX/` cell directory
    pub fn separate_all(&mut self) -> PackResult<()> {
        self.report.stage = RunStage::Separating;

        for (name, path) in self.list_atlas_dir()? {
            let Some(group) = GroupId::from_atlas_file_name(&name) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }

            let output_dir = self.config.atlas_dir.join(group.dir_name());
            match GlyphSeparator::separate(&path, &output_dir) {
                Ok(separation) => {
                    if let Err(e) = fs::remove_file(&path) {
                        let error = GlyphPackError::io_at(&path, &e);
                        log::error!("Failed to remove separated glyph group image: {}", error);
                        self.record_failure(path.clone(), error);
                    } else {
                        log::info!("Separated glyph group image: {}", path.display());
                    }
                    self.report.separated.push(separation);
                }
                Err(error) => {
                    log::error!(
                        "Failed to separate glyph group image: {}, {}",
                        path.display(),
                        error
                    );
                    self.record_failure(path, error);
                }
            }
        }
        Ok(())
    }

    /// Merge every `glyph_XX/` directory into a cached atlas
    pub fn merge_all(&mut self) -> PackResult<()> {
        self.report.stage = RunStage::Merging;

        for (name, path) in self.list_atlas_dir()? {
            let Some(group) = GroupId::from_dir_name(&name) else {
                continue;
            };
            if !path.is_dir() {
                continue;
            }

            match self.merger.merge(&path) {
                Ok(outcome) => {
                    if self.report.merged.contains_key(&group) {
                        log::warn!(
                            "Glyph group {} appears twice, using {}",
                            group,
                            path.display()
                        );
                    }
                    self.report.merged.insert(group, outcome);
                }
                Err(error) => {
                    log::error!("Failed to merge glyph group {}: {}", path.display(), error);
                    self.record_failure(path, error);
                }
            }
        }
        Ok(())
    }

    /// Package merged atlases and hand the addon to the registration sink
    pub fn package(&mut self) -> PackResult<()> {
        self.report.stage = RunStage::Packaging;
        log::info!(
            "Load unicode font glyphs from: {}",
            self.config.atlas_dir.display()
        );

        if self.report.merged.is_empty() {
            log::info!("No glyph groups found, nothing to package");
            self.report.stage = RunStage::Done;
            return Ok(());
        }

        let atlases = self.report.atlas_paths();
        let composite = AddonBuilder::composite(&atlases)?;
        if self.config.default_pack_digest.as_ref() == Some(&composite.key) {
            log::info!("All font files are equal to the default, no need to build the addon");
            self.report.matched_default = true;
            self.report.stage = RunStage::Done;
            return Ok(());
        }

        let builder = AddonBuilder::new(self.cache.clone(), self.config.manifest.clone());
        let outcome = builder.build_composite(&atlases, composite)?;
        self.registration.register_pack(&outcome.path)?;
        self.report.registered = true;
        log::info!("Registered unicode font addon: {}", outcome.path.display());

        self.report.archive = Some(outcome);
        self.report.stage = RunStage::Done;
        Ok(())
    }

    fn record_failure(&mut self, path: PathBuf, error: GlyphPackError) {
        self.report.failures.push(ItemFailure {
            stage: self.report.stage,
            path,
            error,
        });
    }

    /// Atlas directory entries sorted by name
    fn list_atlas_dir(&self) -> PackResult<Vec<(String, PathBuf)>> {
        list_sorted(&self.config.atlas_dir)
    }
}

fn list_sorted(dir: &Path) -> PackResult<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| GlyphPackError::io_at(dir, &e))?;
    let mut listed = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GlyphPackError::io_at(dir, &e))?;
        // Non UTF-8 names can never match a glyph pattern
        if let Ok(name) = entry.file_name().into_string() {
            listed.push((name, entry.path()));
        }
    }
    listed.sort();
    Ok(listed)
}

/// Run the whole pipeline once against `config`
pub fn run(
    config: &PipelineConfig,
    resources: &dyn ResourceReader,
    registration: &mut dyn RegistrationSink,
) -> PackResult<RunReport> {
    Orchestrator::new(config, resources, registration).run()
}
