//! Content-addressed glyph atlas pipeline
//!
//! Turns "glyph group" atlases (square PNGs holding a 16x16 grid of glyph
//! cells, one group per 256 codepoints) into a packaged font addon:
//!
//! - `glyph_XX.png` atlases are split into `glyph_XX/YY.png` cell images
//! - each cell directory is merged back into one atlas, cached by the hash
//!   of its cell files
//! - all atlases are zipped with a generated `manifest.json`, cached by the
//!   hash of the atlases, and handed to a registration sink
//!
//! Unchanged inputs produce cache hits at every stage, so rerunning over the
//! same directories returns the same archive without touching pixel data.
//!
//! # Example
//!
//! ```rust,no_run
//! use glyph_pack::{run, MemoryResources, PipelineConfig, RecordingSink};
//!
//! # fn example() -> Result<(), glyph_pack::GlyphPackError> {
//! let _ = env_logger::try_init();
//!
//! let config = PipelineConfig::builder("resource_packs/fonts", "plugin_data/.cache").build()?;
//! let mut sink = RecordingSink::new();
//! let report = run(&config, &MemoryResources::new(), &mut sink)?;
//!
//! if let Some(archive) = report.archive_path() {
//!     log::info!("Addon: {}", archive.display());
//! }
//! for failure in &report.failures {
//!     log::warn!("Skipped {}: {}", failure.path.display(), failure.error);
//! }
//! # Ok(())
//! # }
//! ```

pub mod addon;
pub mod cache;
mod error;
pub mod glyph;
pub mod pipeline;
pub mod types;

pub use addon::{AddonBuilder, AddonManifest, BuildOutcome, ManifestConfig, derive_id};
pub use cache::{CacheKey, CompositeKey, HashingCache};
pub use error::{ErrorSeverity, GlyphPackError, PackResult};
pub use glyph::{GlyphMerger, GlyphSeparator, MergeOutcome, MergerStats, SeparationReport};
pub use pipeline::{
    DirResources, ItemFailure, LogRegistration, MemoryResources, Orchestrator, PipelineConfig,
    PipelineConfigBuilder, RecordingSink, RegistrationSink, ResourceReader, RunReport, RunStage,
    run,
};
pub use types::{CellId, GroupId};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
