use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::addon::BuildOutcome;
use crate::error::GlyphPackError;
use crate::glyph::{MergeOutcome, SeparationReport};
use crate::types::GroupId;

/// Stages of one run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStage {
    Bootstrapping,
    Separating,
    Merging,
    Packaging,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Bootstrapping => "bootstrapping",
            RunStage::Separating => "separating",
            RunStage::Merging => "merging",
            RunStage::Packaging => "packaging",
            RunStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A per-item error that was logged and skipped
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub stage: RunStage,
    pub path: PathBuf,
    pub error: GlyphPackError,
}

/// Everything one run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stage: RunStage,
    /// Default atlases written into a freshly created atlas directory
    pub seeded_atlases: Vec<GroupId>,
    /// Entries written into a freshly created cache directory
    pub seeded_cache_entries: usize,
    pub separated: Vec<SeparationReport>,
    pub merged: BTreeMap<GroupId, MergeOutcome>,
    pub archive: Option<BuildOutcome>,
    /// Merged atlases hash to the default addon key; nothing was built
    pub matched_default: bool,
    pub registered: bool,
    pub failures: Vec<ItemFailure>,
}

impl RunReport {
    pub(crate) fn new() -> Self {
        Self {
            stage: RunStage::Bootstrapping,
            seeded_atlases: Vec::new(),
            seeded_cache_entries: 0,
            separated: Vec::new(),
            merged: BTreeMap::new(),
            archive: None,
            matched_default: false,
            registered: false,
            failures: Vec::new(),
        }
    }

    #[inline]
    pub fn archive_path(&self) -> Option<&Path> {
        self.archive.as_ref().map(|a| a.path.as_path())
    }

    /// Merged atlas location per group
    pub fn atlas_paths(&self) -> BTreeMap<GroupId, PathBuf> {
        self.merged
            .iter()
            .map(|(group, outcome)| (*group, outcome.path.clone()))
            .collect()
    }

    /// No item was skipped
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
