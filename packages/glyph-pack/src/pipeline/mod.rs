//! Directory-driven pipeline
//!
//! One run walks `Bootstrapping -> Separating -> Merging -> Packaging -> Done`
//! over a single atlas directory and cache directory. Separation and merge
//! failures are per item: they are logged, recorded in the [`RunReport`] and
//! the run moves on. Bootstrap and packaging failures end the run.
//!
//! Runs are synchronous and must not overlap on the same directories.

pub mod collaborators;
pub mod config;
pub mod orchestrator;
pub mod report;

pub use collaborators::{
    DirResources, LogRegistration, MemoryResources, RecordingSink, RegistrationSink,
    ResourceReader,
};
pub use config::{CacheSeed, DefaultAtlas, PipelineConfig, PipelineConfigBuilder};
pub use orchestrator::{Orchestrator, run};
pub use report::{ItemFailure, RunReport, RunStage};
