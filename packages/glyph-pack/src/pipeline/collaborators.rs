//! Host-supplied collaborators
//!
//! The pipeline owns no process-wide state. Bundled assets and archive
//! delivery come from whoever calls [`run`](super::run).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{GlyphPackError, PackResult};

/// Source of bundled default assets
pub trait ResourceReader {
    fn read_resource(&self, name: &str) -> PackResult<Vec<u8>>;
}

/// Consumer of the finished addon archive
pub trait RegistrationSink {
    fn register_pack(&mut self, archive: &Path) -> PackResult<()>;
}

/// Resources stored as files under one directory
#[derive(Debug, Clone)]
pub struct DirResources {
    root: PathBuf,
}

impl DirResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceReader for DirResources {
    fn read_resource(&self, name: &str) -> PackResult<Vec<u8>> {
        let relative = Path::new(name);
        if relative.is_absolute() || relative.components().any(|c| c.as_os_str() == "..") {
            return Err(GlyphPackError::resource(
                name,
                "resource names must stay inside the resource root",
            ));
        }
        std::fs::read(self.root.join(relative)).map_err(|e| GlyphPackError::resource(name, e))
    }
}

/// In-memory resources, for embedding hosts and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryResources {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }
}

impl ResourceReader for MemoryResources {
    fn read_resource(&self, name: &str) -> PackResult<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| GlyphPackError::resource(name, "not bundled"))
    }
}

/// Sink that only logs the archive location
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRegistration;

impl RegistrationSink for LogRegistration {
    fn register_pack(&mut self, archive: &Path) -> PackResult<()> {
        log::info!("Addon ready for registration: {}", archive.display());
        Ok(())
    }
}

/// Sink that remembers every registered archive
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    registered: Vec<PathBuf>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn registered(&self) -> &[PathBuf] {
        &self.registered
    }
}

impl RegistrationSink for RecordingSink {
    fn register_pack(&mut self, archive: &Path) -> PackResult<()> {
        self.registered.push(archive.to_path_buf());
        Ok(())
    }
}
