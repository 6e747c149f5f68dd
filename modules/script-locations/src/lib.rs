//! Script locations: a directory tree or a zip/jar archive, scanned into an
//! ordered, duplicate-free catalog of scripts.

mod archive;
mod catalog;
mod filesystem;

pub use archive::{ArchiveLocation, ArchivePath};
pub use catalog::ScriptCatalog;
pub use filesystem::FilesystemLocation;

use dbmaintain_core::{Result, ScriptFactory};
use std::path::Path;

/// A configured source of scripts.
#[derive(Debug, Clone)]
pub enum ScriptLocation {
    Filesystem(FilesystemLocation),
    Archive(ArchiveLocation),
}

impl ScriptLocation {
    /// Directory if `descriptor` names one, otherwise an archive descriptor
    /// (`file.jar` or `file.jar!inner/root`).
    pub fn detect(descriptor: &str) -> Self {
        if Path::new(descriptor).is_dir() {
            ScriptLocation::Filesystem(FilesystemLocation::new(descriptor))
        } else {
            ScriptLocation::Archive(ArchiveLocation::new(descriptor))
        }
    }

    pub fn descriptor(&self) -> String {
        match self {
            ScriptLocation::Filesystem(l) => l.root().display().to_string(),
            ScriptLocation::Archive(l) => l.path().to_string(),
        }
    }

    pub fn scan(&self, factory: &ScriptFactory) -> Result<ScriptCatalog> {
        match self {
            ScriptLocation::Filesystem(l) => l.scan(factory),
            ScriptLocation::Archive(l) => l.scan(factory),
        }
    }
}
