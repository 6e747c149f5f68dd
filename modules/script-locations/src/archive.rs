use dbmaintain_core::{Result, Script, ScriptError, ScriptFactory};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use time::{Date, Month, PrimitiveDateTime, Time};
use tracing::debug;

const MAX_PREALLOC: u64 = 1 << 20;

/// `archive.jar!inner/root` split into the archive file and the inner root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePath {
    pub archive: PathBuf,
    /// Without trailing `/`. `None` scans the whole archive.
    pub inner_root: Option<String>,
}

impl ArchivePath {
    pub fn parse(descriptor: &str) -> Self {
        match descriptor.split_once('!') {
            Some((archive, inner)) => {
                let inner = inner.trim_end_matches('/');
                ArchivePath {
                    archive: PathBuf::from(archive),
                    inner_root: (!inner.is_empty()).then(|| inner.to_string()),
                }
            }
            None => ArchivePath { archive: PathBuf::from(descriptor), inner_root: None },
        }
    }

    /// Name relative to the inner root, or `None` if the entry lies outside it.
    fn relative<'a>(&self, entry_name: &'a str) -> Option<&'a str> {
        match &self.inner_root {
            None => Some(entry_name),
            Some(root) => entry_name.strip_prefix(root.as_str())?.strip_prefix('/'),
        }
    }
}

/// Scripts packaged in a zip or jar file.
#[derive(Debug, Clone)]
pub struct ArchiveLocation {
    descriptor: String,
    path: ArchivePath,
}

impl ArchiveLocation {
    pub fn new(descriptor: impl Into<String>) -> Self {
        let descriptor = descriptor.into();
        let path = ArchivePath::parse(&descriptor);
        ArchiveLocation { descriptor, path }
    }

    pub fn path(&self) -> &str {
        &self.descriptor
    }

    /// Read every allowed entry below the inner root. Content is loaded while
    /// the archive is open; the file handle is released when this returns.
    pub fn scan(&self, factory: &ScriptFactory) -> Result<crate::ScriptCatalog> {
        let scripts = read_archive(&self.path, factory)
            .map_err(|reason| ScriptError::location(self.descriptor.clone(), reason))?;
        debug!(location = %self.descriptor, scripts = scripts.len(), "scanned archive");
        Ok(crate::ScriptCatalog::from_scripts(scripts))
    }
}

fn read_archive(path: &ArchivePath, factory: &ScriptFactory) -> std::result::Result<Vec<Script>, String> {
    let file = open(&path.archive)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| format!("not a valid zip/jar archive: {}", e))?;

    let mut scripts = Vec::new();
    for i in 0..archive.len() {
        // Raw access reads the header only; entries that are filtered out are
        // never decompressed.
        let name = {
            let raw = archive.by_index_raw(i).map_err(|e| format!("unreadable entry #{}: {}", i, e))?;
            if raw.is_dir() {
                continue;
            }
            raw.name().to_string()
        };
        let Some(relative) = path.relative(&name) else { continue };
        if relative.is_empty() || !factory.config().accepts(relative) {
            debug!(entry = %name, "skipping archive entry");
            continue;
        }
        let mut entry = archive.by_index(i).map_err(|e| format!("unreadable entry '{}': {}", name, e))?;
        // declared size is only a hint; never trust it for the allocation
        let mut bytes = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        entry.read_to_end(&mut bytes).map_err(|e| format!("unable to read entry '{}': {}", name, e))?;
        let last_modified = epoch_millis(entry.last_modified());
        let content = factory.encoding().decode(&bytes);
        scripts.push(factory.parse(relative, Some(content), last_modified));
    }
    Ok(scripts)
}

fn open(archive: &Path) -> std::result::Result<File, String> {
    if !archive.is_file() {
        return Err("archive file does not exist".into());
    }
    File::open(archive).map_err(|e| e.to_string())
}

/// Zip timestamps carry no zone; they are read as UTC.
fn epoch_millis(dt: zip::DateTime) -> Option<i64> {
    let month = Month::try_from(dt.month()).ok()?;
    let date = Date::from_calendar_date(dt.year() as i32, month, dt.day()).ok()?;
    let time = Time::from_hms(dt.hour(), dt.minute(), dt.second()).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc().unix_timestamp() * 1000)
}
