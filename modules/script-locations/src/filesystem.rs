use dbmaintain_core::{Result, Script, ScriptError, ScriptFactory};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Scripts stored as plain files below a root directory.
#[derive(Debug, Clone)]
pub struct FilesystemLocation {
    root: PathBuf,
}

impl FilesystemLocation {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemLocation { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and parse every file with an allowed extension. Content is
    /// read later, on demand.
    pub fn scan(&self, factory: &ScriptFactory) -> Result<crate::ScriptCatalog> {
        let location = self.root.display().to_string();
        if !self.root.exists() {
            return Err(ScriptError::location(location, "directory does not exist"));
        }
        if !self.root.is_dir() {
            return Err(ScriptError::location(location, "not a directory"));
        }

        let mut scripts: Vec<Script> = Vec::new();
        let mut skipped = 0usize;
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(location = %location, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else { continue };
            let relative = relative.to_string_lossy();
            if !factory.config().accepts(&relative) {
                debug!(file = %relative, "extension not allowed");
                skipped += 1;
                continue;
            }
            let last_modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as i64);
            scripts.push(factory.parse_file(&relative, entry.path().to_path_buf(), last_modified));
        }

        debug!(location = %location, scripts = scripts.len(), skipped, "scanned directory");
        Ok(crate::ScriptCatalog::from_scripts(scripts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbmaintain_core::ScriptConfig;
    use std::fs;

    fn write(root: &Path, rel: &str, body: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, body).unwrap();
    }

    fn factory() -> ScriptFactory {
        ScriptFactory::new(&ScriptConfig::default()).unwrap()
    }

    #[test]
    fn scans_tree_in_index_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "01_init/02_tables.sql", "create table b;");
        write(dir.path(), "01_init/01_schema.ddl", "create schema a;");
        write(dir.path(), "02_data/01_@users_seed.sql", "insert;");
        write(dir.path(), "02_data/notes.txt", "ignored");
        write(dir.path(), "postprocessing/grants.sql", "grant;");

        let catalog = FilesystemLocation::new(dir.path()).scan(&factory()).unwrap();
        assert_eq!(
            catalog.file_names(),
            vec![
                "postprocessing/grants.sql",
                "01_init/01_schema.ddl",
                "01_init/02_tables.sql",
                "02_data/01_@users_seed.sql",
            ]
        );
        let seed = catalog.get("02_data/01_@users_seed.sql").unwrap();
        assert_eq!(seed.target_database_name(), Some("users"));
        assert_eq!(seed.content().unwrap(), "insert;");
        assert!(seed.last_modified_ms().is_some());
        assert!(catalog.get("postprocessing/grants.sql").unwrap().is_postprocessing());
    }

    #[test]
    fn empty_directory_yields_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FilesystemLocation::new(dir.path()).scan(&factory()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_a_location_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FilesystemLocation::new(dir.path().join("nope")).scan(&factory()).unwrap_err();
        assert!(matches!(err, ScriptError::Location { .. }));
    }

    #[test]
    fn file_root_is_a_location_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "01_a.sql", "");
        let err = FilesystemLocation::new(dir.path().join("01_a.sql")).scan(&factory()).unwrap_err();
        assert!(matches!(err, ScriptError::Location { .. }));
    }
}
