use anyhow::{Context, Result};
use dbmaintain_core::ScriptConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub scripts: Option<ScriptConfig>,
    /// Default locations when none are given on the command line.
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Load an explicit config file, or ./dbmaintain.yaml if present.
pub fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new("dbmaintain.yaml");
            if p.exists() { p.to_path_buf() } else { return Ok(None); }
        }
    };
    let s = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let cfg = serde_yaml::from_str(&s).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_scripts_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dbmaintain.yaml");
        fs::write(
            &path,
            "scripts:\n  encoding: UTF-8\n  qualifiers: [hotfix]\nlocations:\n  - db/scripts\n",
        )
        .unwrap();
        let cfg = load_config(Some(&path)).unwrap().unwrap();
        let scripts = cfg.scripts.unwrap();
        assert_eq!(scripts.encoding, "UTF-8");
        assert_eq!(scripts.qualifiers.len(), 1);
        assert_eq!(cfg.locations, vec!["db/scripts".to_string()]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "scripts: [not, a, map]\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
