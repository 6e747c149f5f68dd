use serde::Deserialize;
use std::collections::BTreeSet;

use crate::qualifier::Qualifier;

pub const DEFAULT_INDEX_REGEXP: &str = r"^([0-9]+)(?:_|$)";
pub const DEFAULT_TARGET_DATABASE_REGEXP: &str = r"(?:^|_)@([a-zA-Z0-9]+)(?:_|$)";
pub const DEFAULT_QUALIFIER_REGEXP: &str = r"(?:^|_)#([a-zA-Z0-9]+)(?:_|$)";

/// Settings that shape how script paths are discovered and interpreted.
///
/// Every field has a default, so a partial YAML section is enough.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub encoding: String,
    pub file_extensions: BTreeSet<String>,
    pub preprocessing_dir: Option<String>,
    pub postprocessing_dir: Option<String>,
    /// Qualifiers a downstream check accepts in addition to the patch qualifiers.
    pub qualifiers: BTreeSet<Qualifier>,
    pub patch_qualifiers: BTreeSet<Qualifier>,
    pub index_regexp: String,
    pub target_database_regexp: String,
    pub qualifier_regexp: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        ScriptConfig {
            encoding: "ISO-8859-1".into(),
            file_extensions: ["sql", "ddl"].iter().map(|s| s.to_string()).collect(),
            preprocessing_dir: Some("preprocessing".into()),
            postprocessing_dir: Some("postprocessing".into()),
            qualifiers: BTreeSet::new(),
            patch_qualifiers: [Qualifier::from("patch")].into_iter().collect(),
            index_regexp: DEFAULT_INDEX_REGEXP.into(),
            target_database_regexp: DEFAULT_TARGET_DATABASE_REGEXP.into(),
            qualifier_regexp: DEFAULT_QUALIFIER_REGEXP.into(),
        }
    }
}

impl ScriptConfig {
    /// Whether `file_name` ends in one of the allowed extensions.
    pub fn accepts(&self, file_name: &str) -> bool {
        let base = file_name.rsplit('/').next().unwrap_or(file_name);
        match base.rsplit_once('.') {
            Some((_, ext)) => self.file_extensions.contains(ext),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: ScriptConfig = serde_yaml::from_str("encoding: UTF-8\nfile_extensions: [sql]\n").unwrap();
        assert_eq!(cfg.encoding, "UTF-8");
        assert_eq!(cfg.file_extensions.len(), 1);
        assert_eq!(cfg.index_regexp, DEFAULT_INDEX_REGEXP);
        assert_eq!(cfg.preprocessing_dir.as_deref(), Some("preprocessing"));
        assert!(cfg.patch_qualifiers.contains(&Qualifier::from("patch")));
    }

    #[test]
    fn accepts_by_extension_of_last_segment() {
        let cfg = ScriptConfig::default();
        assert!(cfg.accepts("scripts/01_script.sql"));
        assert!(cfg.accepts("02.ddl"));
        assert!(!cfg.accepts("scripts.sql/readme.txt"));
        assert!(!cfg.accepts("scripts/noext"));
    }
}
