use serde::Serialize;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use crate::encoding::ScriptEncoding;
use crate::error::{Result, ScriptError};
use crate::indexes::ScriptIndexes;
use crate::qualifier::Qualifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    Regular,
    Preprocessing,
    Postprocessing,
}

/// Where the text of a script comes from.
#[derive(Debug, Clone)]
pub enum ScriptContent {
    /// Already in memory (archive entries, tests).
    Inline(String),
    /// Read from disk on first request.
    File { path: PathBuf, encoding: ScriptEncoding },
    /// Nothing to load; identity-only scripts.
    Absent,
}

/// A discovered script and everything derived from its path.
///
/// Two scripts are equal when their file names are equal. Ordering is by
/// indexes, then target database, then file name.
#[derive(Debug, Clone)]
pub struct Script {
    pub(crate) file_name: String,
    pub(crate) file_extension: Option<String>,
    pub(crate) indexes: ScriptIndexes,
    pub(crate) target_database: Option<String>,
    pub(crate) qualifiers: BTreeSet<Qualifier>,
    pub(crate) patch: bool,
    pub(crate) kind: ScriptKind,
    pub(crate) encoding: ScriptEncoding,
    pub(crate) last_modified_ms: Option<i64>,
    pub(crate) content: ScriptContent,
}

impl Script {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_extension(&self) -> Option<&str> {
        self.file_extension.as_deref()
    }

    pub fn script_indexes(&self) -> &ScriptIndexes {
        &self.indexes
    }

    pub fn target_database_name(&self) -> Option<&str> {
        self.target_database.as_deref()
    }

    pub fn qualifiers(&self) -> &BTreeSet<Qualifier> {
        &self.qualifiers
    }

    pub fn is_patch_script(&self) -> bool {
        self.patch
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn encoding(&self) -> ScriptEncoding {
        self.encoding
    }

    pub fn last_modified_ms(&self) -> Option<i64> {
        self.last_modified_ms
    }

    /// Indexed scripts run once, in order.
    pub fn is_incremental(&self) -> bool {
        !self.indexes.is_unindexed()
    }

    /// Unindexed scripts are rerun whenever they change.
    pub fn is_repeatable(&self) -> bool {
        self.indexes.is_unindexed()
    }

    pub fn is_preprocessing(&self) -> bool {
        self.kind == ScriptKind::Preprocessing
    }

    pub fn is_postprocessing(&self) -> bool {
        self.kind == ScriptKind::Postprocessing
    }

    pub fn content(&self) -> Result<Cow<'_, str>> {
        match &self.content {
            ScriptContent::Inline(s) => Ok(Cow::Borrowed(s)),
            ScriptContent::File { path, encoding } => {
                let bytes = std::fs::read(path).map_err(|source| ScriptError::Content {
                    file_name: self.file_name.clone(),
                    source,
                })?;
                Ok(Cow::Owned(encoding.decode(&bytes)))
            }
            ScriptContent::Absent => Ok(Cow::Borrowed("")),
        }
    }
}

impl PartialEq for Script {
    fn eq(&self, other: &Self) -> bool {
        self.file_name == other.file_name
    }
}

impl Eq for Script {}

impl Hash for Script {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_name.hash(state);
    }
}

impl Ord for Script {
    fn cmp(&self, other: &Self) -> Ordering {
        self.indexes
            .cmp(&other.indexes)
            .then_with(|| self.target_database.cmp(&other.target_database))
            .then_with(|| self.file_name.cmp(&other.file_name))
    }
}

impl PartialOrd for Script {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
