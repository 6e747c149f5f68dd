//! Derives a [`Script`] identity from a path relative to its location root.
//!
//! Each path segment is matched on its own. The index pattern is tried at the
//! start of every segment; the target database and qualifier patterns are
//! scanned through every segment left to right. A segment that matches nothing
//! simply contributes nothing.

use regex::Regex;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::ScriptConfig;
use crate::encoding::ScriptEncoding;
use crate::error::{Result, ScriptError};
use crate::indexes::ScriptIndexes;
use crate::qualifier::Qualifier;
use crate::script::{Script, ScriptContent, ScriptKind};

#[derive(Debug, Clone)]
pub struct ScriptFactory {
    index_re: Regex,
    target_database_re: Regex,
    qualifier_re: Regex,
    encoding: ScriptEncoding,
    config: ScriptConfig,
}

/// Compile a user pattern. `\G` (end of previous match) has no equivalent in
/// the regex crate; it is read as segment start, which together with the
/// resume rule in [`captures`] finds the same markers.
fn compile(pattern: &str) -> Result<Regex> {
    let translated = pattern.replace(r"\G", "^");
    Regex::new(&translated).map_err(|source| ScriptError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// All values captured by group 1 of `re` in `segment`, left to right.
///
/// After a hit the search resumes where the captured value ends, so a trailing
/// separator consumed by one match can open the next one (`_@db1_@db2_`).
fn captures<'a>(re: &Regex, segment: &'a str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut at = 0;
    while at <= segment.len() {
        let Some(caps) = re.captures_at(segment, at) else { break };
        let Some(whole) = caps.get(0) else { break };
        let resume = match caps.get(1) {
            Some(value) => {
                found.push(value.as_str());
                value.end().min(whole.end())
            }
            None => whole.end(),
        };
        at = if resume > at {
            resume
        } else {
            // empty match: step over one char
            match segment[at..].chars().next() {
                Some(c) => at + c.len_utf8(),
                None => break,
            }
        };
    }
    found
}

/// Split a raw path into normalized segments and the final extension.
fn segments(raw_path: &str) -> (Vec<&str>, Option<&str>) {
    let mut parts: Vec<&str> = raw_path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    let mut extension = None;
    if let Some(last) = parts.pop() {
        match last.rsplit_once('.') {
            Some((base, ext)) => {
                parts.push(base);
                extension = Some(ext);
            }
            None => parts.push(last),
        }
    }
    (parts, extension)
}

impl ScriptFactory {
    pub fn new(config: &ScriptConfig) -> Result<Self> {
        Ok(ScriptFactory {
            index_re: compile(&config.index_regexp)?,
            target_database_re: compile(&config.target_database_regexp)?,
            qualifier_re: compile(&config.qualifier_regexp)?,
            encoding: config.encoding.parse()?,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn encoding(&self) -> ScriptEncoding {
        self.encoding
    }

    /// Parse `raw_path` with optional pre-loaded content.
    pub fn parse(&self, raw_path: &str, content: Option<String>, last_modified_ms: Option<i64>) -> Script {
        let content = content.map(ScriptContent::Inline).unwrap_or(ScriptContent::Absent);
        self.build(raw_path, content, last_modified_ms)
    }

    /// Parse `raw_path` whose content is read from `path` on demand.
    pub fn parse_file(&self, raw_path: &str, path: PathBuf, last_modified_ms: Option<i64>) -> Script {
        let content = ScriptContent::File { path, encoding: self.encoding };
        self.build(raw_path, content, last_modified_ms)
    }

    fn build(&self, raw_path: &str, content: ScriptContent, last_modified_ms: Option<i64>) -> Script {
        let (parts, extension) = segments(raw_path);
        let file_name = {
            let joined = parts.join("/");
            match extension {
                Some(ext) => format!("{}.{}", joined, ext),
                None => joined,
            }
        };

        let indexes = ScriptIndexes::new(parts.iter().map(|p| self.index_of(p)).collect());

        let target_database = parts
            .iter()
            .flat_map(|p| captures(&self.target_database_re, p))
            .last()
            .map(str::to_string);

        let qualifiers: BTreeSet<Qualifier> = parts
            .iter()
            .flat_map(|p| captures(&self.qualifier_re, p))
            .map(Qualifier::from)
            .collect();

        let patch = qualifiers.iter().any(|q| self.config.patch_qualifiers.contains(q));
        let kind = self.kind_of(&file_name);

        Script {
            file_name,
            file_extension: extension.map(str::to_string),
            indexes,
            target_database,
            qualifiers,
            patch,
            kind,
            encoding: self.encoding,
            last_modified_ms,
            content,
        }
    }

    /// Index at the start of one segment; a value that does not fit is absent.
    fn index_of(&self, segment: &str) -> Option<u64> {
        let caps = self.index_re.captures(segment)?;
        caps.get(1)?.as_str().parse().ok()
    }

    fn kind_of(&self, file_name: &str) -> ScriptKind {
        let under = |dir: &Option<String>| {
            dir.as_deref()
                .map(|d| d.trim_matches('/'))
                .filter(|d| !d.is_empty())
                .and_then(|d| file_name.strip_prefix(d))
                .map_or(false, |rest| rest.starts_with('/'))
        };
        if under(&self.config.preprocessing_dir) {
            ScriptKind::Preprocessing
        } else if under(&self.config.postprocessing_dir) {
            ScriptKind::Postprocessing
        } else {
            ScriptKind::Regular
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ScriptFactory {
        ScriptFactory::new(&ScriptConfig::default()).unwrap()
    }

    fn indexes(path: &str) -> Vec<Option<u64>> {
        factory().parse(path, None, None).script_indexes().indexes().to_vec()
    }

    fn target(path: &str) -> Option<String> {
        factory().parse(path, None, None).target_database_name().map(str::to_string)
    }

    #[test]
    fn single_index() {
        assert_eq!(indexes("01_my_script.sql"), vec![Some(1)]);
        assert_eq!(indexes("1_my_script.sql"), vec![Some(1)]);
    }

    #[test]
    fn multiple_indexes() {
        assert_eq!(indexes("01_scripts/2_release/003_my_script.sql"), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn path_without_index() {
        assert_eq!(indexes("scripts/release/003_my_script.sql"), vec![None, None, Some(3)]);
    }

    #[test]
    fn only_index() {
        assert_eq!(indexes("1.sql"), vec![Some(1)]);
    }

    #[test]
    fn no_indexes() {
        let s = factory().parse("scripts/my_script.sql", None, None);
        assert_eq!(s.script_indexes().indexes(), &[None, None]);
        assert!(s.qualifiers().is_empty());
        assert!(s.target_database_name().is_none());
    }

    #[test]
    fn invalid_index_is_ignored() {
        let s = factory().parse("0xxx1_script.sql", None, None);
        assert_eq!(s.script_indexes().indexes(), &[None]);
        assert!(s.qualifiers().is_empty());
    }

    #[test]
    fn oversized_index_is_absent() {
        assert_eq!(indexes("99999999999999999999999_x.sql"), vec![None]);
    }

    #[test]
    fn single_target_database_name() {
        assert_eq!(target("scripts/01_@database_my_script.sql").as_deref(), Some("database"));
    }

    #[test]
    fn last_target_database_across_segments() {
        assert_eq!(target("@db1_scripts/01_@db2_my_script.sql").as_deref(), Some("db2"));
    }

    #[test]
    fn last_target_database_within_file_name() {
        assert_eq!(target("01_@db1_@db2_my_script.sql").as_deref(), Some("db2"));
    }

    #[test]
    fn leading_and_only_target_database() {
        assert_eq!(target("@database_my_script.sql").as_deref(), Some("database"));
        assert_eq!(target("@database.sql").as_deref(), Some("database"));
        assert_eq!(target("scripts/my_script.sql"), None);
    }

    #[test]
    fn marker_inside_word_is_not_a_match() {
        assert_eq!(target("01_mail@host_x.sql"), None);
    }

    #[test]
    fn qualifiers_collect_every_match() {
        let s = factory().parse("#q1_dir/01_#q2_#patch_#q1_x.sql", None, None);
        let names: Vec<&str> = s.qualifiers().iter().map(|q| q.name()).collect();
        assert_eq!(names, vec!["patch", "q1", "q2"]);
        assert!(s.is_patch_script());
    }

    #[test]
    fn not_a_patch_without_patch_qualifier() {
        let s = factory().parse("01_#hotfix_x.sql", None, None);
        assert!(!s.is_patch_script());
    }

    #[test]
    fn normalizes_separators() {
        let s = factory().parse("\\scripts\\01_a.sql", None, None);
        assert_eq!(s.file_name(), "scripts/01_a.sql");
        assert_eq!(s.file_extension(), Some("sql"));
        assert_eq!(factory().parse("/01_a.sql", None, None).file_name(), "01_a.sql");
    }

    #[test]
    fn kind_from_leading_folder() {
        let f = factory();
        assert_eq!(f.parse("preprocessing/01_a.sql", None, None).kind(), ScriptKind::Preprocessing);
        assert_eq!(f.parse("postprocessing/drop.sql", None, None).kind(), ScriptKind::Postprocessing);
        assert_eq!(f.parse("preprocessingx/01_a.sql", None, None).kind(), ScriptKind::Regular);
        assert_eq!(f.parse("scripts/preprocessing/a.sql", None, None).kind(), ScriptKind::Regular);
    }

    #[test]
    fn legacy_g_anchor_is_accepted() {
        let cfg = ScriptConfig {
            target_database_regexp: r"(?:\G|_)@([a-zA-Z0-9]+)(?:_|$)".into(),
            qualifier_regexp: r"(?:\G|_)#([a-zA-Z0-9]+)_".into(),
            index_regexp: "^([0-9]+)_".into(),
            ..ScriptConfig::default()
        };
        let f = ScriptFactory::new(&cfg).unwrap();
        let s = f.parse("01_@db1_@db2_#a_#b_x.sql", None, None);
        assert_eq!(s.target_database_name(), Some("db2"));
        assert_eq!(s.qualifiers().len(), 2);
        assert_eq!(s.script_indexes().indexes(), &[Some(1)]);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let cfg = ScriptConfig { index_regexp: "([0-9]+".into(), ..ScriptConfig::default() };
        assert!(matches!(ScriptFactory::new(&cfg), Err(ScriptError::InvalidPattern { .. })));
    }

    #[test]
    fn reparsing_file_name_is_idempotent() {
        let f = factory();
        for raw in ["\\01_@db_x\\2_#q_y.sql", "/a/b/@x.sql", "0xxx1_script.sql", "01_#patch_@db.ddl"] {
            let first = f.parse(raw, None, None);
            let again = f.parse(first.file_name(), None, None);
            assert_eq!(first.file_name(), again.file_name());
            assert_eq!(first.script_indexes(), again.script_indexes());
            assert_eq!(first.target_database_name(), again.target_database_name());
            assert_eq!(first.qualifiers(), again.qualifiers());
        }
    }

    #[test]
    fn index_count_matches_segments() {
        for raw in ["a.sql", "a/b.sql", "a/b/c/d.sql", "x/y"] {
            let expected = raw.split('/').count();
            assert_eq!(factory().parse(raw, None, None).script_indexes().len(), expected);
        }
    }
}
