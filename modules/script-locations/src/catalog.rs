use dbmaintain_core::{Script, ScriptFactory};

/// Scripts of one or more locations, sorted and unique by file name.
#[derive(Debug, Clone, Default)]
pub struct ScriptCatalog {
    scripts: Vec<Script>,
}

impl ScriptCatalog {
    /// Sort, then drop every script whose file name was already seen. Equal
    /// file names sort adjacent because file name is the last sort key.
    pub fn from_scripts(mut scripts: Vec<Script>) -> Self {
        scripts.sort();
        scripts.dedup_by(|a, b| a.file_name() == b.file_name());
        ScriptCatalog { scripts }
    }

    /// Build a catalog from in-memory `(file name, content)` pairs.
    pub fn from_contents<I, N, C>(factory: &ScriptFactory, contents: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<String>,
    {
        let scripts = contents
            .into_iter()
            .filter(|(name, _)| factory.config().accepts(name.as_ref()))
            .map(|(name, content)| factory.parse(name.as_ref(), Some(content.into()), None))
            .collect();
        Self::from_scripts(scripts)
    }

    /// Merge another catalog in. Scripts already present by file name win;
    /// the file names of the dropped scripts are returned.
    #[must_use]
    pub fn extend(&mut self, other: ScriptCatalog) -> Vec<String> {
        let dropped = other
            .scripts
            .iter()
            .filter(|s| self.get(s.file_name()).is_some())
            .map(|s| s.file_name().to_string())
            .collect();
        let mut all = std::mem::take(&mut self.scripts);
        all.extend(other.scripts);
        *self = Self::from_scripts(all);
        dropped
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Script> {
        self.scripts.iter()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn get(&self, file_name: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| s.file_name() == file_name)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.scripts.iter().map(Script::file_name).collect()
    }
}

impl<'a> IntoIterator for &'a ScriptCatalog {
    type Item = &'a Script;
    type IntoIter = std::slice::Iter<'a, Script>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.iter()
    }
}

impl IntoIterator for ScriptCatalog {
    type Item = Script;
    type IntoIter = std::vec::IntoIter<Script>;

    fn into_iter(self) -> Self::IntoIter {
        self.scripts.into_iter()
    }
}
