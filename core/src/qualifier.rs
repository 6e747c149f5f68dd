use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::script::Script;

/// Free-form tag taken from a script path, e.g. `#patch` in `01_#patch_fix.sql`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct Qualifier(pub String);

impl Qualifier {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Qualifier {
    fn from(s: &str) -> Self {
        Qualifier(s.to_string())
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that every qualifier of `script` is either registered or a patch qualifier.
/// Returns the unknown ones on failure.
pub fn validate_qualifiers(
    script: &Script,
    registered: &BTreeSet<Qualifier>,
    patch: &BTreeSet<Qualifier>,
) -> Result<(), Vec<Qualifier>> {
    let unknown: Vec<Qualifier> = script
        .qualifiers()
        .iter()
        .filter(|q| !registered.contains(*q) && !patch.contains(*q))
        .cloned()
        .collect();
    if unknown.is_empty() { Ok(()) } else { Err(unknown) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScriptConfig, ScriptFactory};

    #[test]
    fn registered_and_patch_qualifiers_pass() {
        let factory = ScriptFactory::new(&ScriptConfig::default()).unwrap();
        let script = factory.parse("01_#patch_#hotfix_fix.sql", None, None);
        let registered: BTreeSet<Qualifier> = [Qualifier::from("hotfix")].into_iter().collect();
        let patch: BTreeSet<Qualifier> = [Qualifier::from("patch")].into_iter().collect();
        assert!(validate_qualifiers(&script, &registered, &patch).is_ok());
    }

    #[test]
    fn unknown_qualifiers_are_reported() {
        let factory = ScriptFactory::new(&ScriptConfig::default()).unwrap();
        let script = factory.parse("01_#rogue_#patch_fix.sql", None, None);
        let patch: BTreeSet<Qualifier> = [Qualifier::from("patch")].into_iter().collect();
        let err = validate_qualifiers(&script, &BTreeSet::new(), &patch).unwrap_err();
        assert_eq!(err, vec![Qualifier::from("rogue")]);
    }
}
