//! Positional execution order of a script.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// One optional index per path segment, in path order.
///
/// Ordering is element-wise up to the shorter length, then by length. At a
/// given position an absent slot sorts before any present value, so
/// `[absent, 1]` < `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ScriptIndexes(Vec<Option<u64>>);

impl ScriptIndexes {
    pub fn new(indexes: Vec<Option<u64>>) -> Self {
        ScriptIndexes(indexes)
    }

    pub fn indexes(&self) -> &[Option<u64>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if no segment carries an index.
    pub fn is_unindexed(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

impl Ord for ScriptIndexes {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            // Option orders None before Some
            match a.cmp(b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for ScriptIndexes {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ScriptIndexes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|i| i.map(|v| v.to_string()).unwrap_or_else(|| "x".into()))
            .collect();
        write!(f, "{}", parts.join("."))
    }
}
