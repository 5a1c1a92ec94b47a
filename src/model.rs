use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Reference handling for a parse pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceMode {
    /// Resolve `${GROUP_NAME}` references recursively.
    #[default]
    Resolve,
    /// Keep reference syntax untouched, so a map can be dumped back to
    /// the file without losing it.
    Preserve,
}

/// Insertion-ordered `group -> name -> value` map decoded from an
/// environment file.
///
/// Order is irrelevant for lookup but preserved so dump and cache
/// serialization round-trip deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentMap {
    groups: IndexMap<String, IndexMap<String, Value>>,
}

impl EnvironmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of declarations across all groups.
    pub fn len(&self) -> usize {
        self.groups.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(IndexMap::is_empty)
    }

    pub fn get(&self, group: &str, name: &str) -> Option<&Value> {
        self.groups.get(group)?.get(name)
    }

    pub fn contains(&self, group: &str, name: &str) -> bool {
        self.get(group, name).is_some()
    }

    /// Insert a value, creating the group on first use. Returns the
    /// previous value when the identifier was already declared.
    pub fn insert(
        &mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        value: Value,
    ) -> Option<Value> {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(name.into(), value)
    }

    /// Remove a declaration, dropping the group once it empties.
    /// Remaining entries keep their order.
    pub fn remove(&mut self, group: &str, name: &str) -> Option<Value> {
        let entries = self.groups.get_mut(group)?;
        let removed = entries.shift_remove(name);
        if entries.is_empty() {
            self.groups.shift_remove(group);
        }
        removed
    }

    /// Group names in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Entries of one group in insertion order.
    pub fn entries(&self, group: &str) -> impl Iterator<Item = (&str, &Value)> {
        self.groups
            .get(group)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(name, value)| (name.as_str(), value)))
    }

    /// Iterate every `(group, name, value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.groups.iter().flat_map(|(group, entries)| {
            entries
                .iter()
                .map(move |(name, value)| (group.as_str(), name.as_str(), value))
        })
    }
}
