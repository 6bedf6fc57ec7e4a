//! Parent/dependent column links
//!
//! Two maps keyed by a direct binding's source column index:
//! - option refs: source column -> the column whose selected value is a key
//! - dependents: source column -> the cascading columns that key drives

use std::collections::BTreeMap;

/// Link graph built while resolving bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkGraph {
    option_refs: BTreeMap<u16, String>,
    dependents: BTreeMap<u16, Vec<String>>,
}

impl LinkGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `column` selects keys from `source_column`. Last write wins.
    pub fn record_option_ref<S: Into<String>>(&mut self, source_column: u16, column: S) {
        self.option_refs.insert(source_column, column.into());
    }

    /// Record that `dependent` cascades from the keys of `source_column`
    pub fn record_dependent<S: Into<String>>(&mut self, source_column: u16, dependent: S) {
        let dependent = dependent.into();
        let entry = self.dependents.entry(source_column).or_default();
        if !entry.contains(&dependent) {
            entry.push(dependent);
        }
    }

    /// Column holding the keys for a source column
    pub fn key_column(&self, source_column: u16) -> Option<&str> {
        self.option_refs.get(&source_column).map(String::as_str)
    }

    /// Whether changing `column` can change some dependent's options
    pub fn is_resolution_key(&self, column: &str) -> bool {
        !self.dependents_of(column).is_empty()
    }

    /// Dependent columns to refresh when `column` changes
    pub fn dependents_of(&self, column: &str) -> Vec<&str> {
        self.option_refs
            .iter()
            .filter(|(_, name)| name.as_str() == column)
            .filter_map(|(source, _)| self.dependents.get(source))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// All (key column, dependent column) pairs
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for (source, deps) in &self.dependents {
            if let Some(key) = self.option_refs.get(source) {
                for dep in deps {
                    out.push((key.as_str(), dep.as_str()));
                }
            }
        }
        out
    }

    /// Whether no cascading links exist
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependents_of() {
        let mut links = LinkGraph::new();
        links.record_option_ref(0, "Region");
        links.record_dependent(0, "City");
        links.record_dependent(0, "Store");
        links.record_dependent(0, "City");
        links.record_option_ref(3, "Kind");

        assert_eq!(links.dependents_of("Region"), vec!["City", "Store"]);
        assert!(links.dependents_of("Kind").is_empty());
        assert!(links.is_resolution_key("Region"));
        assert!(!links.is_resolution_key("City"));
        assert_eq!(links.key_column(3), Some("Kind"));
        assert_eq!(links.pairs(), vec![("Region", "City"), ("Region", "Store")]);
    }

    #[test]
    fn test_option_ref_last_write_wins() {
        let mut links = LinkGraph::new();
        links.record_option_ref(1, "First");
        links.record_option_ref(1, "Second");
        links.record_dependent(1, "Child");
        assert!(links.dependents_of("First").is_empty());
        assert_eq!(links.dependents_of("Second"), vec!["Child"]);
    }
}
