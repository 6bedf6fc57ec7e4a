//! Live dropdown state for the selected sheet
//!
//! [`Dropdowns`] ties the resolved bindings to their materialized options and
//! keeps each cascading column's entry in step with its parent's value.

use ahash::AHashMap;

use crate::binding::{BindingKind, DropdownBinding};
use crate::links::LinkGraph;
use crate::options::{build_indirect_index, materialize_direct, IndirectOptionsIndex, OptionsTable};
use crate::resolver::{resolve_bindings, Resolution};
use audit_sheets_core::{ColumnSet, FieldValue, ValidationRule, Workbook};

/// Bindings, links and current options of one sheet selection
#[derive(Debug, Clone)]
pub struct Dropdowns {
    resolution: Resolution,
    indexes: AHashMap<String, IndirectOptionsIndex>,
    table: OptionsTable,
}

impl Dropdowns {
    /// No dropdowns at all
    pub fn empty<S: Into<String>>(placeholder: S) -> Self {
        Self {
            resolution: Resolution::default(),
            indexes: AHashMap::new(),
            table: OptionsTable::new(placeholder),
        }
    }

    /// Resolve `rules` and materialize every binding's options.
    ///
    /// A direct column whose options come out empty, or whose source sheet is
    /// missing, goes back to its inferred type and loses its binding. Cascading
    /// columns start on the first key's options.
    pub fn build<S: Into<String>>(
        rules: &[ValidationRule],
        workbook: &Workbook,
        active_sheet: &str,
        columns: &mut ColumnSet,
        prior: &[DropdownBinding],
        placeholder: S,
    ) -> Self {
        let mut resolution = resolve_bindings(rules, active_sheet, columns, prior);
        let mut indexes = AHashMap::new();
        let mut table = OptionsTable::new(placeholder);
        let mut unresolved = Vec::new();

        for binding in &resolution.bindings {
            match binding.kind {
                BindingKind::Direct => match materialize_direct(binding, workbook) {
                    Ok(options) if !options.is_empty() => {
                        table.set(binding.target_column.as_str(), &options)
                    }
                    Ok(_) => {
                        log::debug!(
                            "no options in {}; '{}' keeps its inferred type",
                            binding.source_range(),
                            binding.target_column
                        );
                        unresolved.push(binding.target_column.clone());
                    }
                    Err(e) => {
                        log::warn!("cannot read options for '{}': {}", binding.target_column, e);
                        unresolved.push(binding.target_column.clone());
                    }
                },
                BindingKind::Indirect => match build_indirect_index(binding, workbook) {
                    Ok(index) => {
                        table.set(
                            binding.target_column.as_str(),
                            index.default_options().unwrap_or(&[]),
                        );
                        indexes.insert(binding.target_column.clone(), index);
                    }
                    Err(e) => {
                        log::warn!("cannot read options for '{}': {}", binding.target_column, e);
                        unresolved.push(binding.target_column.clone());
                    }
                },
            }
        }

        for column in &unresolved {
            columns.restore_inferred(column);
            table.remove(column);
        }
        resolution
            .bindings
            .retain(|b| !unresolved.contains(&b.target_column));

        Self {
            resolution,
            indexes,
            table,
        }
    }

    /// Bindings that ended up with options, in rule order
    pub fn bindings(&self) -> &[DropdownBinding] {
        &self.resolution.bindings
    }

    /// The binding of a column
    pub fn binding_for(&self, column: &str) -> Option<&DropdownBinding> {
        self.resolution.binding_for(column)
    }

    /// Parent/dependent links
    pub fn links(&self) -> &LinkGraph {
        &self.resolution.links
    }

    /// Current options of every bound column
    pub fn table(&self) -> &OptionsTable {
        &self.table
    }

    /// Current options of a column
    pub fn options(&self, column: &str) -> Option<&[String]> {
        self.table.get(column)
    }

    /// Lookup table of a cascading column
    pub fn index_for(&self, column: &str) -> Option<&IndirectOptionsIndex> {
        self.indexes.get(column)
    }

    /// Refresh the dependents of `changed_column` for its new value.
    ///
    /// A blank value selects the first key's options; an unknown key leaves
    /// only the placeholder. Returns the refreshed columns.
    pub fn relink(&mut self, changed_column: &str, value: &FieldValue) -> Vec<String> {
        let key = value.to_string();
        let mut refreshed = Vec::new();

        for dependent in self.resolution.links.dependents_of(changed_column) {
            let Some(index) = self.indexes.get(dependent) else {
                continue;
            };
            let options = if key.is_empty() {
                index.default_options()
            } else {
                index.options_for(&key)
            };
            self.table.set(dependent, options.unwrap_or(&[]));
            log::debug!(
                "relinked '{}' to '{}' = '{}' ({} options)",
                dependent,
                changed_column,
                key,
                options.map_or(0, <[String]>::len)
            );
            refreshed.push(dependent.to_string());
        }

        refreshed
    }

    /// Refresh every cascading column from its parent's value in a row
    pub fn relink_all<F>(&mut self, mut value_of: F)
    where
        F: FnMut(&str) -> Option<FieldValue>,
    {
        let parents: Vec<String> = self
            .resolution
            .links
            .pairs()
            .into_iter()
            .map(|(parent, _)| parent.to_string())
            .collect();

        let mut seen = Vec::new();
        for parent in parents {
            if seen.contains(&parent) {
                continue;
            }
            let value = value_of(parent.as_str()).unwrap_or_default();
            self.relink(&parent, &value);
            seen.push(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_sheets_core::{ColumnType, Worksheet};
    use pretty_assertions::assert_eq;

    fn workbook() -> Workbook {
        let mut lookup = Worksheet::new("Lookup");
        lookup.set_cell_value("A1", "Region").unwrap();
        lookup.set_cell_value("A2", "North").unwrap();
        lookup.set_cell_value("A3", "South").unwrap();
        lookup.set_cell_value("C1", "North").unwrap();
        lookup.set_cell_value("C2", "Oslo").unwrap();
        lookup.set_cell_value("C3", "Bergen").unwrap();
        lookup.set_cell_value("D1", "South").unwrap();
        lookup.set_cell_value("D2", "Rome").unwrap();

        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("Audit").unwrap();
        wb.add_existing_worksheet(lookup).unwrap();
        wb
    }

    fn columns() -> ColumnSet {
        let mut set = ColumnSet::new();
        set.insert("Region", 0, ColumnType::Text);
        set.insert("City", 1, ColumnType::Text);
        set.insert("Status", 2, ColumnType::Number);
        set
    }

    fn rules() -> Vec<ValidationRule> {
        vec![
            ValidationRule::new("A2:A20", "Lookup!$A$2:$A$3"),
            ValidationRule::new("B2:B20", "INDIRECT($A$2)"),
        ]
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_sets_initial_options() {
        let mut cols = columns();
        let dropdowns = Dropdowns::build(&rules(), &workbook(), "Audit", &mut cols, &[], "none");

        assert_eq!(dropdowns.options("Region"), Some(&strings(&["North", "South"])[..]));
        assert_eq!(dropdowns.options("City"), Some(&strings(&["Oslo", "Bergen"])[..]));
        assert_eq!(cols.type_of("City"), Some(ColumnType::CascadingList));
        assert_eq!(dropdowns.bindings().len(), 2);
    }

    #[test]
    fn test_relink_follows_parent_value() {
        let mut cols = columns();
        let mut dropdowns = Dropdowns::build(&rules(), &workbook(), "Audit", &mut cols, &[], "none");

        let refreshed = dropdowns.relink("Region", &FieldValue::text("South"));
        assert_eq!(refreshed, vec!["City"]);
        assert_eq!(dropdowns.options("City"), Some(&strings(&["Rome"])[..]));

        dropdowns.relink("Region", &FieldValue::text("Atlantis"));
        assert_eq!(dropdowns.options("City"), Some(&strings(&["none"])[..]));

        dropdowns.relink("Region", &FieldValue::text(""));
        assert_eq!(dropdowns.options("City"), Some(&strings(&["Oslo", "Bergen"])[..]));

        assert!(dropdowns.relink("Status", &FieldValue::Number(1.0)).is_empty());
    }

    #[test]
    fn test_relink_all() {
        let mut cols = columns();
        let mut dropdowns = Dropdowns::build(&rules(), &workbook(), "Audit", &mut cols, &[], "none");
        dropdowns.relink_all(|column| (column == "Region").then(|| FieldValue::text("South")));
        assert_eq!(dropdowns.options("City"), Some(&strings(&["Rome"])[..]));
    }

    #[test]
    fn test_empty_direct_options_downgrade() {
        let mut cols = columns();
        let rules = vec![ValidationRule::new("C2:C9", "Lookup!$F$2:$F$9")];
        let dropdowns = Dropdowns::build(&rules, &workbook(), "Audit", &mut cols, &[], "none");

        assert_eq!(cols.type_of("Status"), Some(ColumnType::Number));
        assert!(dropdowns.options("Status").is_none());
        assert!(dropdowns.bindings().is_empty());
    }

    #[test]
    fn test_missing_source_sheet_downgrades() {
        let mut cols = columns();
        let rules = vec![ValidationRule::new("A2:A9", "Gone!$A$2:$A$3")];
        let dropdowns = Dropdowns::build(&rules, &workbook(), "Audit", &mut cols, &[], "none");
        assert_eq!(cols.type_of("Region"), Some(ColumnType::Text));
        assert!(dropdowns.binding_for("Region").is_none());
    }
}
