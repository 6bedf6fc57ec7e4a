//! Row records and their store
//!
//! Records are created the first time a (sheet, row) pair is visited. Every
//! declared column is seeded, so a record never lacks a column of its sheet.

use std::collections::BTreeMap;

use serde::Serialize;

use audit_sheets_core::{ColumnSet, FieldValue, Worksheet};

/// Field values of one row, keyed by column display name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RowRecord {
    values: BTreeMap<String, FieldValue>,
}

impl RowRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a column
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values.get(column)
    }

    /// Set a column's value
    pub fn set<S: Into<String>>(&mut self, column: S, value: FieldValue) {
        self.values.insert(column.into(), value);
    }

    /// Iterate in column-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record holds nothing
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build the record for `row`: every column gets its type's zero value, then
/// the grid's cell, normalized to the column type.
///
/// List columns hold the cell's display text, the same text their options
/// are read as.
pub fn seed_record(sheet: &Worksheet, columns: &ColumnSet, row: u32) -> RowRecord {
    let mut record = RowRecord::new();
    for spec in columns.iter() {
        let value = match sheet.value_ref_at(row, spec.index) {
            Some(value) if spec.column_type.is_list() && !value.is_blank() => {
                FieldValue::Text(sheet.formatted_text_at(row, spec.index))
            }
            Some(value) => FieldValue::from_cell(value, spec.column_type),
            None => FieldValue::zero_for(spec.column_type),
        };
        record.set(spec.name.as_str(), value);
    }
    record
}

/// All row records of a session, keyed by (sheet name, row)
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    records: BTreeMap<(String, u32), RowRecord>,
}

impl RowStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// The record of a row, if visited
    pub fn get(&self, sheet: &str, row: u32) -> Option<&RowRecord> {
        self.records.get(&(sheet.to_string(), row))
    }

    /// The record of a row, seeding it on first visit
    pub fn get_or_seed<F>(&mut self, sheet: &str, row: u32, seed: F) -> &mut RowRecord
    where
        F: FnOnce() -> RowRecord,
    {
        self.records
            .entry((sheet.to_string(), row))
            .or_insert_with(seed)
    }

    /// Records of one sheet in ascending row order
    pub fn rows_of<'a>(
        &'a self,
        sheet: &'a str,
    ) -> impl Iterator<Item = (u32, &'a RowRecord)> + 'a {
        self.records
            .iter()
            .filter(move |((name, _), _)| name == sheet)
            .map(|((_, row), record)| (*row, record))
    }

    /// Whether a sheet has any record
    pub fn has_records(&self, sheet: &str) -> bool {
        self.rows_of(sheet).next().is_some()
    }

    /// Number of records across all sheets
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no row has been visited
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rows visible under an identity filter: the header (0) and, when `identity`
/// is non-empty, only data rows whose identity column equals it exactly.
pub fn visible_rows(sheet: &Worksheet, identity_column: Option<u16>, identity: &str) -> Vec<u32> {
    let last = sheet.max_row().unwrap_or(0);
    let mut rows = vec![0];
    if identity.is_empty() {
        rows.extend(1..=last);
        return rows;
    }
    if let Some(col) = identity_column {
        rows.extend((1..=last).filter(|row| sheet.formatted_text_at(*row, col) == identity));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_sheets_core::{ColumnType, NumberFormat};
    use pretty_assertions::assert_eq;

    fn sheet() -> Worksheet {
        let mut sheet = Worksheet::new("Audit");
        sheet.set_cell_value("A1", "Operator").unwrap();
        sheet.set_cell_value("B1", "Score").unwrap();
        sheet.set_cell_value("C1", "Note").unwrap();
        sheet.set_cell_value("A2", "alice").unwrap();
        sheet.set_cell_value("B2", 7.0).unwrap();
        sheet.set_cell_value("A3", "bob").unwrap();
        sheet.set_cell_value("A4", "alice").unwrap();
        sheet.set_cell_value("A5", "Alice").unwrap();
        sheet
    }

    fn columns() -> ColumnSet {
        let mut set = ColumnSet::new();
        set.insert("Operator", 0, ColumnType::Text);
        set.insert("Score", 1, ColumnType::Number);
        set.insert("Note", 2, ColumnType::Text);
        set
    }

    #[test]
    fn test_seed_fills_every_column() {
        let record = seed_record(&sheet(), &columns(), 2);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("Operator"), Some(&FieldValue::text("bob")));
        assert_eq!(record.get("Score"), Some(&FieldValue::Number(0.0)));
        assert_eq!(record.get("Note"), Some(&FieldValue::text("")));

        let record = seed_record(&sheet(), &columns(), 1);
        assert_eq!(record.get("Score"), Some(&FieldValue::Number(7.0)));
    }

    #[test]
    fn test_list_column_seeds_display_text() {
        let mut sheet = sheet();
        sheet.set_cell_value("D1", "Visit").unwrap();
        sheet.set_cell_value("D2", 45306.0).unwrap();
        sheet
            .set_number_format_at(1, 3, NumberFormat::BuiltIn(14))
            .unwrap();
        let mut columns = columns();
        columns.insert("Visit", 3, ColumnType::DirectList);

        let record = seed_record(&sheet, &columns, 1);
        assert_eq!(record.get("Visit"), Some(&FieldValue::text("1/15/2024")));
        let record = seed_record(&sheet, &columns, 2);
        assert_eq!(record.get("Visit"), Some(&FieldValue::text("")));
    }

    #[test]
    fn test_store_seeds_once() {
        let mut store = RowStore::new();
        store
            .get_or_seed("Audit", 1, RowRecord::new)
            .set("Note", FieldValue::text("checked"));
        let again = store.get_or_seed("Audit", 1, || seed_record(&sheet(), &columns(), 1));
        assert_eq!(again.get("Note"), Some(&FieldValue::text("checked")));
        assert!(store.has_records("Audit"));
        assert!(!store.has_records("Lookup"));
    }

    #[test]
    fn test_identity_filter() {
        let sheet = sheet();
        assert_eq!(visible_rows(&sheet, Some(0), "alice"), vec![0, 1, 3]);
        assert_eq!(visible_rows(&sheet, Some(0), ""), vec![0, 1, 2, 3, 4]);
        assert_eq!(visible_rows(&sheet, None, "alice"), vec![0]);
        assert_eq!(visible_rows(&sheet, Some(0), "carol"), vec![0]);
    }
}
