//! Option materialization
//!
//! Reads the cell values behind a binding. Direct bindings yield the
//! non-blank values of their range in order. Indirect bindings yield an
//! [`IndirectOptionsIndex`]: for every key of the parent's range, the run of
//! values found under that key elsewhere on the source sheet.

use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::binding::{BindingKind, DropdownBinding};
use crate::error::{DropdownError, DropdownResult};
use audit_sheets_core::{Workbook, Worksheet};

/// Options looked up by a parent column's value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndirectOptionsIndex {
    keys: Vec<String>,
    entries: AHashMap<String, Vec<String>>,
}

impl IndirectOptionsIndex {
    /// Candidate keys, in range order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Options for a key; `None` when the key has no discoverable run
    pub fn options_for(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Options for the first candidate key
    pub fn default_options(&self) -> Option<&[String]> {
        self.keys.first().and_then(|k| self.options_for(k))
    }

    /// Number of keys with options
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has options
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of [`materialize_options`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializedOptions {
    /// Values of a direct binding's range
    Direct(Vec<String>),
    /// Lookup table of an indirect binding
    Indirect(IndirectOptionsIndex),
}

fn source_sheet<'a>(binding: &DropdownBinding, workbook: &'a Workbook) -> DropdownResult<&'a Worksheet> {
    workbook
        .worksheet_by_name(&binding.source_sheet)
        .ok_or_else(|| DropdownError::SheetNotFound(binding.source_sheet.clone()))
}

/// Non-blank display values of rows `start..=end` (1-based) of one column.
fn range_values(sheet: &Worksheet, column: u16, start: u32, end: u32) -> Vec<String> {
    let first = start.saturating_sub(1);
    let last = end.saturating_sub(1);
    if first > last {
        return Vec::new();
    }
    (first..=last)
        .filter(|row| sheet.value_ref_at(*row, column).is_some_and(|v| !v.is_blank()))
        .map(|row| sheet.formatted_text_at(row, column))
        .collect()
}

/// The options of a direct binding (also the key domain of an indirect one)
pub fn materialize_direct(binding: &DropdownBinding, workbook: &Workbook) -> DropdownResult<Vec<String>> {
    let sheet = source_sheet(binding, workbook)?;
    Ok(range_values(
        sheet,
        binding.source_column_index,
        binding.range_start,
        binding.range_end,
    ))
}

/// Locate `key` on the sheet, outside `own_column`, and collect the values
/// beneath it until the first blank cell.
fn options_under_key(sheet: &Worksheet, key: &str, own_column: u16) -> Option<Vec<String>> {
    let last_row = sheet.max_row()?;
    let (row, col) = (0..=last_row).find_map(|row| {
        sheet
            .row_cells(row)
            .find(|(col, cell)| *col != own_column && cell.formatted_text() == key)
            .map(|(col, _)| (row, col))
    })?;

    let mut options = Vec::new();
    let mut r = row + 1;
    while r <= last_row {
        match sheet.value_ref_at(r, col) {
            Some(v) if !v.is_blank() => options.push(sheet.formatted_text_at(r, col)),
            _ => break,
        }
        r += 1;
    }
    Some(options)
}

/// Build the lookup table for an indirect binding
pub fn build_indirect_index(
    binding: &DropdownBinding,
    workbook: &Workbook,
) -> DropdownResult<IndirectOptionsIndex> {
    let sheet = source_sheet(binding, workbook)?;
    let keys = range_values(
        sheet,
        binding.source_column_index,
        binding.range_start,
        binding.range_end,
    );

    let mut entries = AHashMap::new();
    for key in &keys {
        if entries.contains_key(key) {
            continue;
        }
        if let Some(options) = options_under_key(sheet, key, binding.source_column_index) {
            entries.insert(key.clone(), options);
        }
    }

    Ok(IndirectOptionsIndex { keys, entries })
}

/// Read the options behind a binding
pub fn materialize_options(
    binding: &DropdownBinding,
    workbook: &Workbook,
) -> DropdownResult<MaterializedOptions> {
    match binding.kind {
        BindingKind::Direct => materialize_direct(binding, workbook).map(MaterializedOptions::Direct),
        BindingKind::Indirect => {
            build_indirect_index(binding, workbook).map(MaterializedOptions::Indirect)
        }
    }
}

/// Current options per column display name.
///
/// An empty option list is stored as a single placeholder entry so a list
/// control never ends up with nothing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsTable {
    entries: BTreeMap<String, Vec<String>>,
    placeholder: String,
}

impl OptionsTable {
    /// Create an empty table with the given placeholder text
    pub fn new<S: Into<String>>(placeholder: S) -> Self {
        Self {
            entries: BTreeMap::new(),
            placeholder: placeholder.into(),
        }
    }

    /// Placeholder used for empty option lists
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Replace a column's options
    pub fn set<S: Into<String>>(&mut self, column: S, options: &[String]) {
        let options = if options.is_empty() {
            vec![self.placeholder.clone()]
        } else {
            options.to_vec()
        };
        self.entries.insert(column.into(), options);
    }

    /// Set a column to the placeholder alone
    pub fn set_placeholder<S: Into<String>>(&mut self, column: S) {
        self.set(column, &[]);
    }

    /// A column's current options
    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.entries.get(column).map(Vec::as_slice)
    }

    /// Drop a column's entry
    pub fn remove(&mut self, column: &str) -> Option<Vec<String>> {
        self.entries.remove(column)
    }

    /// Iterate in column-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
