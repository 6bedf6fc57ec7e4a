//! Column types and column type inference

use std::fmt;

use lazy_regex::regex_is_match;

use crate::cell::CellValue;
use crate::worksheet::Worksheet;

/// Semantic type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnType {
    /// Free text (`s`)
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "s"))]
    Text,
    /// Number (`n`)
    #[cfg_attr(feature = "serde", serde(rename = "n"))]
    Number,
    /// Date, detected from display text (`d`)
    #[cfg_attr(feature = "serde", serde(rename = "d"))]
    Date,
    /// Dropdown of literal range values (`l`)
    #[cfg_attr(feature = "serde", serde(rename = "l"))]
    DirectList,
    /// Dropdown whose options depend on another column (`rl`)
    #[cfg_attr(feature = "serde", serde(rename = "rl"))]
    CascadingList,
}

impl ColumnType {
    /// Short type tag
    pub fn tag(&self) -> &'static str {
        match self {
            ColumnType::Text => "s",
            ColumnType::Number => "n",
            ColumnType::Date => "d",
            ColumnType::DirectList => "l",
            ColumnType::CascadingList => "rl",
        }
    }

    /// Parse a short type tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "s" => Some(ColumnType::Text),
            "n" => Some(ColumnType::Number),
            "d" => Some(ColumnType::Date),
            "l" => Some(ColumnType::DirectList),
            "rl" => Some(ColumnType::CascadingList),
            _ => None,
        }
    }

    /// Whether the column is backed by a dropdown
    pub fn is_list(&self) -> bool {
        matches!(self, ColumnType::DirectList | ColumnType::CascadingList)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A declared column of a sheet
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    /// Display name taken from the header row
    pub name: String,
    /// Zero-based column index
    pub index: u16,
    /// Current type
    pub column_type: ColumnType,
    /// Type assigned by inference, before any dropdown resolution
    pub inferred_type: ColumnType,
}

/// The declared columns of a sheet, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<ColumnSpec>,
}

impl ColumnSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. A repeated name replaces the earlier column.
    pub fn insert<S: Into<String>>(&mut self, name: S, index: u16, column_type: ColumnType) {
        let name = name.into();
        self.columns.retain(|c| c.name != name);
        let spec = ColumnSpec {
            name,
            index,
            column_type,
            inferred_type: column_type,
        };
        let pos = self
            .columns
            .iter()
            .position(|c| c.index > index)
            .unwrap_or(self.columns.len());
        self.columns.insert(pos, spec);
    }

    /// Look up a column by display name
    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Current type of a column
    pub fn type_of(&self, name: &str) -> Option<ColumnType> {
        self.get(name).map(|c| c.column_type)
    }

    /// Display name of the column at an index
    pub fn name_at(&self, index: u16) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.index == index)
            .map(|c| c.name.as_str())
    }

    /// Whether a column with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Change a column's type. Returns false for unknown names.
    pub fn set_type(&mut self, name: &str, column_type: ColumnType) -> bool {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(c) => {
                c.column_type = column_type;
                true
            }
            None => false,
        }
    }

    /// Put a column back to its inferred type
    pub fn restore_inferred(&mut self, name: &str) -> bool {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(c) => {
                c.column_type = c.inferred_type;
                true
            }
            None => false,
        }
    }

    /// Iterate over columns in column order
    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter()
    }

    /// Column names in column order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Whether display text looks like `M/D/YYYY` (or with `-` separators)
pub fn looks_like_date(text: &str) -> bool {
    regex_is_match!(
        r"^(0?[1-9]|1[0-2])[/\-](0?[1-9]|[12][0-9]|3[01])[/\-](\d{4})$",
        text
    )
}

/// Infer a type for every header column of a sheet.
///
/// The first data row (row index 1) decides, falling back to the header cell
/// when that row has no cell in the column. A numeric cell whose display text
/// looks like a date is a date column.
pub fn infer_column_types(sheet: &Worksheet) -> ColumnSet {
    let mut set = ColumnSet::new();

    for (col, name) in sheet.header_names() {
        let probe = sheet.cell_at(1, col);
        let column_type = match probe.and_then(|c| c.value.storage_type()) {
            Some("n") if probe.is_some_and(|c| looks_like_date(&c.formatted_text())) => {
                ColumnType::Date
            }
            Some("n") => ColumnType::Number,
            Some(_) => ColumnType::Text,
            None => match sheet.value_ref_at(0, col).and_then(CellValue::storage_type) {
                Some("n") => ColumnType::Number,
                _ => ColumnType::Text,
            },
        };
        set.insert(name, col, column_type);
    }

    set
}
