//! Field values held by row records

use std::fmt;

use crate::cell::{format_general, CellValue};
use crate::column::ColumnType;
use crate::number_format::serial_to_iso_date;

/// A value entered for (or loaded into) a form field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// Numeric value
    Number(f64),
    /// Text value; dates are held as text
    Text(String),
}

impl FieldValue {
    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        FieldValue::Text(s.into())
    }

    /// The zero value seeded for a column of the given type
    pub fn zero_for(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Number => FieldValue::Number(0.0),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Normalize a raw cell into the declared column type.
    ///
    /// Blank cells become the type's zero value. Number columns keep numeric
    /// cells as numbers; date columns turn serials into ISO dates; everything
    /// else is held as display text.
    pub fn from_cell(value: &CellValue, column_type: ColumnType) -> Self {
        if value.is_blank() {
            return Self::zero_for(column_type);
        }
        match (column_type, value) {
            (ColumnType::Number, CellValue::Number(n)) => FieldValue::Number(*n),
            (ColumnType::Date, CellValue::Number(n)) => serial_to_iso_date(*n)
                .map(FieldValue::Text)
                .unwrap_or_else(|| FieldValue::Number(*n)),
            (_, other) => FieldValue::Text(other.to_string()),
        }
    }

    /// Whether this is empty text
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    /// Whether this is blank after trimming whitespace
    pub fn is_blank_trimmed(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    /// Get as number if numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    /// Get as text slice if textual
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// Convert into a cell value for export
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            FieldValue::Number(n) => CellValue::Number(*n),
            FieldValue::Text(s) if s.is_empty() => CellValue::Empty,
            FieldValue::Text(s) => CellValue::String(s.clone()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", format_general(*n)),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert_eq!(FieldValue::zero_for(ColumnType::Number), FieldValue::Number(0.0));
        assert_eq!(FieldValue::zero_for(ColumnType::Text), FieldValue::text(""));
        assert_eq!(FieldValue::zero_for(ColumnType::Date), FieldValue::text(""));
        assert_eq!(FieldValue::zero_for(ColumnType::DirectList), FieldValue::text(""));
    }

    #[test]
    fn test_from_cell_normalizes_to_type() {
        assert_eq!(
            FieldValue::from_cell(&CellValue::Number(4.0), ColumnType::Number),
            FieldValue::Number(4.0)
        );
        assert_eq!(
            FieldValue::from_cell(&CellValue::Number(4.0), ColumnType::Text),
            FieldValue::text("4")
        );
        assert_eq!(
            FieldValue::from_cell(&CellValue::Number(45292.0), ColumnType::Date),
            FieldValue::text("2024-01-01")
        );
        assert_eq!(
            FieldValue::from_cell(&CellValue::Empty, ColumnType::Number),
            FieldValue::Number(0.0)
        );
        assert_eq!(
            FieldValue::from_cell(&CellValue::string(""), ColumnType::CascadingList),
            FieldValue::text("")
        );
    }

    #[test]
    fn test_blankness() {
        assert!(FieldValue::text("").is_blank());
        assert!(!FieldValue::text("  ").is_blank());
        assert!(FieldValue::text("  ").is_blank_trimmed());
        assert!(!FieldValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Number(3.0).to_string(), "3");
        assert_eq!(FieldValue::Number(1.25).to_string(), "1.25");
        assert_eq!(FieldValue::text("ok").to_string(), "ok");
    }
}
