//! Cell value types

use std::fmt;

/// Represents the value stored in a cell
///
/// Formula cells are loaded as their cached result, so there is no formula
/// variant here.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value (all numbers stored as f64, including date serials)
    Number(f64),

    /// String value
    String(String),

    /// Error text as stored (`#N/A`, `#REF!`, ...)
    Error(String),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Empty, or a string with no characters
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Storage type tag as written in the worksheet markup (`s`, `n`, `b`, `e`).
    ///
    /// Empty cells have no tag.
    pub fn storage_type(&self) -> Option<&'static str> {
        match self {
            CellValue::Empty => None,
            CellValue::Boolean(_) => Some("b"),
            CellValue::Number(_) => Some("n"),
            CellValue::String(_) => Some("s"),
            CellValue::Error(_) => Some("e"),
        }
    }

    /// Get as number if numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", format_general(*n)),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Render a number the way the General format shows it: integers without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_general(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_tags() {
        assert_eq!(CellValue::Empty.storage_type(), None);
        assert_eq!(CellValue::from("x").storage_type(), Some("s"));
        assert_eq!(CellValue::from(1.5).storage_type(), Some("n"));
        assert_eq!(CellValue::from(true).storage_type(), Some("b"));
        assert_eq!(CellValue::Error("#N/A".into()).storage_type(), Some("e"));
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::from(3.0).to_string(), "3");
        assert_eq!(CellValue::from(0.0).to_string(), "0");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
        assert_eq!(CellValue::from(false).to_string(), "FALSE");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("").is_blank());
        assert!(!CellValue::from(0.0).is_blank());
        assert!(!CellValue::from("a").is_blank());
    }
}
