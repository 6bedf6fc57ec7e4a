//! # audit-sheets-core
//!
//! Core data structures for the audit-sheets review engine.
//!
//! This crate provides the fundamental types used throughout audit-sheets:
//! - [`CellValue`] and [`CellAddress`] - Cell values and A1-style addressing
//! - [`Workbook`], [`Worksheet`] - The loaded document
//! - [`ColumnType`] and [`ColumnSet`] - Column types and their inference
//! - [`ValidationRule`] - List validation rules and their ordering
//! - [`FieldValue`] - Values held by row records
//!
//! ## Example
//!
//! ```rust
//! use audit_sheets_core::{infer_column_types, ColumnType, Worksheet};
//!
//! let mut sheet = Worksheet::new("Audit");
//! sheet.set_cell_value("A1", "Score").unwrap();
//! sheet.set_cell_value("A2", 4.0).unwrap();
//!
//! let columns = infer_column_types(&sheet);
//! assert_eq!(columns.type_of("Score"), Some(ColumnType::Number));
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod field;
pub mod number_format;
pub mod validation;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{column_index_of, column_letter_of, split_range, strip_row_digits, CellAddress, CellValue};
pub use column::{infer_column_types, ColumnSet, ColumnSpec, ColumnType};
pub use error::{Error, Result};
pub use field::FieldValue;
pub use number_format::NumberFormat;
pub use validation::{order_rules, simplify_formula, RuleKind, ValidationRule};
pub use workbook::Workbook;
pub use worksheet::{CellData, Worksheet};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
