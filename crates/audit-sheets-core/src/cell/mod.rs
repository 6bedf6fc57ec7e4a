//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1") and reference helpers

mod address;
mod value;

pub use address::{column_index_of, column_letter_of, split_range, strip_row_digits, CellAddress};
pub use value::{format_general, CellValue};
