//! Error types for dropdown resolution

use thiserror::Error;

/// Result type alias using [`DropdownError`]
pub type DropdownResult<T> = std::result::Result<T, DropdownError>;

/// Reasons a single validation rule cannot be turned into a binding or its
/// options cannot be read
#[derive(Debug, Error)]
pub enum DropdownError {
    /// The range part does not have the `$COL$ROW:$COL$ROW` shape
    #[error("Malformed range reference: {0}")]
    MalformedRange(String),

    /// The formula or sqref could not be parsed
    #[error("Malformed formula: {0}")]
    MalformedFormula(String),

    /// The rule targets a column the sheet does not declare
    #[error("No declared column at index {0}")]
    UnknownColumn(u16),

    /// An indirect rule whose parent column has no direct binding
    #[error("No direct binding on source column {0} to cascade from")]
    MissingParent(u16),

    /// The binding's source sheet is not in the workbook
    #[error("Source sheet not found: {0}")]
    SheetNotFound(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] audit_sheets_core::Error),
}
