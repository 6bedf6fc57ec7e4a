//! Error types for review sessions

use thiserror::Error;

/// Result type alias using [`SessionError`]
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Errors surfaced to whoever drives a [`Session`](crate::Session)
#[derive(Debug, Error)]
pub enum SessionError {
    /// Uploaded file is larger than the configured limit
    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    UploadTooLarge { size: u64, limit: u64 },

    /// Uploaded file has no content
    #[error("File is empty")]
    EmptyUpload,

    /// An operation needs a selected sheet
    #[error("No sheet selected")]
    NoActiveSheet,

    /// Row 0 holds the header, not a record
    #[error("Row 0 is the header row")]
    HeaderRow,

    /// A column the sheet does not declare
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Invalid session options
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Reading the uploaded file from disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook could not be read or written
    #[error("XLSX error: {0}")]
    Xlsx(#[from] audit_sheets_xlsx::XlsxError),

    /// Core error
    #[error("{0}")]
    Core(#[from] audit_sheets_core::Error),
}
