//! Prelude module - common imports for audit-sheets users
//!
//! ```rust
//! use audit_sheets::prelude::*;
//! ```

pub use crate::{
    // Column and value types
    ColumnSet,
    ColumnType,
    DerivedRule,
    // Dropdowns
    DropdownBinding,
    Dropdowns,
    ExportBundle,
    FieldValue,
    FieldView,
    RowRecord,
    // Session
    Session,
    SessionError,
    SessionOptions,
    SessionResult,
    Workbook,
};
