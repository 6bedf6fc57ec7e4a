//! # audit-sheets
//!
//! Row-by-row review of spreadsheet workbooks, driven by the workbook's own
//! data validations.
//!
//! Opening a workbook and selecting a sheet infers a type for every column,
//! turns the sheet's list validations into dropdowns (including cascading
//! ones looked up by a parent column's value) and seeds the first row. The
//! [`Session`] then tracks edits, derived fields and an identity filter, and
//! exports the reviewed rows as a dated archive.
//!
//! ## Example
//!
//! ```rust,no_run
//! use audit_sheets::prelude::*;
//!
//! let mut session = Session::open_file("audit.xlsx", SessionOptions::default()).unwrap();
//! session.select_sheet("Audit").unwrap();
//! session.set_identity_filter("alice").unwrap();
//! session.set_active_field("Audit Response", FieldValue::text("ok")).unwrap();
//!
//! for view in session.field_views(1).unwrap() {
//!     println!("{} = {}", view.name, view.value);
//! }
//! ```

pub mod derived;
pub mod error;
pub mod options;
pub mod prelude;
pub mod rows;
pub mod session;

pub use derived::{Derivation, DerivedRule};
pub use error::{SessionError, SessionResult};
pub use options::SessionOptions;
pub use rows::{RowRecord, RowStore};
pub use session::{FieldView, Session};

// Re-export the pieces a caller touches directly
pub use audit_sheets_core::{
    infer_column_types, CellValue, ColumnSet, ColumnSpec, ColumnType, FieldValue, ValidationRule,
    Workbook, Worksheet,
};
pub use audit_sheets_dropdown::{
    resolve_bindings, BindingKind, DropdownBinding, Dropdowns, IndirectOptionsIndex, LinkGraph,
    OptionsTable,
};
pub use audit_sheets_xlsx::{extract_validations, ExportBundle, XlsxReader, XlsxWriter};
