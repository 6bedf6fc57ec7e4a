//! # audit-sheets-xlsx
//!
//! XLSX (Office Open XML) support for audit-sheets:
//! - [`XlsxReader`] loads a workbook with its cells, number formats and part names
//! - [`validation`] pulls the list validation rules out of a worksheet part
//! - [`XlsxWriter`] writes an exported workbook
//! - [`bundle`] wraps an export in its dated archive

pub mod bundle;
pub mod error;
pub mod reader;
pub mod validation;
pub mod writer;

mod styles;

pub use bundle::{export_date_stamp, ExportBundle};
pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use validation::{
    extract_validations, parse_validations_xml, read_validations, worksheet_part_path,
};
pub use writer::XlsxWriter;
