//! Dated export archive
//!
//! An export is a zip holding one folder, `Audit_Export_<DD-MM-YYYY>/`, with
//! the workbook `audit_data_<DD-MM-YYYY>.xlsx` inside. The archive itself is
//! meant to be saved as `Audit_Export_<DD-MM-YYYY>.zip`.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::XlsxResult;
use crate::writer::XlsxWriter;
use audit_sheets_core::Workbook;

/// `DD-MM-YYYY`
pub fn export_date_stamp(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// A finished export archive
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Suggested file name for the archive
    pub file_name: String,
    /// Path of the workbook entry inside the archive
    pub entry_path: String,
    /// Zip archive bytes
    pub bytes: Vec<u8>,
}

impl ExportBundle {
    /// Write the workbook and wrap it for the given date
    pub fn build(workbook: &Workbook, date: NaiveDate) -> XlsxResult<Self> {
        let workbook_bytes = XlsxWriter::to_bytes(workbook)?;
        Self::wrap(&workbook_bytes, date)
    }

    /// Wrap already-written workbook bytes for the given date
    pub fn wrap(workbook_bytes: &[u8], date: NaiveDate) -> XlsxResult<Self> {
        let stamp = export_date_stamp(date);
        let folder = format!("Audit_Export_{}", stamp);
        let entry_path = format!("{}/audit_data_{}.xlsx", folder, stamp);

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut cursor);
            let options = zip::write::SimpleFileOptions::default();
            zip.add_directory(format!("{}/", folder), options)?;
            zip.start_file(entry_path.as_str(), options)?;
            zip.write_all(workbook_bytes)?;
            zip.finish()?;
        }

        Ok(Self {
            file_name: format!("{}.zip", folder),
            entry_path,
            bytes: cursor.into_inner(),
        })
    }

    /// Save the archive under its suggested name inside `dir`
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> XlsxResult<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_date_stamp() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(export_date_stamp(date), "07-03-2024");
    }

    #[test]
    fn test_bundle_layout() {
        let date = NaiveDate::from_ymd_opt(2024, 11, 2).unwrap();
        let bundle = ExportBundle::wrap(b"payload", date).unwrap();
        assert_eq!(bundle.file_name, "Audit_Export_02-11-2024.zip");
        assert_eq!(
            bundle.entry_path,
            "Audit_Export_02-11-2024/audit_data_02-11-2024.xlsx"
        );

        let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        let mut entry = archive.by_name(&bundle.entry_path).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"payload");
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let bundle = ExportBundle::wrap(b"x", date).unwrap();
        let path = bundle.write_to_dir(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Audit_Export_31-01-2025.zip");
        assert!(path.exists());
    }
}
