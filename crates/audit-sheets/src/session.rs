//! Review session
//!
//! A [`Session`] owns the uploaded workbook and all mutable review state: the
//! selected sheet with its columns and dropdowns, the row records, the
//! identity filter and the active row. Every operation runs to completion
//! before returning; selecting a sheet replaces whatever the previous
//! selection built.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::derived::apply_all;
use crate::error::{SessionError, SessionResult};
use crate::options::SessionOptions;
use crate::rows::{seed_record, visible_rows, RowRecord, RowStore};
use audit_sheets_core::{
    infer_column_types, ColumnSet, ColumnType, FieldValue, Workbook, Worksheet,
};
use audit_sheets_dropdown::Dropdowns;
use audit_sheets_xlsx::{extract_validations, ExportBundle, XlsxReader};

/// What a form shows for one column of the active row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    /// Column display name
    pub name: String,
    /// Column type
    pub column_type: ColumnType,
    /// Value to show
    pub value: FieldValue,
    /// Selectable values for list columns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug)]
struct ActiveSheet {
    name: String,
    dropdowns: Dropdowns,
    row: u32,
}

/// State of one review of one uploaded workbook
#[derive(Debug)]
pub struct Session {
    options: SessionOptions,
    bytes: Vec<u8>,
    workbook: Workbook,
    columns: BTreeMap<String, ColumnSet>,
    store: RowStore,
    active: Option<ActiveSheet>,
    identity: String,
    desired: Vec<String>,
}

impl Session {
    /// Open an uploaded workbook, rejecting empty or oversized files before
    /// parsing
    pub fn open(bytes: Vec<u8>, options: SessionOptions) -> SessionResult<Self> {
        if bytes.is_empty() {
            return Err(SessionError::EmptyUpload);
        }
        let size = bytes.len() as u64;
        if size > options.max_upload_bytes {
            return Err(SessionError::UploadTooLarge {
                size,
                limit: options.max_upload_bytes,
            });
        }

        let workbook = XlsxReader::read_bytes(&bytes)?;
        Ok(Self {
            options,
            bytes,
            workbook,
            columns: BTreeMap::new(),
            store: RowStore::new(),
            active: None,
            identity: String::new(),
            desired: Vec::new(),
        })
    }

    /// Open a workbook from disk
    pub fn open_file<P: AsRef<Path>>(path: P, options: SessionOptions) -> SessionResult<Self> {
        let path = path.as_ref();
        let size = fs::metadata(path)?.len();
        if size > options.max_upload_bytes {
            return Err(SessionError::UploadTooLarge {
                size,
                limit: options.max_upload_bytes,
            });
        }
        Self::open(fs::read(path)?, options)
    }

    /// Options in effect
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The loaded workbook
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Sheet names in workbook order
    pub fn sheets(&self) -> Vec<&str> {
        self.workbook.sheet_names()
    }

    /// Select a sheet: infer its columns, read and resolve its validations,
    /// materialize options, then visit row 1.
    pub fn select_sheet(&mut self, name: &str) -> SessionResult<()> {
        let sheet = self.workbook.require_worksheet(name)?;
        let mut columns = infer_column_types(sheet);

        let part = sheet
            .part_name()
            .unwrap_or(&self.options.fallback_worksheet_part);
        let rules = extract_validations(&self.bytes, part);

        let prior = self
            .active
            .take()
            .map(|a| a.dropdowns.bindings().to_vec())
            .unwrap_or_default();
        let dropdowns = Dropdowns::build(
            &rules,
            &self.workbook,
            name,
            &mut columns,
            &prior,
            self.options.no_options_placeholder.as_str(),
        );
        log::debug!(
            "selected '{}': {} columns, {} rules, {} bindings",
            name,
            columns.len(),
            rules.len(),
            dropdowns.bindings().len()
        );

        self.columns.insert(name.to_string(), columns);
        self.active = Some(ActiveSheet {
            name: name.to_string(),
            dropdowns,
            row: 1,
        });
        self.desired.clear();
        self.visit(1)
    }

    /// Name of the selected sheet
    pub fn active_sheet(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.name.as_str())
    }

    /// Active row of the selected sheet
    pub fn active_row(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.row)
    }

    /// Declared columns of the selected sheet
    pub fn columns(&self) -> SessionResult<&ColumnSet> {
        let active = self.active.as_ref().ok_or(SessionError::NoActiveSheet)?;
        self.columns
            .get(&active.name)
            .ok_or(SessionError::NoActiveSheet)
    }

    /// Dropdown state of the selected sheet
    pub fn dropdowns(&self) -> SessionResult<&Dropdowns> {
        self.active
            .as_ref()
            .map(|a| &a.dropdowns)
            .ok_or(SessionError::NoActiveSheet)
    }

    /// The record of a data row, seeded on first visit
    pub fn get_row(&mut self, sheet: &str, row: u32) -> SessionResult<&RowRecord> {
        if row == 0 {
            return Err(SessionError::HeaderRow);
        }
        let worksheet = self.workbook.require_worksheet(sheet)?;
        let columns = self
            .columns
            .entry(sheet.to_string())
            .or_insert_with(|| infer_column_types(worksheet));
        let record = self
            .store
            .get_or_seed(sheet, row, || seed_record(worksheet, columns, row));
        Ok(&*record)
    }

    /// Set one field. On the selected sheet this also recomputes derived
    /// fields, and on the active row it relinks the column's dependents.
    pub fn set_field(
        &mut self,
        sheet: &str,
        row: u32,
        column: &str,
        value: FieldValue,
    ) -> SessionResult<()> {
        if row == 0 {
            return Err(SessionError::HeaderRow);
        }
        let worksheet = self.workbook.require_worksheet(sheet)?;
        let columns = self
            .columns
            .entry(sheet.to_string())
            .or_insert_with(|| infer_column_types(worksheet));
        let column_type = columns
            .type_of(column)
            .ok_or_else(|| SessionError::UnknownColumn(column.to_string()))?;

        let record = self
            .store
            .get_or_seed(sheet, row, || seed_record(worksheet, columns, row));
        let value = normalize_input(value, column_type);
        record.set(column, value.clone());

        let Some(active) = self.active.as_mut().filter(|a| a.name == sheet) else {
            return Ok(());
        };
        apply_all(&self.options.derived_rules, record, columns);
        if active.row == row {
            active.dropdowns.relink(column, &value);
        }
        Ok(())
    }

    /// Set a field of the active row
    pub fn set_active_field(&mut self, column: &str, value: FieldValue) -> SessionResult<()> {
        let (sheet, row) = self
            .active
            .as_ref()
            .map(|a| (a.name.clone(), a.row))
            .ok_or(SessionError::NoActiveSheet)?;
        self.set_field(&sheet, row, column, value)
    }

    /// Restrict visible rows to those whose identity column equals `identity`.
    /// An empty value shows every row.
    pub fn set_identity_filter<S: Into<String>>(&mut self, identity: S) -> SessionResult<()> {
        self.identity = identity.into();
        let Some(row) = self.active_row() else {
            return Ok(());
        };
        let visible = self.visible_rows()?;
        if !visible.contains(&row) {
            if let Some(first) = visible.iter().copied().find(|r| *r > 0) {
                self.visit(first)?;
            }
        }
        Ok(())
    }

    /// Current identity filter
    pub fn identity_filter(&self) -> &str {
        &self.identity
    }

    /// Visible rows of the selected sheet, header (0) first
    pub fn visible_rows(&self) -> SessionResult<Vec<u32>> {
        let (sheet, columns) = self.active_parts()?;
        let identity_col = columns
            .get(&self.options.identity_column)
            .map(|spec| spec.index);
        Ok(visible_rows(sheet, identity_col, &self.identity))
    }

    /// Move to the next visible row. Stays put at the end.
    pub fn next_row(&mut self) -> SessionResult<u32> {
        let current = self.active_row().ok_or(SessionError::NoActiveSheet)?;
        let target = self
            .visible_rows()?
            .into_iter()
            .find(|r| *r > current)
            .unwrap_or(current);
        self.visit(target)?;
        Ok(target)
    }

    /// Move to the previous visible row. Never goes below row 1.
    pub fn prev_row(&mut self) -> SessionResult<u32> {
        let current = self.active_row().ok_or(SessionError::NoActiveSheet)?;
        let target = self
            .visible_rows()?
            .into_iter()
            .rev()
            .find(|r| *r >= 1 && *r < current)
            .unwrap_or(current);
        self.visit(target)?;
        Ok(target)
    }

    /// Make `row` the active row
    pub fn go_to_row(&mut self, row: u32) -> SessionResult<()> {
        self.visit(row.max(1))
    }

    /// Columns chosen for editing, in selection order
    pub fn desired_columns(&self) -> &[String] {
        &self.desired
    }

    /// Toggle a column in the editing selection. Returns whether it is now
    /// selected; unknown names are ignored.
    pub fn toggle_column(&mut self, column: &str) -> SessionResult<bool> {
        if !self.columns()?.contains(column) {
            return Ok(false);
        }
        if let Some(pos) = self.desired.iter().position(|c| c == column) {
            self.desired.remove(pos);
            Ok(false)
        } else {
            self.desired.push(column.to_string());
            Ok(true)
        }
    }

    /// Select every declared column for editing, in column order
    pub fn select_all_columns(&mut self) -> SessionResult<()> {
        let names = self
            .columns()?
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.desired = names;
        Ok(())
    }

    /// Form fields of `row` for the selected columns; `row` becomes active.
    pub fn field_views(&mut self, row: u32) -> SessionResult<Vec<FieldView>> {
        self.go_to_row(row)?;
        let active = self.active.as_ref().ok_or(SessionError::NoActiveSheet)?;
        let columns = self
            .columns
            .get(&active.name)
            .ok_or(SessionError::NoActiveSheet)?;
        let record = self.store.get(&active.name, active.row);
        let placeholder = self.options.no_options_placeholder.as_str();

        let mut views = Vec::with_capacity(self.desired.len());
        for name in &self.desired {
            let Some(column_type) = columns.type_of(name) else {
                continue;
            };
            let stored = record
                .and_then(|r| r.get(name))
                .cloned()
                .unwrap_or_else(|| FieldValue::zero_for(column_type));

            let options = column_type
                .is_list()
                .then(|| active.dropdowns.options(name).map(<[String]>::to_vec))
                .flatten();
            let value = match &options {
                Some(opts) if stored.is_blank() => opts
                    .first()
                    .filter(|first| first.as_str() != placeholder)
                    .map(|first| FieldValue::text(first.as_str()))
                    .unwrap_or(stored),
                _ => stored,
            };

            views.push(FieldView {
                name: name.clone(),
                column_type,
                value,
                options,
            });
        }
        Ok(views)
    }

    /// Rebuild a workbook from the row records: one sheet per sheet with
    /// records, in workbook order, a header row, then records by row.
    pub fn export_workbook(&self) -> SessionResult<Workbook> {
        let mut out = Workbook::empty();
        for sheet in self.workbook.worksheets() {
            let name = sheet.name();
            if !self.store.has_records(name) {
                continue;
            }
            let columns = match self.columns.get(name) {
                Some(columns) => columns.clone(),
                None => infer_column_types(sheet),
            };

            let mut target = Worksheet::new(name);
            for (col, spec) in columns.iter().enumerate() {
                target.set_cell_value_at(0, col as u16, spec.name.as_str())?;
            }
            for (out_row, (_, record)) in self.store.rows_of(name).enumerate() {
                for (col, spec) in columns.iter().enumerate() {
                    if let Some(value) = record.get(&spec.name) {
                        target.set_cell_value_at(
                            out_row as u32 + 1,
                            col as u16,
                            value.to_cell_value(),
                        )?;
                    }
                }
            }
            out.add_existing_worksheet(target)?;
        }
        Ok(out)
    }

    /// Export the row records as the dated archive
    pub fn export(&self, date: NaiveDate) -> SessionResult<ExportBundle> {
        let workbook = self.export_workbook()?;
        Ok(ExportBundle::build(&workbook, date)?)
    }

    fn active_parts(&self) -> SessionResult<(&Worksheet, &ColumnSet)> {
        let active = self.active.as_ref().ok_or(SessionError::NoActiveSheet)?;
        let sheet = self.workbook.require_worksheet(&active.name)?;
        let columns = self
            .columns
            .get(&active.name)
            .ok_or(SessionError::NoActiveSheet)?;
        Ok((sheet, columns))
    }

    /// Seed the row if needed, recompute derived fields, and point every
    /// cascading column at the row's parent values.
    fn visit(&mut self, row: u32) -> SessionResult<()> {
        let active = self.active.as_mut().ok_or(SessionError::NoActiveSheet)?;
        let sheet = self.workbook.require_worksheet(&active.name)?;
        let columns = self
            .columns
            .get(&active.name)
            .ok_or(SessionError::NoActiveSheet)?;

        active.row = row;
        let record = self
            .store
            .get_or_seed(&active.name, row, || seed_record(sheet, columns, row));
        apply_all(&self.options.derived_rules, record, columns);
        active.dropdowns.relink_all(|column| record.get(column).cloned());
        Ok(())
    }
}

/// Numeric text entered in a number column is stored as a number
fn normalize_input(value: FieldValue, column_type: ColumnType) -> FieldValue {
    match (&value, column_type) {
        (FieldValue::Text(s), ColumnType::Number) => match s.trim().parse::<f64>() {
            Ok(n) => FieldValue::Number(n),
            Err(_) => value,
        },
        _ => value,
    }
}
