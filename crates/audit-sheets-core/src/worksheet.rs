//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellValue};
use crate::error::{Error, Result};
use crate::number_format::NumberFormat;
use crate::{MAX_COLS, MAX_ROWS};

/// Complete cell data: value plus the number format applied to it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellData {
    /// The stored value
    pub value: CellValue,
    /// Number format resolved from the cell's style
    pub number_format: NumberFormat,
}

impl CellData {
    /// Create cell data with the general format
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            number_format: NumberFormat::General,
        }
    }

    /// Text as the spreadsheet would display it
    pub fn formatted_text(&self) -> String {
        self.number_format.format_value(&self.value)
    }
}

/// A worksheet (single sheet in a workbook)
///
/// Row and column indices are 0-based; row 0 is the header row.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Archive part holding this sheet (e.g. `xl/worksheets/sheet2.xml`)
    part_name: Option<String>,
    /// Cells keyed by (row, col), in row-major order
    cells: BTreeMap<(u32, u16), CellData>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            part_name: None,
            cells: BTreeMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Archive part name, when the sheet was loaded from a file
    pub fn part_name(&self) -> Option<&str> {
        self.part_name.as_deref()
    }

    /// Set the archive part name
    pub fn set_part_name<S: Into<String>>(&mut self, part_name: S) {
        self.part_name = Some(part_name.into());
    }

    /// Whether the sheet holds no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(&(addr.row, addr.col)))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(&(row, col))
    }

    /// Get cell value by address string
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(&(row, col))
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Borrow a cell value by indices
    pub fn value_ref_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col)).map(|c| &c.value)
    }

    /// Display text of a cell; empty for absent cells
    pub fn formatted_text_at(&self, row: u32, col: u16) -> String {
        self.cells
            .get(&(row, col))
            .map(CellData::formatted_text)
            .unwrap_or_default()
    }

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by indices, keeping any existing number format
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        Self::check_bounds(row, col)?;
        let value = value.into();
        if value.is_empty() {
            if let Some(cell) = self.cells.get_mut(&(row, col)) {
                cell.value = CellValue::Empty;
            }
            return Ok(());
        }
        self.cells.entry((row, col)).or_default().value = value;
        Ok(())
    }

    /// Set the number format of a cell
    pub fn set_number_format_at(
        &mut self,
        row: u32,
        col: u16,
        number_format: NumberFormat,
    ) -> Result<()> {
        Self::check_bounds(row, col)?;
        self.cells.entry((row, col)).or_default().number_format = number_format;
        Ok(())
    }

    fn check_bounds(row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        Ok(())
    }

    // === Extent ===

    /// Highest row index holding a cell
    pub fn max_row(&self) -> Option<u32> {
        self.cells.keys().next_back().map(|(row, _)| *row)
    }

    /// Cells of one row in column order
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells
            .range((row, 0)..=(row, u16::MAX))
            .map(|((_, col), cell)| (*col, cell))
    }

    /// Iterate over all cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u16), &CellData)> {
        self.cells.iter().map(|(k, v)| (*k, v))
    }

    /// Header names from row 0, as (column index, display text).
    ///
    /// Blank header cells are skipped.
    pub fn header_names(&self) -> Vec<(u16, String)> {
        self.row_cells(0)
            .filter(|(_, cell)| !cell.value.is_blank())
            .map(|(col, cell)| (col, cell.formatted_text()))
            .collect()
    }
}
