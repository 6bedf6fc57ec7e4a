//! XLSX reader
//!
//! Loads sheet names (in workbook order), shared strings, number formats and
//! cell values. Formula cells keep their cached value. Each worksheet records
//! the archive part it was read from so its validation markup can be found
//! later.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_cell_formats, CellFormats};
use audit_sheets_core::{CellAddress, CellValue, NumberFormat, Workbook, Worksheet};

/// Decode `_xHHHH_` escapes (`_x000d_` is CR, `_x005f_` an underscore, ...).
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < s.len() {
        let candidate = bytes.get(i..i + 7);
        if let Some(seq) = candidate {
            if seq[0] == b'_' && seq[1] == b'x' && seq[6] == b'_' {
                let decoded = std::str::from_utf8(&seq[2..6])
                    .ok()
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .and_then(char::from_u32);
                if let Some(c) = decoded {
                    out.push(c);
                    i += 7;
                    continue;
                }
            }
        }
        // Advance one whole character
        let ch_len = s[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&s[i..i + ch_len]);
        i += ch_len;
    }

    out
}

fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()))
}

/// Resolve a relationship target against the `xl/` folder
fn resolve_part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else if let Some(relative) = target.strip_prefix("../") {
        relative.to_string()
    } else {
        format!("xl/{}", target)
    }
}

/// State of the `<c>` element being read
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from raw archive bytes
    pub fn read_bytes(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_formats = match archive.by_name("xl/styles.xml") {
            Ok(file) => read_cell_formats(file)?,
            Err(_) => CellFormats::default(),
        };
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship ({})", name, r_id);
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            worksheet.set_part_name(path.as_str());
            Self::read_worksheet(
                &mut archive,
                path,
                &mut worksheet,
                &shared_strings,
                &cell_formats,
            )?;
            workbook.add_existing_worksheet(worksheet)?;
        }

        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat("workbook has no worksheets".into()));
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs are not part of the displayed text
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current));
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds, in workbook order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    if let (Some(name), Some(r_id)) =
                        (attr_string(&e, b"name"), attr_string(&e, b"r:id"))
                    {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to map rIds to worksheet part paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_string(&e, b"Id");
                    let target = attr_string(&e, b"Target");
                    let rel_type = attr_string(&e, b"Type");
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            rels.insert(id, resolve_part_path(&target));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read the cell grid of a worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_formats: &CellFormats,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut cell = PendingCell::default();
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        // Position tracking for cells written without an `r` attribute
        let mut row_idx: u32 = 0;
        let mut next_col: u16 = 0;
        let mut seen_row = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        row_idx = match attr_string(&e, b"r").and_then(|s| s.parse::<u32>().ok()) {
                            Some(r) => r.saturating_sub(1),
                            None if seen_row => row_idx + 1,
                            None => 0,
                        };
                        seen_row = true;
                        next_col = 0;
                    }
                    b"c" => {
                        in_cell = true;
                        cell = Self::pending_cell(&e);
                    }
                    b"v" if in_cell => in_value = true,
                    b"is" if in_cell => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                    // Style-only cell: occupies a position, holds no value
                    let pending = Self::pending_cell(&e);
                    if let Some(addr) = Self::locate(&pending, row_idx, next_col)? {
                        next_col = addr.col.saturating_add(1);
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        let finished = std::mem::take(&mut cell);
                        if let Some(addr) = Self::locate(&finished, row_idx, next_col)? {
                            next_col = addr.col.saturating_add(1);
                            Self::process_cell(
                                worksheet,
                                addr,
                                finished,
                                shared_strings,
                                cell_formats,
                            )?;
                        }
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let Ok(text) = e.unescape() {
                        if in_inline_text {
                            cell.cell_type = Some("inlineStr".to_string());
                        }
                        cell.value.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn pending_cell(e: &BytesStart) -> PendingCell {
        let mut cell = PendingCell::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => cell.reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string()),
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok())
                }
                _ => {}
            }
        }
        cell
    }

    fn locate(cell: &PendingCell, row: u32, next_col: u16) -> XlsxResult<Option<CellAddress>> {
        match &cell.reference {
            Some(r) => CellAddress::parse(r)
                .map(Some)
                .map_err(|e| XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, e))),
            None if next_col < audit_sheets_core::MAX_COLS => {
                Ok(Some(CellAddress::new(row, next_col)))
            }
            None => Ok(None),
        }
    }

    fn process_cell(
        worksheet: &mut Worksheet,
        addr: CellAddress,
        cell: PendingCell,
        shared_strings: &[String],
        cell_formats: &CellFormats,
    ) -> XlsxResult<()> {
        let Some(value) = cell.value else {
            return Ok(());
        };

        let cell_value = match cell.cell_type.as_deref() {
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::String(s.clone())
            }
            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),
            Some("e") => CellValue::Error(value),
            Some("inlineStr") | Some("str") => CellValue::String(decode_excel_escapes(&value)),
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::String(value),
            },
            // ISO dates (`t="d"`) and unknown types are kept as text
            Some(_) => CellValue::String(value),
        };

        worksheet.set_cell_value_at(addr.row, addr.col, cell_value)?;

        if let Some(style) = cell.style {
            let number_format = cell_formats.get(style);
            if number_format != NumberFormat::General {
                worksheet.set_number_format_at(addr.row, addr.col, number_format)?;
            }
        }

        Ok(())
    }
}
