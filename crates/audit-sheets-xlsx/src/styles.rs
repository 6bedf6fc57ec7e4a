//! Number formats from `xl/styles.xml`
//!
//! Only `numFmts` and the `numFmtId` of each `cellXfs/xf` are read; fonts,
//! fills and borders play no part in type inference.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use audit_sheets_core::NumberFormat;

/// Number format per cell style index (the `s` attribute of a cell)
#[derive(Debug, Clone, Default)]
pub(crate) struct CellFormats {
    formats: Vec<NumberFormat>,
}

impl CellFormats {
    pub(crate) fn get(&self, style_index: u32) -> NumberFormat {
        self.formats
            .get(style_index as usize)
            .cloned()
            .unwrap_or_default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.formats.len()
    }
}

fn parse_num_fmt_id(e: &BytesStart) -> u32 {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"numFmtId")
        .and_then(|a| a.unescape_value().ok().and_then(|s| s.parse().ok()))
        .unwrap_or(0)
}

/// Read the number format table from a styles part
pub(crate) fn read_cell_formats<R: Read>(reader: R) -> XlsxResult<CellFormats> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut custom: HashMap<u32, String> = HashMap::new();
    let mut xf_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                // xf with alignment/protection children
                b"xf" if in_cell_xfs => xf_ids.push(parse_num_fmt_id(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    let mut id = None;
                    let mut code = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"numFmtId" => {
                                id = attr.unescape_value().ok().and_then(|s| s.parse().ok())
                            }
                            b"formatCode" => {
                                code = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }
                    if let (Some(id), Some(code)) = (id, code) {
                        custom.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => xf_ids.push(parse_num_fmt_id(&e)),
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let formats = xf_ids
        .into_iter()
        .map(|id| match custom.get(&id) {
            Some(code) => NumberFormat::from_string(code.clone()),
            None => NumberFormat::from_id(id),
        })
        .collect();

    Ok(CellFormats { formats })
}
