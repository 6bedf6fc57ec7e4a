//! In-memory XLSX fixtures for session tests

#![allow(dead_code)]

use std::io::{Cursor, Write};

use audit_sheets_core::column_letter_of;

/// A fixture cell
#[derive(Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    /// A date serial styled with the built-in `m/d/yyyy` format
    Date(f64),
    Blank,
}

pub use Cell::{Blank, Date, Number, Text};

/// One worksheet of a fixture
pub struct SheetSpec<'a> {
    pub name: &'a str,
    pub rows: Vec<Vec<Cell<'a>>>,
    /// Raw `<dataValidations>`/`<extLst>` markup placed after `sheetData`
    pub validations: &'a str,
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn sheet_xml(spec: &SheetSpec<'_>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:x14="http://schemas.microsoft.com/office/spreadsheetml/2009/9/main" xmlns:xm="http://schemas.microsoft.com/office/excel/2006/main"><sheetData>"#,
    );
    for (r, row) in spec.rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let addr = format!("{}{}", column_letter_of(c as u16), r + 1);
            match cell {
                Text(s) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    addr,
                    escape(s)
                )),
                Number(n) => xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, addr, n)),
                Date(n) => xml.push_str(&format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, addr, n)),
                Blank => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>");
    xml.push_str(spec.validations);
    xml.push_str("</worksheet>");
    xml
}

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs></styleSheet>"#;

/// Build an XLSX archive holding the given sheets, in order
pub fn build_xlsx(sheets: &[SheetSpec<'_>]) -> Vec<u8> {
    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (i, sheet) in sheets.iter().enumerate() {
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(sheet.name),
            i + 1,
            i + 1
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    workbook.push_str("</sheets></workbook>");
    rels.push_str("</Relationships>");

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        let mut add = |name: String, body: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        };
        add(
            "[Content_Types].xml".into(),
            r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#,
        );
        add("xl/workbook.xml".into(), &workbook);
        add("xl/_rels/workbook.xml.rels".into(), &rels);
        add("xl/styles.xml".into(), STYLES);
        for (i, sheet) in sheets.iter().enumerate() {
            add(format!("xl/worksheets/sheet{}.xml", i + 1), &sheet_xml(sheet));
        }
        zip.finish().unwrap();
    }
    buf
}

/// Validations of the audit sheet: Region is a direct list over
/// `Lookup!B2:B4`, City cascades from it. The cascading rule sits in the
/// extension block, which comes first in the document.
pub const AUDIT_VALIDATIONS: &str = r#"<dataValidations count="1"><dataValidation type="list" allowBlank="1" sqref="B2:B100"><formula1>Lookup!$B$2:$B$4</formula1></dataValidation><dataValidation type="whole" sqref="E2:E100"><formula1>0</formula1></dataValidation></dataValidations><extLst><ext uri="{CCE6A557-97BC-4b89-ADB6-D9C93CAAB3DF}"><x14:dataValidations count="1"><x14:dataValidation type="list"><x14:formula1><xm:f>INDIRECT(VLOOKUP($B$2,Lookup!$A$1:$D$4,2,FALSE))</xm:f></x14:formula1><xm:sqref>C2:C100</xm:sqref></x14:dataValidation></x14:dataValidations></ext></extLst>"#;

/// A two-sheet audit workbook.
///
/// Audit columns: Operator, Region, City, Audit Response,
/// # of Incorrect Segment, # of Missed Segment, # Segment Error, Visit Date.
/// Data rows are operated by alice, bob and alice.
pub fn audit_workbook() -> Vec<u8> {
    let header = vec![
        Text("Operator"),
        Text("Region"),
        Text("City"),
        Text("Audit Response"),
        Text("# of Incorrect Segment"),
        Text("# of Missed Segment"),
        Text("# Segment Error"),
        Text("Visit Date"),
    ];
    let audit = SheetSpec {
        name: "Audit",
        rows: vec![
            header,
            vec![
                Text("alice"),
                Text("West"),
                Blank,
                Text("ok"),
                Number(2.0),
                Number(1.0),
                Number(0.0),
                Date(45306.0),
            ],
            vec![
                Text("bob"),
                Blank,
                Blank,
                Blank,
                Number(4.0),
                Number(4.0),
                Number(0.0),
                Blank,
            ],
            vec![
                Text("alice"),
                Text("East"),
                Text("Boston"),
                Blank,
                Number(1.0),
                Number(1.0),
                Number(5.0),
                Date(45292.0),
            ],
        ],
        validations: AUDIT_VALIDATIONS,
    };
    let lookup = SheetSpec {
        name: "Lookup",
        rows: vec![
            vec![Text("Id"), Text("Regions"), Blank, Text("East"), Text("West")],
            vec![Number(1.0), Text("East"), Blank, Text("Boston"), Text("Denver")],
            vec![Number(2.0), Text("West"), Blank, Text("Miami"), Text("Reno")],
            vec![Number(3.0), Text("North"), Blank, Blank, Text("Boise")],
        ],
        validations: "",
    };
    build_xlsx(&[audit, lookup])
}
