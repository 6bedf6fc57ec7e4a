//! List validation extraction
//!
//! Worksheet parts carry validations in two places:
//!
//! ```xml
//! <dataValidations>
//!   <dataValidation type="list" sqref="A2:A50"><formula1>$B$2:$B$9</formula1></dataValidation>
//! </dataValidations>
//! <extLst><ext uri="...">
//!   <x14:dataValidations>
//!     <x14:dataValidation type="list">
//!       <x14:formula1><xm:f>Lookup!$A$2:$A$9</xm:f></x14:formula1>
//!       <xm:sqref>C2:C50</xm:sqref>
//!     </x14:dataValidation>
//!   </x14:dataValidations>
//! </ext></extLst>
//! ```
//!
//! Entries from the extension block come first, then the legacy ones. Only
//! `type="list"` entries are kept. The result is then reordered so all direct
//! rules precede all indirect rules.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use audit_sheets_core::{order_rules, ValidationRule};

/// Fields collected for the `dataValidation` element being read
#[derive(Debug, Default)]
struct RawValidation {
    kind: Option<String>,
    sqref_attr: Option<String>,
    ext_sqref: Option<String>,
    formula_text: Option<String>,
    ext_formula: Option<String>,
}

impl RawValidation {
    fn from_attrs(e: &BytesStart) -> Self {
        let mut raw = RawValidation::default();
        for attr in e.attributes().flatten() {
            let value = match attr.unescape_value() {
                Ok(v) => v.to_string(),
                Err(_) => continue,
            };
            match attr.key.as_ref() {
                b"type" => raw.kind = Some(value),
                b"xm:sqref" => raw.ext_sqref = Some(value),
                b"sqref" => raw.sqref_attr = Some(value),
                _ => {}
            }
        }
        raw
    }

    /// Normalize into a rule; `None` for non-list or incomplete entries
    fn into_rule(self) -> Option<ValidationRule> {
        if self.kind.as_deref() != Some("list") {
            return None;
        }
        let sqref = self.ext_sqref.or(self.sqref_attr)?;
        let formula = self
            .ext_formula
            .or(self.formula_text)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        let Some(formula) = formula else {
            log::debug!("list validation on '{}' has no formula1, skipped", sqref);
            return None;
        };
        Some(ValidationRule::simplified(sqref.trim(), &formula))
    }
}

/// Which text-bearing element we are inside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Formula1,
    ExtFormula,
    ExtSqref,
}

/// Parse the validation rules of a worksheet document.
///
/// Returns rules with simplified formulas, direct rules first.
pub fn parse_validations_xml(xml: &str) -> XlsxResult<Vec<ValidationRule>> {
    parse_validations(xml.as_bytes())
}

fn parse_validations<R: std::io::BufRead>(source: R) -> XlsxResult<Vec<ValidationRule>> {
    let mut xml_reader = Reader::from_reader(source);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut ext_rules = Vec::new();
    let mut legacy_rules = Vec::new();

    let mut in_ext_lst = false;
    let mut in_formula1 = false;
    let mut current: Option<RawValidation> = None;
    let mut target = TextTarget::None;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"extLst" => in_ext_lst = true,
                b"dataValidation" => current = Some(RawValidation::from_attrs(&e)),
                b"formula1" if current.is_some() => {
                    in_formula1 = true;
                    target = TextTarget::Formula1;
                }
                b"f" if in_formula1 => target = TextTarget::ExtFormula,
                b"sqref" if current.is_some() => target = TextTarget::ExtSqref,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"dataValidation" => {
                // No children: only an `xm:sqref`/`sqref` attribute, no formula
                let raw = RawValidation::from_attrs(&e);
                if let Some(rule) = raw.into_rule() {
                    if in_ext_lst {
                        ext_rules.push(rule);
                    } else {
                        legacy_rules.push(rule);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"extLst" => in_ext_lst = false,
                b"dataValidation" => {
                    if let Some(rule) = current.take().and_then(RawValidation::into_rule) {
                        if in_ext_lst {
                            ext_rules.push(rule);
                        } else {
                            legacy_rules.push(rule);
                        }
                    }
                    target = TextTarget::None;
                    in_formula1 = false;
                }
                b"formula1" => {
                    in_formula1 = false;
                    target = TextTarget::None;
                }
                b"f" if in_formula1 => target = TextTarget::Formula1,
                b"sqref" => target = TextTarget::None,
                _ => {}
            },
            Ok(Event::Text(e)) if target != TextTarget::None => {
                let text = e.unescape().map_err(XlsxError::Xml)?.to_string();
                let slot = current.as_mut().and_then(|raw| match target {
                    TextTarget::Formula1 => Some(&mut raw.formula_text),
                    TextTarget::ExtFormula => Some(&mut raw.ext_formula),
                    TextTarget::ExtSqref => Some(&mut raw.ext_sqref),
                    TextTarget::None => None,
                });
                if let Some(slot) = slot {
                    slot.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    ext_rules.extend(legacy_rules);
    Ok(order_rules(ext_rules))
}

/// Archive path of a worksheet part.
///
/// A bare file name (`sheet2.xml`) lives under `xl/worksheets/`.
pub fn worksheet_part_path(worksheet_file: &str) -> String {
    let trimmed = worksheet_file.trim_start_matches('/');
    if trimmed.contains('/') {
        trimmed.to_string()
    } else {
        format!("xl/worksheets/{}", trimmed)
    }
}

/// Read the list validations of one worksheet part of an archive.
pub fn read_validations(
    archive_bytes: &[u8],
    worksheet_file: &str,
) -> XlsxResult<Vec<ValidationRule>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes))?;
    let path = worksheet_part_path(worksheet_file);
    let mut file = archive
        .by_name(&path)
        .map_err(|_| XlsxError::MissingPart(path.clone()))?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    parse_validations(contents.as_slice())
}

/// Read the list validations of one worksheet part, treating any failure as
/// "no validations".
///
/// Missing parts and unreadable markup are logged and yield an empty list.
pub fn extract_validations(archive_bytes: &[u8], worksheet_file: &str) -> Vec<ValidationRule> {
    match read_validations(archive_bytes, worksheet_file) {
        Ok(rules) => rules,
        Err(e) => {
            log::warn!(
                "could not read validations from '{}', continuing without them: {}",
                worksheet_file,
                e
            );
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sqrefs(rules: &[ValidationRule]) -> Vec<&str> {
        rules.iter().map(|r| r.sqref.as_str()).collect()
    }

    #[test]
    fn test_no_validations() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#;
        assert!(parse_validations_xml(xml).unwrap().is_empty());
    }

    #[test]
    fn test_single_legacy_entry() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dataValidations count="1">
    <dataValidation type="list" allowBlank="1" showInputMessage="1" sqref="A2:A100"><formula1>$B$2:$B$5</formula1></dataValidation>
  </dataValidations>
</worksheet>"#;
        let rules = parse_validations_xml(xml).unwrap();
        assert_eq!(rules, vec![ValidationRule::new("A2:A100", "$B$2:$B$5")]);
    }

    #[test]
    fn test_only_list_entries_kept() {
        let xml = r#"<worksheet>
  <dataValidations count="2">
    <dataValidation type="whole" operator="between" sqref="B2"><formula1>1</formula1><formula2>9</formula2></dataValidation>
    <dataValidation type="list" sqref="C2"><formula1>$D$2:$D$4</formula1></dataValidation>
  </dataValidations>
</worksheet>"#;
        let rules = parse_validations_xml(xml).unwrap();
        assert_eq!(sqrefs(&rules), vec!["C2"]);
    }

    #[test]
    fn test_extension_entries_first_and_preferred() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:x14="http://schemas.microsoft.com/office/spreadsheetml/2009/9/main" xmlns:xm="http://schemas.microsoft.com/office/excel/2006/main">
  <dataValidations count="1">
    <dataValidation type="list" sqref="A2:A50"><formula1>$B$2:$B$9</formula1></dataValidation>
  </dataValidations>
  <extLst>
    <ext uri="{CCE6A557-97BC-4b89-ADB6-D9C93CAAB3DF}">
      <x14:dataValidations count="1">
        <x14:dataValidation type="list" allowBlank="1">
          <x14:formula1><xm:f>'Lookup Data'!$A$2:$A$9</xm:f></x14:formula1>
          <xm:sqref>C2:C50</xm:sqref>
        </x14:dataValidation>
      </x14:dataValidations>
    </ext>
  </extLst>
</worksheet>"#;
        let rules = parse_validations_xml(xml).unwrap();
        assert_eq!(
            rules,
            vec![
                ValidationRule::new("C2:C50", "'Lookup Data'!$A$2:$A$9"),
                ValidationRule::new("A2:A50", "$B$2:$B$9"),
            ]
        );
    }

    #[test]
    fn test_direct_rules_precede_indirect() {
        let xml = r#"<worksheet>
  <dataValidations count="3">
    <dataValidation type="list" sqref="C2:C9"><formula1>INDIRECT(VLOOKUP(B2,Lookup!$A$1:$B$9,2,FALSE))</formula1></dataValidation>
    <dataValidation type="list" sqref="B2:B9"><formula1>INDIRECT($A$2)</formula1></dataValidation>
    <dataValidation type="list" sqref="A2:A9"><formula1>Lookup!$A$2:$A$4</formula1></dataValidation>
  </dataValidations>
</worksheet>"#;
        let rules = parse_validations_xml(xml).unwrap();
        assert_eq!(sqrefs(&rules), vec!["A2:A9", "C2:C9", "B2:B9"]);
        assert_eq!(rules[1].formula1, "INDIRECT(B2)");
    }

    #[test]
    fn test_entry_without_formula_skipped() {
        let xml = r#"<worksheet><dataValidations count="2">
  <dataValidation type="list" sqref="A2"/>
  <dataValidation type="list" sqref="B2"><formula1></formula1></dataValidation>
</dataValidations></worksheet>"#;
        assert!(parse_validations_xml(xml).unwrap().is_empty());
    }

    #[test]
    fn test_escaped_formula_text() {
        let xml = r#"<worksheet><dataValidations count="1">
  <dataValidation type="list" sqref="A2"><formula1>'R&amp;D'!$A$2:$A$3</formula1></dataValidation>
</dataValidations></worksheet>"#;
        let rules = parse_validations_xml(xml).unwrap();
        assert_eq!(rules[0].formula1, "'R&D'!$A$2:$A$3");
    }

    #[test]
    fn test_malformed_markup_is_error() {
        assert!(parse_validations_xml("<worksheet><dataValidations></worksheet>").is_err());
    }

    #[test]
    fn test_worksheet_part_path() {
        assert_eq!(worksheet_part_path("sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(
            worksheet_part_path("xl/worksheets/sheet3.xml"),
            "xl/worksheets/sheet3.xml"
        );
        assert_eq!(
            worksheet_part_path("/xl/worksheets/sheet3.xml"),
            "xl/worksheets/sheet3.xml"
        );
    }

    #[test]
    fn test_extract_from_garbage_is_empty() {
        assert!(extract_validations(b"definitely not a zip", "sheet1.xml").is_empty());
    }
}
