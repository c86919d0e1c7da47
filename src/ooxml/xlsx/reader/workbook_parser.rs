//! Parser for `xl/workbook.xml` and its relationships part.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{attribute, counter_attribute, is_true, read_text_content};
use crate::ooxml::error::Result;
use crate::ooxml::xlsx::writer::workbook::DefinedName;

/// A `<sheet>` entry of the workbook part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetEntry {
    pub name: String,
    pub r_id: String,
}

/// Workbook-level data read from `xl/workbook.xml`.
#[derive(Debug, Default)]
pub(crate) struct WorkbookInfo {
    pub sheets: Vec<SheetEntry>,
    pub defined_names: Vec<DefinedName>,
    pub date1904: bool,
}

/// Parse workbook.xml content to extract sheets, defined names and the date system.
pub(crate) fn parse_workbook(content: &str) -> Result<WorkbookInfo> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut info = WorkbookInfo::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"workbookPr" => {
                info.date1904 = attribute(&reader, &e, b"date1904")?
                    .is_some_and(|value| is_true(&value));
            },
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                // Sheets without a name or relationship cannot be located
                if let (Some(name), Some(r_id)) =
                    (attribute(&reader, &e, b"name")?, attribute(&reader, &e, b"id")?)
                {
                    info.sheets.push(SheetEntry { name, r_id });
                }
            },
            Event::Start(e) if e.local_name().as_ref() == b"definedName" => {
                let name = attribute(&reader, &e, b"name")?.unwrap_or_default();
                let local_sheet_id = counter_attribute(&reader, &e, b"localSheetId", "localSheetId")?;
                let hidden = attribute(&reader, &e, b"hidden")?.is_some_and(|value| is_true(&value));
                let reference = read_text_content(&mut reader)?;
                info.defined_names.push(DefinedName {
                    name,
                    local_sheet_id,
                    hidden,
                    reference,
                });
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(info)
}

/// Parse `xl/_rels/workbook.xml.rels` into an `Id -> Target` map.
pub(crate) fn parse_relationships(content: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) =
                    (attribute(&reader, &e, b"Id")?, attribute(&reader, &e, b"Target")?)
                {
                    targets.insert(id, target);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="1"/>
  <sheets>
    <sheet name="Data &amp; More" sheetId="1" r:id="rId1"/>
    <sheet name="Summary" sheetId="2" r:id="rId2"/>
  </sheets>
  <definedNames>
    <definedName name="_xlnm.Print_Area" localSheetId="1" hidden="1">Summary!$A$1:$C$3</definedName>
  </definedNames>
</workbook>"#;

    #[test]
    fn reads_sheets_in_order() {
        let info = parse_workbook(WORKBOOK).unwrap();
        assert_eq!(
            info.sheets,
            vec![
                SheetEntry {
                    name: "Data & More".to_string(),
                    r_id: "rId1".to_string()
                },
                SheetEntry {
                    name: "Summary".to_string(),
                    r_id: "rId2".to_string()
                },
            ]
        );
        assert!(info.date1904);
    }

    #[test]
    fn reads_defined_names() {
        let info = parse_workbook(WORKBOOK).unwrap();
        assert_eq!(
            info.defined_names,
            vec![DefinedName {
                name: "_xlnm.Print_Area".to_string(),
                local_sheet_id: Some(1),
                hidden: true,
                reference: "Summary!$A$1:$C$3".to_string(),
            }]
        );
    }

    #[test]
    fn reads_relationship_targets() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="x" Target="worksheets/sheet1.xml"/></Relationships>"#;
        let targets = parse_relationships(rels).unwrap();
        assert_eq!(targets.get("rId1").map(String::as_str), Some("worksheets/sheet1.xml"));
    }
}
