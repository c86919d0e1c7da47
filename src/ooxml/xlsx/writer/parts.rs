//! Assembly of every package part from a document.
//!
//! One pass renders the worksheets against a shared string table and style
//! registry, then serializes the workbook, relationship, content-type, shared
//! string and styles parts so that all cross-part indices agree. The pass is
//! all-or-nothing: the first part that fails to serialize aborts it.

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, part_name};
use crate::ooxml::opc::{ContentTypes, WorkbookRels};
use crate::ooxml::xlsx::sheet::Sheet;
use crate::ooxml::xlsx::template;

use super::strings::StringInternTable;
use super::styles::StyleRegistry;
use super::workbook::{DefinedName, WorkbookPart};
use super::worksheet::render_worksheet;

/// Ordered `part name -> content` mapping produced by one assembly pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartMap {
    parts: Vec<(String, String)>,
}

impl PartMap {
    pub(crate) fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.parts.push((name.into(), content.into()));
    }

    /// Content of a part by zip entry name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_str())
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if the map has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Part names in assembly order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, content)` pairs in assembly order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parts
            .iter()
            .map(|(name, content)| (name.as_str(), content.as_str()))
    }
}

/// Mutable state shared by every step of one assembly pass.
pub struct AssemblyContext<'a> {
    /// Shared strings collected while rendering worksheets
    pub strings: &'a mut StringInternTable,
    /// Cell formats and dxfs referenced by the worksheets
    pub styles: &'a mut StyleRegistry,
}

/// Read-only workbook inputs of an assembly pass.
pub(crate) struct WorkbookInput<'a> {
    pub sheets: &'a [Sheet],
    pub defined_names: &'a [DefinedName],
    pub date1904: bool,
    pub app_name: &'a str,
}

/// Build every part of the package.
///
/// The style registry is reset first; dxfs and their counter survive the reset.
pub(crate) fn assemble(input: &WorkbookInput<'_>, ctx: &mut AssemblyContext<'_>) -> Result<PartMap> {
    let mut parts = PartMap::default();
    let mut rels = WorkbookRels::new();
    let mut content_types = ContentTypes::new();
    let mut workbook = WorkbookPart::new(input.app_name, input.date1904);

    ctx.styles.reset();

    for (index, sheet) in input.sheets.iter().enumerate() {
        let position = index + 1;
        let xml = render_worksheet(sheet, ctx.strings, ctx.styles)?;
        let (r_id, target) = rels.insert_worksheet(position);
        content_types.add_override(&format!("/xl/{}", target), ct::SML_WORKSHEET);
        workbook.add_sheet(sheet.name(), position as u32, r_id);
        log::debug!("rendered sheet '{}' as xl/{} ({} bytes)", sheet.name(), target, xml.len());
        parts.insert(format!("xl/{}", target), xml);
    }

    workbook.set_defined_names(input.defined_names);
    parts.insert(part_name::WORKBOOK, workbook.to_xml()?);

    parts.insert(part_name::PACKAGE_RELS, template::PACKAGE_RELS_XML);
    parts.insert(part_name::APP_PROPERTIES, template::APP_PROPERTIES_XML);
    parts.insert(part_name::CORE_PROPERTIES, template::CORE_PROPERTIES_XML);
    parts.insert(part_name::THEME, template::THEME_XML);

    parts.insert(part_name::SHARED_STRINGS, ctx.strings.to_xml()?);
    rels.insert_workbook_parts();
    parts.insert(part_name::WORKBOOK_RELS, rels.to_xml()?);
    parts.insert(part_name::CONTENT_TYPES, content_types.to_xml()?);

    parts.insert(part_name::STYLES, ctx.styles.to_xml()?);

    log::debug!(
        "assembled {} parts: {} shared strings, {} cell formats, {} dxfs",
        parts.len(),
        ctx.strings.len(),
        ctx.styles.cell_format_count(),
        ctx.styles.next_dxf_id()
    );
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheets(names: &[&str]) -> Vec<Sheet> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Sheet::new(name.to_string(), i == 0))
            .collect()
    }

    fn run(sheets: &[Sheet], styles: &mut StyleRegistry) -> PartMap {
        let mut strings = StringInternTable::new();
        let input = WorkbookInput {
            sheets,
            defined_names: &[],
            date1904: false,
            app_name: "Loquat XLSX",
        };
        let mut ctx = AssemblyContext {
            strings: &mut strings,
            styles,
        };
        assemble(&input, &mut ctx).unwrap()
    }

    #[test]
    fn two_sheets_yield_fixed_parts_plus_worksheets() {
        let sheets = sheets(&["Sheet1", "Sheet2"]);
        let parts = run(&sheets, &mut StyleRegistry::new(None));

        let mut names: Vec<&str> = parts.names().collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "docProps/app.xml",
                "docProps/core.xml",
                "xl/_rels/workbook.xml.rels",
                "xl/sharedStrings.xml",
                "xl/styles.xml",
                "xl/theme/theme1.xml",
                "xl/workbook.xml",
                "xl/worksheets/sheet1.xml",
                "xl/worksheets/sheet2.xml",
            ]
        );
    }

    #[test]
    fn sheets_relationships_and_content_types_align() {
        let sheets = sheets(&["Alpha", "Beta", "Gamma"]);
        let parts = run(&sheets, &mut StyleRegistry::new(None));

        let workbook = parts.get("xl/workbook.xml").unwrap();
        let rels = parts.get("xl/_rels/workbook.xml.rels").unwrap();
        let content_types = parts.get("[Content_Types].xml").unwrap();
        for (i, name) in ["Alpha", "Beta", "Gamma"].iter().enumerate() {
            let n = i + 1;
            assert!(workbook.contains(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}" state="visible"/>"#,
                name, n, n
            )));
            assert!(rels.contains(&format!(r#"Id="rId{}""#, n)));
            assert!(rels.contains(&format!(r#"Target="worksheets/sheet{}.xml""#, n)));
            assert!(content_types.contains(&format!(r#"PartName="/xl/worksheets/sheet{}.xml""#, n)));
            assert!(parts.get(&format!("xl/worksheets/sheet{}.xml", n)).is_some());
        }
        assert!(rels.contains(r#"Id="rId4""#) && rels.contains(r#"Target="theme/theme1.xml""#));
        assert!(rels.contains(r#"Id="rId6""#) && rels.contains(r#"Target="sharedStrings.xml""#));
    }

    #[test]
    fn strings_are_shared_across_sheets() {
        let mut sheets = sheets(&["A", "B"]);
        sheets[0].set_cell_value(0, 0, "same");
        sheets[1].set_cell_value(0, 0, "same");
        sheets[1].set_cell_value(0, 1, "other");

        let parts = run(&sheets, &mut StyleRegistry::new(None));

        let sst = parts.get("xl/sharedStrings.xml").unwrap();
        assert!(sst.contains(r#"count="2" uniqueCount="2""#));
        assert!(parts
            .get("xl/worksheets/sheet2.xml")
            .unwrap()
            .contains(r#"<c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c>"#));
    }

    #[test]
    fn repeated_passes_keep_dxfs() {
        let sheets = sheets(&["Sheet1"]);
        let mut styles = StyleRegistry::new(None);
        styles
            .append_dxf(crate::ooxml::xlsx::writer::styles::Dxf::Fill {
                bg_color: "FFFF0000".to_string(),
            })
            .unwrap();

        let first = run(&sheets, &mut styles);
        let second = run(&sheets, &mut styles);

        assert_eq!(first, second);
        assert!(second.get("xl/styles.xml").unwrap().contains(r#"<dxfs count="1">"#));
    }
}
