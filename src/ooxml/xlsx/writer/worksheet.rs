//! Worksheet part rendering.

use std::fmt::Write as FmtWrite;

use crate::common::xml::escape_xml;
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::part::XML_DECLARATION;
use crate::ooxml::xlsx::sheet::{Cell, CellValue, Row, Sheet, column_to_letters};

use super::conditional::{ConditionalFormatRule, RuleKind};
use super::strings::StringInternTable;
use super::styles::StyleRegistry;

/// Written in place of NaN and infinite numbers, which have no `xsd:double` form.
const NUM_ERROR: &str = "#NUM!";

/// Render `xl/worksheets/sheetN.xml` for a sheet.
///
/// String values are interned into `strings` and cell formats registered in
/// `styles`; the indices written into the part refer to those two tables.
pub(crate) fn render_worksheet(
    sheet: &Sheet,
    strings: &mut StringInternTable,
    styles: &mut StyleRegistry,
) -> Result<String> {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    write!(
        xml,
        r#"<worksheet xmlns="{}" xmlns:r="{}">"#,
        namespace::SML_MAIN,
        namespace::OFC_RELATIONSHIPS
    )?;

    // NOTE: Excel uses 1-based row/column numbering in XML
    match sheet.used_extent() {
        Some((max_row, max_col)) if max_row > 0 || max_col > 0 => write!(
            xml,
            r#"<dimension ref="A1:{}{}"/>"#,
            column_to_letters(max_col as u32 + 1),
            max_row + 1
        )?,
        _ => xml.push_str(r#"<dimension ref="A1"/>"#),
    }

    xml.push_str(r#"<sheetViews><sheetView workbookViewId="0""#);
    if sheet.is_selected() {
        xml.push_str(r#" tabSelected="1""#);
    }
    xml.push_str("/></sheetViews>");
    xml.push_str(r#"<sheetFormatPr defaultRowHeight="15"/>"#);

    if !sheet.column_widths().is_empty() {
        xml.push_str("<cols>");
        for (&col, &width) in sheet.column_widths() {
            write!(
                xml,
                r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
                col + 1,
                width
            )?;
        }
        xml.push_str("</cols>");
    }

    xml.push_str("<sheetData>");
    for (index, row) in sheet.rows().iter().enumerate() {
        write_row(&mut xml, index + 1, row, strings, styles)?;
    }
    xml.push_str("</sheetData>");

    for rule in sheet.conditional_formats() {
        write_conditional_format(&mut xml, rule)?;
    }

    xml.push_str(r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#);
    xml.push_str("</worksheet>");
    Ok(xml)
}

fn write_row(
    xml: &mut String,
    row_num: usize,
    row: &Row,
    strings: &mut StringInternTable,
    styles: &mut StyleRegistry,
) -> Result<()> {
    let has_content = row.cells.iter().any(|cell| !cell.is_blank());
    if !has_content && row.height.is_none() && !row.hidden {
        return Ok(());
    }

    write!(xml, r#"<row r="{}""#, row_num)?;
    if let Some(height) = row.height {
        write!(xml, r#" ht="{}" customHeight="1""#, height)?;
    }
    if row.hidden {
        xml.push_str(r#" hidden="1""#);
    }
    xml.push('>');

    for (col, cell) in row.cells.iter().enumerate() {
        let cell_ref = format!("{}{}", column_to_letters(col as u32 + 1), row_num);
        write_cell(xml, &cell_ref, cell, strings, styles)?;
    }

    xml.push_str("</row>");
    Ok(())
}

fn write_cell(
    xml: &mut String,
    cell_ref: &str,
    cell: &Cell,
    strings: &mut StringInternTable,
    styles: &mut StyleRegistry,
) -> Result<()> {
    let style_attr = match cell.format.as_ref() {
        Some(format) if !format.is_default() => {
            format!(r#" s="{}""#, styles.add_cell_format(format))
        },
        _ => String::new(),
    };

    match &cell.value {
        CellValue::Empty => {
            if !style_attr.is_empty() {
                write!(xml, r#"<c r="{}"{}/>"#, cell_ref, style_attr)?;
            }
        },
        CellValue::String(s) => {
            let index = strings.intern(s);
            write!(
                xml,
                r#"<c r="{}"{} t="s"><v>{}</v></c>"#,
                cell_ref, style_attr, index
            )?;
        },
        CellValue::Int(i) => {
            write!(xml, r#"<c r="{}"{}><v>{}</v></c>"#, cell_ref, style_attr, i)?;
        },
        CellValue::Float(f) | CellValue::DateTime(f) if !f.is_finite() => {
            write!(
                xml,
                r#"<c r="{}"{} t="e"><v>{}</v></c>"#,
                cell_ref, style_attr, NUM_ERROR
            )?;
        },
        CellValue::Float(f) | CellValue::DateTime(f) => {
            write!(xml, r#"<c r="{}"{}><v>{}</v></c>"#, cell_ref, style_attr, f)?;
        },
        CellValue::Bool(b) => {
            write!(
                xml,
                r#"<c r="{}"{} t="b"><v>{}</v></c>"#,
                cell_ref,
                style_attr,
                if *b { "1" } else { "0" }
            )?;
        },
        CellValue::Error(e) => {
            write!(
                xml,
                r#"<c r="{}"{} t="e"><v>{}</v></c>"#,
                cell_ref,
                style_attr,
                escape_xml(e)
            )?;
        },
        CellValue::Formula { formula, cached } => {
            let type_attr = match cached.as_deref() {
                Some(CellValue::String(_)) => r#" t="str""#,
                Some(CellValue::Bool(_)) => r#" t="b""#,
                Some(CellValue::Error(_)) => r#" t="e""#,
                Some(CellValue::Float(f)) | Some(CellValue::DateTime(f)) if !f.is_finite() => r#" t="e""#,
                _ => "",
            };
            write!(
                xml,
                r#"<c r="{}"{}{}><f>{}</f>"#,
                cell_ref,
                style_attr,
                type_attr,
                escape_xml(formula)
            )?;
            match cached.as_deref() {
                Some(CellValue::String(s)) | Some(CellValue::Error(s)) => {
                    write!(xml, "<v>{}</v>", escape_xml(s))?
                },
                Some(CellValue::Int(i)) => write!(xml, "<v>{}</v>", i)?,
                Some(CellValue::Float(f)) | Some(CellValue::DateTime(f)) if !f.is_finite() => {
                    write!(xml, "<v>{}</v>", NUM_ERROR)?
                },
                Some(CellValue::Float(f)) | Some(CellValue::DateTime(f)) => {
                    write!(xml, "<v>{}</v>", f)?
                },
                Some(CellValue::Bool(b)) => write!(xml, "<v>{}</v>", if *b { "1" } else { "0" })?,
                _ => {},
            }
            xml.push_str("</c>");
        },
    }

    Ok(())
}

/// One `<conditionalFormatting>` block per rule, in insertion order.
fn write_conditional_format(xml: &mut String, rule: &ConditionalFormatRule) -> Result<()> {
    if let RuleKind::Preserved { xml: rule_xml, .. } = &rule.kind {
        write!(
            xml,
            r#"<conditionalFormatting sqref="{}">{}</conditionalFormatting>"#,
            escape_xml(&rule.target_range),
            rule_xml
        )?;
        return Ok(());
    }
    write!(
        xml,
        r#"<conditionalFormatting sqref="{}"><cfRule type="{}" dxfId="{}" priority="{}"><formula>{}</formula></cfRule></conditionalFormatting>"#,
        escape_xml(&rule.target_range),
        rule.kind.as_str(),
        rule.differential_format_id,
        rule.priority,
        escape_xml(&rule.formula)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::format::{CellFont, CellFormat};

    fn render(sheet: &Sheet) -> (String, StringInternTable, StyleRegistry) {
        let mut strings = StringInternTable::new();
        let mut styles = StyleRegistry::new(None);
        let xml = render_worksheet(sheet, &mut strings, &mut styles).unwrap();
        (xml, strings, styles)
    }

    #[test]
    fn empty_sheet() {
        let sheet = Sheet::new("Empty".to_string(), false);
        let (xml, strings, _) = render(&sheet);
        assert!(xml.contains(r#"<dimension ref="A1"/>"#));
        assert!(xml.contains("<sheetData></sheetData>"));
        assert!(!xml.contains("tabSelected"));
        assert!(strings.is_empty());
    }

    #[test]
    fn cells_reference_shared_tables() {
        let mut sheet = Sheet::new("Data".to_string(), true);
        sheet.set_cell_value(0, 0, "Name");
        sheet.set_cell_value(0, 1, "Name");
        sheet.set_cell_value(1, 0, 42);
        sheet.set_cell_value(1, 1, true);
        sheet.set_cell_value(1, 2, 1.5);
        sheet.set_cell_format(1, 0, CellFormat::default().with_font(CellFont::bold()));

        let (xml, strings, styles) = render(&sheet);

        assert!(xml.contains(r#"tabSelected="1""#));
        assert!(xml.contains(r#"<dimension ref="A1:C2"/>"#));
        assert!(xml.contains(r#"<c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>0</v></c>"#));
        assert!(xml.contains(r#"<c r="A2" s="1"><v>42</v></c>"#));
        assert!(xml.contains(r#"<c r="B2" t="b"><v>1</v></c>"#));
        assert!(xml.contains(r#"<c r="C2"><v>1.5</v></c>"#));
        assert_eq!(strings.export_ordered(), &["Name"]);
        assert_eq!(styles.cell_format_count(), 2);
    }

    #[test]
    fn formula_with_cached_string() {
        let mut sheet = Sheet::new("F".to_string(), false);
        sheet.set_cell_value(
            0,
            0,
            CellValue::Formula {
                formula: "A2&\"x\"".to_string(),
                cached: Some(Box::new(CellValue::from("ax"))),
            },
        );
        let (xml, strings, _) = render(&sheet);
        assert!(xml.contains(r#"<c r="A1" t="str"><f>A2&amp;&quot;x&quot;</f><v>ax</v></c>"#));
        assert!(strings.is_empty());
    }

    #[test]
    fn conditional_formats_in_insertion_order() {
        let mut sheet = Sheet::new("CF".to_string(), true);
        for (priority, range) in [(2, "B1"), (1, "A1:A3")] {
            sheet.conditional_formats_mut().push(ConditionalFormatRule {
                target_range: range.to_string(),
                kind: RuleKind::Expression,
                differential_format_id: priority - 1,
                priority,
                formula: "$B$1>50".to_string(),
            });
        }

        let (xml, _, _) = render(&sheet);

        let first = xml
            .find(r#"<conditionalFormatting sqref="B1"><cfRule type="expression" dxfId="1" priority="2"><formula>$B$1&gt;50</formula></cfRule></conditionalFormatting>"#)
            .unwrap();
        let second = xml.find(r#"<conditionalFormatting sqref="A1:A3">"#).unwrap();
        assert!(first < second);
        assert!(second < xml.find("<pageMargins").unwrap());
    }

    #[test]
    fn non_finite_numbers_become_num_errors() {
        let mut sheet = Sheet::new("N".to_string(), false);
        sheet.set_cell_value(0, 0, f64::NAN);
        sheet.set_cell_value(0, 1, CellValue::DateTime(f64::INFINITY));
        sheet.set_cell_value(
            0,
            2,
            CellValue::Formula {
                formula: "1/0".to_string(),
                cached: Some(Box::new(CellValue::Float(f64::NEG_INFINITY))),
            },
        );

        let (xml, _, _) = render(&sheet);

        assert!(xml.contains(r##"<c r="A1" t="e"><v>#NUM!</v></c>"##));
        assert!(xml.contains(r##"<c r="B1" t="e"><v>#NUM!</v></c>"##));
        assert!(xml.contains(r##"<c r="C1" t="e"><f>1/0</f><v>#NUM!</v></c>"##));
        assert!(!xml.contains("<v>NaN") && !xml.contains("<v>inf"));
    }

    #[test]
    fn preserved_rules_are_written_verbatim() {
        let mut sheet = Sheet::new("CF".to_string(), false);
        sheet.conditional_formats_mut().push(ConditionalFormatRule {
            target_range: "C1:C9".to_string(),
            kind: RuleKind::Preserved {
                rule_type: "cellIs".to_string(),
                xml: r#"<cfRule type="cellIs" dxfId="4" priority="1" operator="equal"><formula>1</formula></cfRule>"#
                    .to_string(),
            },
            differential_format_id: 4,
            priority: 1,
            formula: String::new(),
        });

        let (xml, _, _) = render(&sheet);

        assert!(xml.contains(
            r#"<conditionalFormatting sqref="C1:C9"><cfRule type="cellIs" dxfId="4" priority="1" operator="equal"><formula>1</formula></cfRule></conditionalFormatting>"#
        ));
    }
}
