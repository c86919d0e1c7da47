//! Parser for worksheet parts.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{attribute, capture_element, counter_attribute, is_true, read_text_content};
use crate::ooxml::error::{Result, XlsxError};
use crate::ooxml::xlsx::sheet::{CellValue, Sheet, reference_to_coords};
use crate::ooxml::xlsx::writer::conditional::{ConditionalFormatRule, RuleKind};

/// Raw pieces of a `<c>` element.
#[derive(Debug, Default)]
struct RawCell {
    reference: Option<String>,
    cell_type: Option<String>,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
}

/// Parse a worksheet part into a sheet named `name`.
///
/// Expression rules are decoded; every other rule is kept as XML and written
/// back unchanged. A rule whose `priority` or `dxfId` is not an integer is a
/// hard error.
pub(crate) fn parse_worksheet(content: &str, name: &str, shared_strings: &[String]) -> Result<Sheet> {
    let mut reader = Reader::from_str(content);
    let mut sheet = Sheet::new(name.to_string(), false);
    let mut current_row: Option<usize> = None;
    let mut next_col: usize = 0;
    let mut cf_range: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheetView" => {
                if attribute(&reader, &e, b"tabSelected")?.is_some_and(|v| is_true(&v)) {
                    sheet.set_selected(true);
                }
            },
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"col" => {
                parse_column(&reader, &e, &mut sheet)?;
            },
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                let row_index = match attribute(&reader, &e, b"r")? {
                    Some(r) => match r.trim().parse::<usize>() {
                        Ok(n) if n > 0 => n - 1,
                        _ => return Err(XlsxError::InvalidCellReference(r)),
                    },
                    None => current_row.map_or(0, |r| r + 1),
                };
                current_row = Some(row_index);
                next_col = 0;

                let height = attribute(&reader, &e, b"ht")?.and_then(|v| v.parse::<f64>().ok());
                let hidden = attribute(&reader, &e, b"hidden")?.is_some_and(|v| is_true(&v));
                if height.is_some() || hidden {
                    let row = sheet.row_mut(row_index);
                    row.height = height;
                    row.hidden = hidden;
                }
            },
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let raw = parse_cell(&mut reader, &e)?;
                let (row, col) = cell_position(raw.reference.as_deref(), current_row, next_col)?;
                next_col = col + 1;
                let value = decode_value(raw, shared_strings);
                if value != CellValue::Empty {
                    sheet.set_cell_value(row, col, value);
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let reference = attribute(&reader, &e, b"r")?;
                next_col = cell_position(reference.as_deref(), current_row, next_col)?.1 + 1;
            },
            Event::Start(e) if e.local_name().as_ref() == b"conditionalFormatting" => {
                cf_range = attribute(&reader, &e, b"sqref")?;
            },
            Event::End(e) if e.local_name().as_ref() == b"conditionalFormatting" => {
                cf_range = None;
            },
            Event::Start(e) if e.local_name().as_ref() == b"cfRule" => {
                let xml = capture_element(&mut reader, &e, false, true)?;
                if let Some(rule) = parse_cf_rule(&reader, &e, cf_range.as_deref(), xml)? {
                    sheet.conditional_formats_mut().push(rule);
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"cfRule" => {
                let xml = capture_element(&mut reader, &e, true, true)?;
                if let Some(rule) = parse_cf_rule(&reader, &e, cf_range.as_deref(), xml)? {
                    sheet.conditional_formats_mut().push(rule);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(sheet)
}

fn parse_column(reader: &Reader<&[u8]>, e: &BytesStart<'_>, sheet: &mut Sheet) -> Result<()> {
    let width = attribute(reader, e, b"width")?.and_then(|v| v.parse::<f64>().ok());
    let custom = attribute(reader, e, b"customWidth")?.is_some_and(|v| is_true(&v));
    let (Some(width), true) = (width, custom) else {
        return Ok(());
    };
    let min = counter_attribute(reader, e, b"min", "column")?.unwrap_or(1).max(1);
    let max = counter_attribute(reader, e, b"max", "column")?.unwrap_or(min).max(min);
    for col in min..=max {
        sheet.set_column_width(col - 1, width);
    }
    Ok(())
}

/// Read the children of a `<c>` start tag.
fn parse_cell(reader: &mut Reader<&[u8]>, e: &BytesStart<'_>) -> Result<RawCell> {
    let mut raw = RawCell {
        reference: attribute(reader, e, b"r")?,
        cell_type: attribute(reader, e, b"t")?,
        ..Default::default()
    };

    loop {
        match reader.read_event()? {
            Event::Start(child) => match child.local_name().as_ref() {
                b"v" => raw.value = Some(read_text_content(reader)?),
                b"f" => raw.formula = Some(read_text_content(reader)?),
                // Inline strings may be plain or rich; all <t> text is joined
                b"is" => raw.inline = Some(read_text_content(reader)?),
                _ => {},
            },
            Event::End(end) if end.local_name().as_ref() == b"c" => break,
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(raw)
}

fn cell_position(reference: Option<&str>, current_row: Option<usize>, next_col: usize) -> Result<(usize, usize)> {
    match reference {
        Some(reference) => reference_to_coords(reference)
            .ok_or_else(|| XlsxError::InvalidCellReference(reference.to_string())),
        None => Ok((current_row.unwrap_or(0), next_col)),
    }
}

fn decode_number(text: &str) -> CellValue {
    if let Ok(i) = text.parse::<i64>() {
        return CellValue::Int(i);
    }
    match text.parse::<f64>() {
        Ok(f) => CellValue::Float(f),
        Err(_) => CellValue::String(text.to_string()),
    }
}

fn decode_value(raw: RawCell, shared_strings: &[String]) -> CellValue {
    let cell_type = raw.cell_type.as_deref().unwrap_or("n");
    let cached = match (cell_type, raw.value) {
        ("inlineStr", _) => raw.inline.map(CellValue::String),
        (_, None) => None,
        ("s", Some(v)) => Some(CellValue::String(
            v.trim()
                .parse::<usize>()
                .ok()
                .and_then(|index| shared_strings.get(index))
                .cloned()
                .unwrap_or_default(),
        )),
        ("b", Some(v)) => Some(CellValue::Bool(is_true(v.trim()))),
        ("e", Some(v)) => Some(CellValue::Error(v)),
        ("str", Some(v)) => Some(CellValue::String(v)),
        (_, Some(v)) => Some(decode_number(v.trim())),
    };

    match raw.formula {
        Some(formula) if !formula.is_empty() => CellValue::Formula {
            formula,
            cached: cached.map(Box::new),
        },
        _ => cached.unwrap_or_default(),
    }
}

/// Text of the first `<formula>` in a captured `<cfRule>`.
fn rule_formula(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(child) if child.local_name().as_ref() == b"formula" => {
                return Ok(Some(read_text_content(&mut reader)?));
            },
            Event::Eof => return Ok(None),
            _ => {},
        }
    }
}

fn parse_cf_rule(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    range: Option<&str>,
    xml: String,
) -> Result<Option<ConditionalFormatRule>> {
    let priority = counter_attribute(reader, e, b"priority", "priority")?;
    let dxf_id = counter_attribute(reader, e, b"dxfId", "dxfId")?;
    let rule_type = attribute(reader, e, b"type")?.unwrap_or_default();

    let Some(range) = range else {
        log::debug!("skipping {} rule outside <conditionalFormatting>", rule_type);
        return Ok(None);
    };

    let rule = match (priority, dxf_id) {
        (Some(priority), Some(dxf_id)) if rule_type == RuleKind::Expression.as_str() => ConditionalFormatRule {
            target_range: range.to_string(),
            kind: RuleKind::Expression,
            differential_format_id: dxf_id,
            priority,
            formula: rule_formula(&xml)?.unwrap_or_default(),
        },
        _ => ConditionalFormatRule {
            target_range: range.to_string(),
            kind: RuleKind::Preserved { rule_type, xml },
            differential_format_id: dxf_id.unwrap_or(0),
            priority: priority.unwrap_or(0),
            formula: String::new(),
        },
    };
    Ok(Some(rule))
}
