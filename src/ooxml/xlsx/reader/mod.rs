//! Decode path: reading an existing package back into a document model.
//!
//! Only what a later save needs is read: sheet names and order, cell values,
//! conditional-format rules, the dxf collection with its stored count, the
//! theme body font, defined names and the 1904 date system flag. Cell styles
//! of opened files are not carried over.

mod shared_strings;
mod styles_parser;
mod workbook_parser;
mod worksheet_parser;

use std::io::{Read, Seek};

use quick_xml::events::{BytesEnd, BytesRef, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::ooxml::error::{Result, XlsxError};
use crate::ooxml::opc::PhysPkgReader;
use crate::ooxml::opc::constants::part_name;

use super::sheet::Sheet;
use super::theme::Theme;
use super::writer::styles::StyleRegistry;
use super::writer::workbook::DefinedName;

/// Everything read from a package.
#[derive(Debug)]
pub(crate) struct OpenedPackage {
    pub sheets: Vec<Sheet>,
    pub styles: Option<StyleRegistry>,
    pub theme: Option<Theme>,
    pub defined_names: Vec<DefinedName>,
    pub date1904: bool,
}

/// Read a package from a seekable source.
pub(crate) fn read_package<R: Read + Seek>(source: R) -> Result<OpenedPackage> {
    let mut package = PhysPkgReader::new(source)?;

    let workbook = workbook_parser::parse_workbook(&package.read(part_name::WORKBOOK)?)?;
    let targets = match package.read_optional(part_name::WORKBOOK_RELS)? {
        Some(content) => workbook_parser::parse_relationships(&content)?,
        None => Default::default(),
    };

    let shared_strings = match package.read_optional(part_name::SHARED_STRINGS)? {
        Some(content) => shared_strings::parse_shared_strings(&content)?,
        None => Vec::new(),
    };

    let theme = package
        .read_optional(part_name::THEME)?
        .map(|content| Theme::parse(&content))
        .transpose()?;

    let styles = match package.read_optional(part_name::STYLES)? {
        Some(content) => {
            let dxfs = styles_parser::parse_dxfs(&content)?;
            Some(StyleRegistry::from_parts(
                theme.as_ref(),
                dxfs.entries,
                dxfs.count.as_deref(),
            )?)
        },
        None => None,
    };

    let mut sheets = Vec::with_capacity(workbook.sheets.len());
    for entry in &workbook.sheets {
        let target = targets
            .get(&entry.r_id)
            .ok_or_else(|| XlsxError::MissingPart(format!("relationship {}", entry.r_id)))?;
        let member = resolve_target(target);
        let content = package.read(&member)?;
        let sheet = worksheet_parser::parse_worksheet(&content, &entry.name, &shared_strings)?;
        log::debug!(
            "read sheet '{}' from {}: {} rows, {} conditional formats",
            sheet.name(),
            member,
            sheet.rows().len(),
            sheet.conditional_formats().len()
        );
        sheets.push(sheet);
    }

    Ok(OpenedPackage {
        sheets,
        styles,
        theme,
        defined_names: workbook.defined_names,
        date1904: workbook.date1904,
    })
}

/// Zip member name of a workbook relationship target.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Value of an attribute by local name, unescaped.
pub(crate) fn attribute(reader: &Reader<&[u8]>, e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.decode_and_unescape_value(reader.decoder())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parse an attribute holding a stored counter.
pub(crate) fn counter_attribute(
    reader: &Reader<&[u8]>,
    e: &BytesStart<'_>,
    name: &[u8],
    field: &'static str,
) -> Result<Option<u32>> {
    match attribute(reader, e, name)? {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| XlsxError::malformed(field, raw)),
        None => Ok(None),
    }
}

/// Whether an `xsd:boolean` attribute value is true.
pub(crate) fn is_true(value: &str) -> bool {
    matches!(value, "1" | "true")
}

/// Append an entity reference that appeared in text content.
fn push_reference(out: &mut String, reference: &BytesRef<'_>) -> Result<()> {
    let name = std::str::from_utf8(reference.as_ref())
        .map_err(|e| XlsxError::Xml(format!("invalid UTF-8 in entity reference: {}", e)))?;
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => name.strip_prefix('#').and_then(|code| {
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            value.and_then(char::from_u32)
        }),
    };
    match resolved {
        Some(ch) => out.push(ch),
        None => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        },
    }
    Ok(())
}

fn utf8_name(name: &[u8]) -> Result<&str> {
    std::str::from_utf8(name).map_err(|e| XlsxError::Xml(format!("invalid UTF-8 in name: {}", e)))
}

/// Copy of `e` under its local name, without namespace declarations.
///
/// Attributes keep the `xml:` prefix; other prefixes are dropped.
fn unprefixed_start(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<BytesStart<'static>> {
    let mut start = BytesStart::new(utf8_name(e.local_name().as_ref())?.to_string());
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = match attr.key.prefix() {
            Some(prefix) if prefix.as_ref() == b"xml" => utf8_name(attr.key.as_ref())?,
            _ => utf8_name(attr.key.local_name().into_inner())?,
        };
        let value = attr.decode_and_unescape_value(reader.decoder())?;
        start.push_attribute((key, value.as_ref()));
    }
    Ok(start)
}

/// Re-serialize the element `e` just read, with every element name unprefixed.
///
/// `empty` tells whether `e` came from an empty-element tag. With
/// `include_root` false only the children and text of `e` are returned. The
/// output carries no namespace prefixes, so it stays well-formed when placed
/// inside a part that uses a default namespace.
pub(crate) fn capture_element(
    reader: &mut Reader<&[u8]>,
    e: &BytesStart<'_>,
    empty: bool,
    include_root: bool,
) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    let root = unprefixed_start(reader, e)?;

    if empty {
        if include_root {
            writer.write_event(Event::Empty(root))?;
        }
    } else {
        if include_root {
            writer.write_event(Event::Start(root.borrow()))?;
        }
        let mut depth = 0usize;
        loop {
            match reader.read_event()? {
                Event::Start(child) => {
                    depth += 1;
                    writer.write_event(Event::Start(unprefixed_start(reader, &child)?))?;
                },
                Event::Empty(child) => {
                    writer.write_event(Event::Empty(unprefixed_start(reader, &child)?))?;
                },
                Event::End(end) if depth == 0 => {
                    if include_root {
                        let name = utf8_name(end.local_name().into_inner())?;
                        writer.write_event(Event::End(BytesEnd::new(name)))?;
                    }
                    break;
                },
                Event::End(end) => {
                    depth -= 1;
                    let name = utf8_name(end.local_name().into_inner())?;
                    writer.write_event(Event::End(BytesEnd::new(name)))?;
                },
                event @ (Event::Text(_) | Event::CData(_) | Event::GeneralRef(_)) => {
                    writer.write_event(event)?;
                },
                Event::Eof => break,
                _ => {},
            }
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| XlsxError::Xml(format!("invalid UTF-8 in captured element: {}", e)))
}

/// Collect the text content of the element just opened, up to its end tag.
///
/// Nested elements contribute their text too.
pub(crate) fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String> {
    let mut text = String::new();
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let content = std::str::from_utf8(e.as_ref())
                    .map_err(|e| XlsxError::Xml(format!("invalid UTF-8 in text content: {}", e)))?;
                text.push_str(content);
            },
            Event::CData(e) => {
                let content = std::str::from_utf8(e.as_ref())
                    .map_err(|e| XlsxError::Xml(format!("invalid UTF-8 in CDATA: {}", e)))?;
                text.push_str(content);
            },
            Event::GeneralRef(e) => push_reference(&mut text, &e)?,
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => break,
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {},
        }
    }
    Ok(text)
}
