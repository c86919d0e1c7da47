//! Parser for the differential formats of `xl/styles.xml`.
//!
//! Only the `<dxfs>` section is decoded. The children of every `<dxf>` are kept
//! as XML with namespace prefixes removed, so they can be written back into a
//! default-namespace styles part; the stored `count` attribute is returned as
//! written and validated by the style registry.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{attribute, capture_element};
use crate::ooxml::error::Result;
use crate::ooxml::xlsx::writer::styles::Dxf;

/// The `<dxfs>` section of a styles part.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct DxfSection {
    pub entries: Vec<Dxf>,
    pub count: Option<String>,
}

pub(crate) fn parse_dxfs(content: &str) -> Result<DxfSection> {
    let mut reader = Reader::from_str(content);
    let mut section = DxfSection::default();
    let mut in_dxfs = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"dxfs" => {
                section.count = attribute(&reader, &e, b"count")?;
                in_dxfs = true;
            },
            Event::Empty(e) if e.local_name().as_ref() == b"dxfs" => {
                section.count = attribute(&reader, &e, b"count")?;
            },
            Event::End(e) if e.local_name().as_ref() == b"dxfs" => in_dxfs = false,
            Event::Start(e) if in_dxfs && e.local_name().as_ref() == b"dxf" => {
                let inner = capture_element(&mut reader, &e, false, false)?;
                section.entries.push(Dxf::Preserved(inner.trim().to_string()));
            },
            Event::Empty(e) if in_dxfs && e.local_name().as_ref() == b"dxf" => {
                section.entries.push(Dxf::Preserved(String::new()));
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_dxf_markup_and_count() {
        let xml = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/></font></fonts>
<dxfs count="2">
  <dxf><font><b/></font></dxf>
  <dxf><fill><patternFill><bgColor rgb="FFFF0000"/></patternFill></fill></dxf>
</dxfs>
</styleSheet>"#;
        let section = parse_dxfs(xml).unwrap();
        assert_eq!(section.count.as_deref(), Some("2"));
        assert_eq!(
            section.entries,
            vec![
                Dxf::Preserved("<font><b/></font>".to_string()),
                Dxf::Preserved(r#"<fill><patternFill><bgColor rgb="FFFF0000"/></patternFill></fill>"#.to_string()),
            ]
        );
    }

    #[test]
    fn prefixed_dxfs_are_unprefixed() {
        let xml = r#"<x:styleSheet xmlns:x="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><x:dxfs count="1"><x:dxf><x:font><x:b/></x:font></x:dxf></x:dxfs></x:styleSheet>"#;
        let section = parse_dxfs(xml).unwrap();
        assert_eq!(section.count.as_deref(), Some("1"));
        assert_eq!(section.entries, vec![Dxf::Preserved("<font><b/></font>".to_string())]);
    }

    #[test]
    fn missing_dxfs_section() {
        let section = parse_dxfs("<styleSheet/>").unwrap();
        assert_eq!(section, DxfSection::default());
    }

    #[test]
    fn count_is_returned_unparsed() {
        let section = parse_dxfs(r#"<styleSheet><dxfs count="abc"/></styleSheet>"#).unwrap();
        assert_eq!(section.count.as_deref(), Some("abc"));
        assert!(section.entries.is_empty());
    }
}
