//! Parser for `xl/sharedStrings.xml`.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::read_text_content;
use crate::ooxml::error::Result;

/// Parse the shared string table; rich text runs are concatenated.
pub(crate) fn parse_shared_strings(content: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(content);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_phonetic = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic => {
                    let text = read_text_content(&mut reader)?;
                    if let Some(ref mut s) = current {
                        s.push_str(&text);
                    }
                },
                _ => {},
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.extend(current.take()),
                b"rPh" => in_phonetic = false,
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }

    Ok(strings)
}
