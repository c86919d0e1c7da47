//! Shared strings table for XLSX workbooks.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use crate::common::xml::escape_xml_into;
use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::part::XML_DECLARATION;

/// Write-local string interning table.
///
/// Every textual cell value seen during one assembly pass is stored once and
/// referenced from the worksheets by its zero-based index. A table is created
/// at the start of each pass and dropped at the end of it.
#[derive(Debug, Default)]
pub struct StringInternTable {
    /// Unique strings in first-seen order
    strings: Vec<String>,
    /// Map from string to index for fast lookup
    string_to_index: HashMap<String, usize>,
}

impl StringInternTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string and return its index.
    ///
    /// The first occurrence of a value gets the next sequential index; every
    /// later call with an equal value returns that same index.
    pub fn intern(&mut self, value: &str) -> usize {
        if let Some(&index) = self.string_to_index.get(value) {
            return index;
        }
        let index = self.strings.len();
        self.strings.push(value.to_string());
        self.string_to_index.insert(value.to_string(), index);
        index
    }

    /// Strings in first-seen order; position `i` is the index `intern` returned.
    pub fn export_ordered(&self) -> &[String] {
        &self.strings
    }

    /// Look up a string by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(String::as_str)
    }

    /// Number of unique strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Serialize the table to the `xl/sharedStrings.xml` part.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(256 + self.strings.len() * 16);

        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        write!(
            xml,
            r#"<sst xmlns="{}" count="{}" uniqueCount="{}">"#,
            namespace::SML_MAIN,
            self.strings.len(),
            self.strings.len()
        )?;

        for s in &self.strings {
            if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
                xml.push_str(r#"<si><t xml:space="preserve">"#);
            } else {
                xml.push_str("<si><t>");
            }
            escape_xml_into(&mut xml, s);
            xml.push_str("</t></si>");
        }

        xml.push_str("</sst>");

        Ok(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_shared_strings() {
        let mut table = StringInternTable::new();
        let idx1 = table.intern("Hello");
        let idx2 = table.intern("World");
        let idx3 = table.intern("Hello");

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.export_ordered(), &["Hello", "World"]);
    }

    #[test]
    fn xml_escapes_and_preserves_space() {
        let mut table = StringInternTable::new();
        table.intern("a < b & c");
        table.intern(" padded ");

        let xml = table.to_xml().unwrap();
        assert!(xml.contains(r#"count="2" uniqueCount="2""#));
        assert!(xml.contains("<si><t>a &lt; b &amp; c</t></si>"));
        assert!(xml.contains(r#"<si><t xml:space="preserve"> padded </t></si>"#));
    }

    #[test]
    fn empty_table_is_still_a_valid_part() {
        let xml = StringInternTable::new().to_xml().unwrap();
        assert!(xml.ends_with(r#"count="0" uniqueCount="0"></sst>"#));
    }

    proptest! {
        #[test]
        fn interning_is_idempotent(values in proptest::collection::vec(".{0,8}", 0..40)) {
            let mut table = StringInternTable::new();
            let first: Vec<usize> = values.iter().map(|v| table.intern(v)).collect();
            let second: Vec<usize> = values.iter().map(|v| table.intern(v)).collect();
            prop_assert_eq!(&first, &second);

            for (value, index) in values.iter().zip(&first) {
                prop_assert_eq!(table.get(*index), Some(value.as_str()));
            }
            for (i, a) in values.iter().enumerate() {
                for (j, b) in values.iter().enumerate() {
                    if a != b {
                        prop_assert_ne!(first[i], first[j]);
                    }
                }
            }
        }
    }
}
