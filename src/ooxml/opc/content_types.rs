//! `[Content_Types].xml` model.

use serde::Serialize;

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{content_type as ct, namespace};
use crate::ooxml::opc::part::serialize_part;

/// Content type mapping by file extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultType {
    #[serde(rename = "@Extension")]
    pub extension: String,
    #[serde(rename = "@ContentType")]
    pub content_type: String,
}

/// Content type mapping for a single part name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideType {
    #[serde(rename = "@PartName")]
    pub part_name: String,
    #[serde(rename = "@ContentType")]
    pub content_type: String,
}

/// The content types table written to `[Content_Types].xml`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "Types")]
pub struct ContentTypes {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "Default")]
    defaults: Vec<DefaultType>,
    #[serde(rename = "Override")]
    overrides: Vec<OverrideType>,
}

impl ContentTypes {
    /// Create a table seeded with the entries every spreadsheet package needs.
    pub fn new() -> Self {
        let mut types = Self {
            xmlns: namespace::CONTENT_TYPES,
            defaults: Vec::new(),
            overrides: Vec::new(),
        };

        types.add_default("rels", ct::OPC_RELATIONSHIPS);
        types.add_default("xml", ct::XML);

        types.add_override("/_rels/.rels", ct::OPC_RELATIONSHIPS);
        types.add_override("/docProps/app.xml", ct::OFC_EXTENDED_PROPERTIES);
        types.add_override("/docProps/core.xml", ct::OPC_CORE_PROPERTIES);
        types.add_override("/xl/_rels/workbook.xml.rels", ct::OPC_RELATIONSHIPS);
        types.add_override("/xl/sharedStrings.xml", ct::SML_SHARED_STRINGS);
        types.add_override("/xl/styles.xml", ct::SML_STYLES);
        types.add_override("/xl/workbook.xml", ct::SML_SHEET_MAIN);
        types.add_override("/xl/theme/theme1.xml", ct::OFC_THEME);

        types
    }

    /// Map an extension to a content type.
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults.push(DefaultType {
            extension: extension.to_string(),
            content_type: content_type.to_string(),
        });
    }

    /// Map one part name (with leading `/`) to a content type.
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        self.overrides.push(OverrideType {
            part_name: part_name.to_string(),
            content_type: content_type.to_string(),
        });
    }

    /// Look up the override registered for a part name.
    pub fn override_for(&self, part_name: &str) -> Option<&str> {
        self.overrides
            .iter()
            .find(|o| o.part_name == part_name)
            .map(|o| o.content_type.as_str())
    }

    /// All override entries in registration order.
    pub fn overrides(&self) -> &[OverrideType] {
        &self.overrides
    }

    /// Serialize to the `[Content_Types].xml` part.
    pub fn to_xml(&self) -> Result<String> {
        serialize_part(self)
    }
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::new()
    }
}
