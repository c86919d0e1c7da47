//! Constant values related to the Open Packaging Convention.
//!
//! Content type URIs, XML namespaces and relationship types used by the
//! spreadsheet package parts this crate writes.

/// Content type URIs (like MIME-types) that specify a part's format
pub mod content_type {
    pub const OFC_EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const OFC_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
    pub const OPC_CORE_PROPERTIES: &str =
        "application/vnd.openxmlformats-package.core-properties+xml";
    pub const OPC_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

    pub const SML_SHEET_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const SML_WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const SML_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
    pub const SML_SHARED_STRINGS: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml";

    pub const XML: &str = "application/xml";
}

/// XML namespace URIs
pub mod namespace {
    pub const CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
    pub const OFC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const OPC_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";
    pub const SML_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
}

/// Relationship type URIs
pub mod relationship_type {
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
}

/// Fixed part names inside a spreadsheet package.
pub mod part_name {
    pub const CONTENT_TYPES: &str = "[Content_Types].xml";
    pub const PACKAGE_RELS: &str = "_rels/.rels";
    pub const APP_PROPERTIES: &str = "docProps/app.xml";
    pub const CORE_PROPERTIES: &str = "docProps/core.xml";
    pub const THEME: &str = "xl/theme/theme1.xml";
    pub const WORKBOOK: &str = "xl/workbook.xml";
    pub const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
    pub const STYLES: &str = "xl/styles.xml";
    pub const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
}
