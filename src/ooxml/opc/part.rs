//! Serialization helper shared by the serde-modelled package parts.

use serde::Serialize;

use crate::ooxml::error::{Result, XlsxError};

/// XML declaration prepended to every generated part.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Serialize a part model with quick-xml and prepend the XML declaration.
///
/// The quick-xml serializer writes exactly one namespace declaration per element it is
/// given as an attribute; callers that need extra root declarations patch the output.
pub fn serialize_part<T: Serialize>(part: &T) -> Result<String> {
    let body = quick_xml::se::to_string(part)
        .map_err(|e| XlsxError::Serialization(e.to_string()))?;
    let mut xml = String::with_capacity(XML_DECLARATION.len() + 1 + body.len());
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&body);
    Ok(xml)
}
