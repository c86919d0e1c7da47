//! Workbook-level relationship map.
//!
//! Built fresh on every assembly pass. Worksheets are related first so the
//! sheet at position `i` always owns `rId{i+1}`; the theme, styles and shared
//! strings relationships take the next free ids.

use serde::Serialize;

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::{namespace, relationship_type as rt};
use crate::ooxml::opc::part::serialize_part;

/// A single relationship from the workbook part to a target part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    #[serde(rename = "@Id")]
    r_id: String,
    /// Relationship type URI
    #[serde(rename = "@Type")]
    reltype: String,
    /// Target path, relative to `xl/`
    #[serde(rename = "@Target")]
    target: String,
}

impl Relationship {
    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target path.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Ordered `rId -> target` mapping for `xl/_rels/workbook.xml.rels`.
#[derive(Debug, Clone, Default)]
pub struct WorkbookRels {
    rels: Vec<Relationship>,
}

#[derive(Serialize)]
#[serde(rename = "Relationships")]
struct XlsxRelationships<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "Relationship")]
    relationships: &'a [Relationship],
}

impl WorkbookRels {
    /// Create an empty relationship map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a relationship under an explicit id.
    ///
    /// An existing entry with the same id is replaced in place.
    pub fn insert(&mut self, r_id: impl Into<String>, reltype: &str, target: impl Into<String>) {
        let rel = Relationship {
            r_id: r_id.into(),
            reltype: reltype.to_string(),
            target: target.into(),
        };
        match self.rels.iter_mut().find(|r| r.r_id == rel.r_id) {
            Some(existing) => *existing = rel,
            None => self.rels.push(rel),
        }
    }

    /// Relate a worksheet; the id is derived from its 1-based position.
    pub fn insert_worksheet(&mut self, position: usize) -> (String, String) {
        let r_id = format!("rId{}", position);
        let target = format!("worksheets/sheet{}.xml", position);
        self.insert(r_id.clone(), rt::WORKSHEET, target.clone());
        (r_id, target)
    }

    /// Look up a target path by relationship id.
    pub fn get(&self, r_id: &str) -> Option<&str> {
        self.rels
            .iter()
            .find(|r| r.r_id == r_id)
            .map(|r| r.target.as_str())
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Iterate over relationships in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    /// Add the theme, styles and shared strings relationships after the sheets.
    pub fn insert_workbook_parts(&mut self) {
        let mut next = self.len() + 1;
        for (reltype, target) in [
            (rt::THEME, "theme/theme1.xml"),
            (rt::STYLES, "styles.xml"),
            (rt::SHARED_STRINGS, "sharedStrings.xml"),
        ] {
            self.insert(format!("rId{}", next), reltype, target);
            next += 1;
        }
    }

    /// Serialize to the `xl/_rels/workbook.xml.rels` part.
    pub fn to_xml(&self) -> Result<String> {
        serialize_part(&XlsxRelationships {
            xmlns: namespace::OPC_RELATIONSHIPS,
            relationships: &self.rels,
        })
    }
}
