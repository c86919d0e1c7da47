//! Style registry and `xl/styles.xml` generator.
//!
//! The registry outlives individual saves. Cell formats are rebuilt from the
//! grid on every pass (see [`StyleRegistry::reset`]); differential formats
//! (dxfs) referenced by conditional-format rules accumulate for the lifetime of
//! the document and are never renumbered.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;

use crate::common::xml::escape_xml;
use crate::ooxml::error::{Result, XlsxError};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::part::XML_DECLARATION;
use crate::ooxml::xlsx::format::{BorderSide, CellBorder, CellFill, CellFont, CellFormat, FillPattern};
use crate::ooxml::xlsx::theme::{DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE, Theme};

/// Custom number formats start at this id.
const FIRST_CUSTOM_NUM_FMT_ID: usize = 164;

/// A differential format applied by conditional-format rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dxf {
    /// Background fill delta
    Fill {
        /// ARGB hex, written as given
        bg_color: String,
    },
    /// Inner XML of a `<dxf>` read from an opened package, namespace prefixes
    /// removed, written back as read
    Preserved(String),
}

/// Key of one `cellXfs` entry: (font, fill, border, number format).
type XfKey = (usize, usize, usize, usize);

/// Cell styles and differential formats of a document.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    /// Body font every cell format falls back to
    default_font: CellFont,
    /// Unique fonts
    fonts: Vec<CellFont>,
    /// Unique fills
    fills: Vec<CellFill>,
    /// Unique borders
    borders: Vec<CellBorder>,
    /// Custom number formats, id = 164 + position
    number_formats: Vec<String>,
    /// Cell formats (XF records)
    cell_formats: Vec<XfKey>,
    /// Cell format lookup
    cell_format_map: HashMap<XfKey, usize>,
    /// Differential formats
    dxfs: Vec<Dxf>,
    /// Next assignable dxf id; authoritative over `dxfs.len()`
    dxf_count: u32,
}

impl StyleRegistry {
    /// Create a registry seeded from a theme's body font.
    pub fn new(theme: Option<&Theme>) -> Self {
        let font_name = theme
            .map(Theme::body_font)
            .unwrap_or(DEFAULT_FONT_NAME);
        let mut registry = Self {
            default_font: CellFont {
                name: Some(font_name.to_string()),
                size: Some(DEFAULT_FONT_SIZE),
                ..Default::default()
            },
            fonts: Vec::new(),
            fills: Vec::new(),
            borders: Vec::new(),
            number_formats: Vec::new(),
            cell_formats: Vec::new(),
            cell_format_map: HashMap::new(),
            dxfs: Vec::new(),
            dxf_count: 0,
        };
        registry.reset();
        registry
    }

    /// Seed a registry with the dxfs of an opened package.
    ///
    /// `raw_count` is the `dxfs/@count` attribute as stored. It becomes the next
    /// dxf id and must parse as an integer; without it the entry count is used.
    pub fn from_parts(theme: Option<&Theme>, dxfs: Vec<Dxf>, raw_count: Option<&str>) -> Result<Self> {
        let dxf_count = match raw_count {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| XlsxError::malformed("dxf count", raw))?,
            None => u32::try_from(dxfs.len()).map_err(|_| {
                XlsxError::malformed("dxf count", dxfs.len().to_string())
            })?,
        };
        let mut registry = Self::new(theme);
        registry.dxfs = dxfs;
        registry.dxf_count = dxf_count;
        Ok(registry)
    }

    /// Drop the cell formats gathered during the previous pass.
    ///
    /// Fonts, fills, borders, number formats and cell xfs go back to the
    /// defaults Excel requires; dxfs and the dxf counter are kept.
    pub fn reset(&mut self) {
        self.fonts.clear();
        self.fonts.push(self.default_font.clone());

        // Fill 0 and 1 are reserved and must be none / gray125
        self.fills.clear();
        self.fills.push(CellFill::pattern(FillPattern::None));
        self.fills.push(CellFill::pattern(FillPattern::Gray125));

        self.borders.clear();
        self.borders.push(CellBorder::default());

        self.number_formats.clear();

        self.cell_formats.clear();
        self.cell_format_map.clear();
        self.cell_formats.push((0, 0, 0, 0));
        self.cell_format_map.insert((0, 0, 0, 0), 0);
    }

    /// Add a cell format and return its style index.
    ///
    /// If an identical format has already been added, returns the existing index.
    pub fn add_cell_format(&mut self, format: &CellFormat) -> usize {
        let font_id = format.font.as_ref().map_or(0, |font| intern(&mut self.fonts, font));
        let fill_id = format.fill.as_ref().map_or(0, |fill| intern(&mut self.fills, fill));
        let border_id = format
            .border
            .as_ref()
            .map_or(0, |border| intern(&mut self.borders, border));
        let num_fmt_id = format
            .number_format
            .as_ref()
            .map_or(0, |code| FIRST_CUSTOM_NUM_FMT_ID + intern(&mut self.number_formats, code));

        let key = (font_id, fill_id, border_id, num_fmt_id);
        if let Some(&index) = self.cell_format_map.get(&key) {
            return index;
        }
        let index = self.cell_formats.len();
        self.cell_formats.push(key);
        self.cell_format_map.insert(key, index);
        index
    }

    /// The id the next appended dxf will receive.
    pub fn next_dxf_id(&self) -> u32 {
        self.dxf_count
    }

    /// Append a dxf and advance the counter; returns the id it was given.
    pub fn append_dxf(&mut self, dxf: Dxf) -> Result<u32> {
        let id = self.dxf_count;
        let next = id
            .checked_add(1)
            .ok_or_else(|| XlsxError::malformed("dxf count", id.to_string()))?;
        self.dxfs.push(dxf);
        self.dxf_count = next;
        Ok(id)
    }

    /// Store the next assignable dxf id.
    pub fn set_dxf_count(&mut self, count: u32) {
        self.dxf_count = count;
    }

    /// Differential formats in id order.
    pub fn dxfs(&self) -> &[Dxf] {
        &self.dxfs
    }

    /// Number of cell formats registered in the current pass.
    pub fn cell_format_count(&self) -> usize {
        self.cell_formats.len()
    }

    /// Append dxfs whose ids were assigned by the caller; the counter is left alone.
    pub(crate) fn extend_dxfs(&mut self, dxfs: Vec<Dxf>) {
        self.dxfs.extend(dxfs);
    }

    /// Generate the complete `xl/styles.xml` content.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        write!(xml, r#"<styleSheet xmlns="{}">"#, namespace::SML_MAIN)?;

        if !self.number_formats.is_empty() {
            write!(xml, r#"<numFmts count="{}">"#, self.number_formats.len())?;
            for (i, code) in self.number_formats.iter().enumerate() {
                write!(
                    xml,
                    r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                    FIRST_CUSTOM_NUM_FMT_ID + i,
                    escape_xml(code)
                )?;
            }
            xml.push_str("</numFmts>");
        }

        write!(xml, r#"<fonts count="{}">"#, self.fonts.len())?;
        for font in &self.fonts {
            write_font(&mut xml, font)?;
        }
        xml.push_str("</fonts>");

        write!(xml, r#"<fills count="{}">"#, self.fills.len())?;
        for fill in &self.fills {
            write_fill(&mut xml, fill)?;
        }
        xml.push_str("</fills>");

        write!(xml, r#"<borders count="{}">"#, self.borders.len())?;
        for border in &self.borders {
            write_border(&mut xml, border)?;
        }
        xml.push_str("</borders>");

        xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

        write!(xml, r#"<cellXfs count="{}">"#, self.cell_formats.len())?;
        for (font_id, fill_id, border_id, num_fmt_id) in &self.cell_formats {
            write!(
                xml,
                r#"<xf numFmtId="{}" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
                num_fmt_id, font_id, fill_id, border_id
            )?;
            if *font_id != 0 {
                xml.push_str(r#" applyFont="1""#);
            }
            if *fill_id != 0 {
                xml.push_str(r#" applyFill="1""#);
            }
            if *border_id != 0 {
                xml.push_str(r#" applyBorder="1""#);
            }
            if *num_fmt_id != 0 {
                xml.push_str(r#" applyNumberFormat="1""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</cellXfs>");

        xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);

        let mut count = itoa::Buffer::new();
        write!(xml, r#"<dxfs count="{}">"#, count.format(self.dxf_count))?;
        for dxf in &self.dxfs {
            match dxf {
                Dxf::Fill { bg_color } => write!(
                    xml,
                    r#"<dxf><fill><patternFill><bgColor rgb="{}"/></patternFill></fill></dxf>"#,
                    escape_xml(bg_color)
                )?,
                Dxf::Preserved(inner) => write!(xml, "<dxf>{}</dxf>", inner)?,
            }
        }
        xml.push_str("</dxfs>");

        xml.push_str(r#"<tableStyles count="0" defaultTableStyle="TableStyleMedium2" defaultPivotStyle="PivotStyleLight16"/>"#);
        xml.push_str("</styleSheet>");

        Ok(xml)
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Position of `item` in `list`, appending it first when absent.
fn intern<T: PartialEq + Clone>(list: &mut Vec<T>, item: &T) -> usize {
    match list.iter().position(|existing| existing == item) {
        Some(index) => index,
        None => {
            list.push(item.clone());
            list.len() - 1
        },
    }
}

fn write_font(xml: &mut String, font: &CellFont) -> Result<()> {
    xml.push_str("<font>");
    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    if font.underline {
        xml.push_str("<u/>");
    }
    if let Some(size) = font.size {
        write!(xml, r#"<sz val="{}"/>"#, size)?;
    }
    if let Some(ref color) = font.color {
        write!(xml, r#"<color rgb="{}"/>"#, escape_xml(color))?;
    }
    let name = font.name.as_deref().unwrap_or(DEFAULT_FONT_NAME);
    write!(xml, r#"<name val="{}"/>"#, escape_xml(name))?;
    xml.push_str("</font>");
    Ok(())
}

fn write_fill(xml: &mut String, fill: &CellFill) -> Result<()> {
    if fill.fg_color.is_none() && fill.bg_color.is_none() {
        write!(
            xml,
            r#"<fill><patternFill patternType="{}"/></fill>"#,
            fill.pattern_type
        )?;
        return Ok(());
    }

    write!(
        xml,
        r#"<fill><patternFill patternType="{}">"#,
        fill.pattern_type
    )?;
    if let Some(ref fg_color) = fill.fg_color {
        write!(xml, r#"<fgColor rgb="{}"/>"#, escape_xml(fg_color))?;
    }
    if let Some(ref bg_color) = fill.bg_color {
        write!(xml, r#"<bgColor rgb="{}"/>"#, escape_xml(bg_color))?;
    }
    xml.push_str("</patternFill></fill>");
    Ok(())
}

fn write_border(xml: &mut String, border: &CellBorder) -> Result<()> {
    xml.push_str("<border>");
    write_border_side(xml, "left", border.left.as_ref())?;
    write_border_side(xml, "right", border.right.as_ref())?;
    write_border_side(xml, "top", border.top.as_ref())?;
    write_border_side(xml, "bottom", border.bottom.as_ref())?;
    xml.push_str("<diagonal/></border>");
    Ok(())
}

fn write_border_side(xml: &mut String, side: &str, border_side: Option<&BorderSide>) -> Result<()> {
    match border_side {
        Some(bs) => {
            write!(xml, r#"<{} style="{}">"#, side, bs.style)?;
            if let Some(ref color) = bs.color {
                write!(xml, r#"<color rgb="{}"/>"#, escape_xml(color))?;
            }
            write!(xml, "</{}>", side)?;
        },
        None => write!(xml, "<{}/>", side)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xlsx::format::BorderStyle;

    #[test]
    fn test_create_default_styles() {
        let registry = StyleRegistry::new(None);
        assert_eq!(registry.fonts.len(), 1);
        assert_eq!(registry.fills.len(), 2);
        assert_eq!(registry.borders.len(), 1);
        assert_eq!(registry.cell_format_count(), 1);
        assert_eq!(registry.next_dxf_id(), 0);
    }

    #[test]
    fn test_add_cell_format() {
        let mut registry = StyleRegistry::new(None);
        let format = CellFormat {
            font: Some(CellFont {
                bold: true,
                ..Default::default()
            }),
            ..Default::default()
        };

        let index = registry.add_cell_format(&format);
        assert_eq!(index, 1);
        assert_eq!(registry.add_cell_format(&format), index);
        assert_eq!(registry.add_cell_format(&CellFormat::default()), 0);
    }

    #[test]
    fn theme_font_seeds_default_font() {
        let theme = Theme {
            minor_font: Some("Arial".to_string()),
        };
        let xml = StyleRegistry::new(Some(&theme)).to_xml().unwrap();
        assert!(xml.contains(r#"<name val="Arial"/>"#));
    }

    #[test]
    fn reset_keeps_dxfs() {
        let mut registry = StyleRegistry::new(None);
        registry.add_cell_format(&CellFormat {
            fill: Some(CellFill::solid("FFFFFF00")),
            ..Default::default()
        });
        registry
            .append_dxf(Dxf::Fill {
                bg_color: "FFFF0000".to_string(),
            })
            .unwrap();

        registry.reset();

        assert_eq!(registry.cell_format_count(), 1);
        assert_eq!(registry.fills.len(), 2);
        assert_eq!(registry.dxfs().len(), 1);
        assert_eq!(registry.next_dxf_id(), 1);
    }

    #[test]
    fn append_dxf_assigns_sequential_ids() {
        let mut registry = StyleRegistry::new(None);
        for expected in 0..3 {
            let id = registry
                .append_dxf(Dxf::Fill {
                    bg_color: "FF00FF00".to_string(),
                })
                .unwrap();
            assert_eq!(id, expected);
        }
        assert_eq!(registry.next_dxf_id(), 3);
    }

    #[test]
    fn stored_count_is_authoritative() {
        let registry = StyleRegistry::from_parts(
            None,
            vec![Dxf::Preserved("<font><b/></font>".to_string())],
            Some("4"),
        )
        .unwrap();
        assert_eq!(registry.next_dxf_id(), 4);
        assert!(registry.to_xml().unwrap().contains(r#"<dxfs count="4"><dxf><font><b/></font></dxf></dxfs>"#));
    }

    #[test]
    fn malformed_stored_count_is_an_error() {
        let err = StyleRegistry::from_parts(None, Vec::new(), Some("two")).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::MalformedCounter { field: "dxf count", ref value } if value == "two"
        ));
    }

    #[test]
    fn counter_overflow_is_an_error() {
        let mut registry = StyleRegistry::new(None);
        registry.set_dxf_count(u32::MAX);
        assert!(registry
            .append_dxf(Dxf::Fill {
                bg_color: "FF000000".to_string()
            })
            .is_err());
        assert!(registry.dxfs().is_empty());
    }

    #[test]
    fn test_generate_xml() {
        let mut registry = StyleRegistry::new(None);
        registry.add_cell_format(&CellFormat {
            font: Some(CellFont {
                size: Some(12.0),
                ..CellFont::bold()
            }),
            fill: Some(CellFill::solid("FFFF0000")),
            border: Some(CellBorder {
                bottom: Some(BorderSide::new(BorderStyle::Thin)),
                ..Default::default()
            }),
            number_format: Some("0.00%".to_string()),
        });
        registry
            .append_dxf(Dxf::Fill {
                bg_color: "FFFF0000".to_string(),
            })
            .unwrap();

        let xml = registry.to_xml().unwrap();
        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="0.00%"/>"#));
        assert!(xml.contains(r#"<fills count="3">"#));
        assert!(xml.contains(r#"<patternFill patternType="gray125"/>"#));
        assert!(xml.contains(r#"<bottom style="thin"></bottom>"#));
        assert!(xml.contains(r#"<cellXfs count="2">"#));
        assert!(xml.contains(
            r#"<dxfs count="1"><dxf><fill><patternFill><bgColor rgb="FFFF0000"/></patternFill></fill></dxf></dxfs>"#
        ));
        // dxfs come after cellStyles
        assert!(xml.find("<cellStyles").unwrap() < xml.find("<dxfs").unwrap());
    }
}
