//! Theme information the style registry is seeded from.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::template::THEME_XML;
use crate::ooxml::error::Result;

/// Body font used when no theme is available.
pub const DEFAULT_FONT_NAME: &str = "Calibri";
/// Body font size used for the default cell font.
pub const DEFAULT_FONT_SIZE: f64 = 11.0;

/// The parts of a workbook theme that affect cell styles.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Latin typeface of the minor (body) font
    pub minor_font: Option<String>,
}

impl Theme {
    /// Parse a `xl/theme/theme1.xml` part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut in_minor_font = false;
        let mut minor_font = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"minorFont" => {
                    in_minor_font = true;
                },
                Event::End(e) if e.local_name().as_ref() == b"minorFont" => {
                    in_minor_font = false;
                },
                Event::Start(e) | Event::Empty(e)
                    if in_minor_font && e.local_name().as_ref() == b"latin" =>
                {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"typeface" {
                            let value = attr.decode_and_unescape_value(reader.decoder())?;
                            if !value.is_empty() {
                                minor_font = Some(value.into_owned());
                            }
                        }
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(Self { minor_font })
    }

    /// Body font name, falling back to Calibri.
    pub fn body_font(&self) -> &str {
        self.minor_font.as_deref().unwrap_or(DEFAULT_FONT_NAME)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::parse(THEME_XML).unwrap_or(Self { minor_font: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_theme_uses_calibri() {
        assert_eq!(Theme::default().body_font(), "Calibri");
    }

    #[test]
    fn reads_minor_latin_typeface() {
        let xml = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:themeElements><a:fontScheme name="x"><a:majorFont><a:latin typeface="Georgia"/></a:majorFont><a:minorFont><a:latin typeface="Arial"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#;
        let theme = Theme::parse(xml).unwrap();
        assert_eq!(theme.minor_font.as_deref(), Some("Arial"));
    }
}
