//! Cell formatting consumed by the style registry.
//!
//! Colors are ARGB hex strings such as `"FFFF0000"`. Every component of a
//! [`CellFormat`] is optional; a format with no components set maps to the
//! default cell xf (index 0).

use std::fmt;

/// The visual format of a cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    pub font: Option<CellFont>,
    pub fill: Option<CellFill>,
    pub border: Option<CellBorder>,
    /// Custom number format code, e.g. `"0.00%"`
    pub number_format: Option<String>,
}

impl CellFormat {
    pub fn with_font(mut self, font: CellFont) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_fill(mut self, fill: CellFill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_border(mut self, border: CellBorder) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_number_format(mut self, code: impl Into<String>) -> Self {
        self.number_format = Some(code.into());
        self
    }

    /// True when the format adds nothing to the default xf.
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFont {
    /// Falls back to the theme's minor font
    pub name: Option<String>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<String>,
}

impl CellFont {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellFill {
    pub pattern_type: FillPattern,
    pub fg_color: Option<String>,
    pub bg_color: Option<String>,
}

impl CellFill {
    /// A solid fill in one ARGB color.
    pub fn solid(color: impl Into<String>) -> Self {
        Self {
            pattern_type: FillPattern::Solid,
            fg_color: Some(color.into()),
            bg_color: None,
        }
    }

    /// A fill carrying only a pattern; used for the two reserved fills.
    pub(crate) fn pattern(pattern_type: FillPattern) -> Self {
        Self {
            pattern_type,
            fg_color: None,
            bg_color: None,
        }
    }
}

/// `patternType` values the registry emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPattern {
    None,
    Solid,
    Gray125,
}

impl fmt::Display for FillPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Gray125 => "gray125",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellBorder {
    pub left: Option<BorderSide>,
    pub right: Option<BorderSide>,
    pub top: Option<BorderSide>,
    pub bottom: Option<BorderSide>,
}

impl CellBorder {
    /// The same line on all four sides.
    pub fn all(side: BorderSide) -> Self {
        Self {
            left: Some(side.clone()),
            right: Some(side.clone()),
            top: Some(side.clone()),
            bottom: Some(side),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorderSide {
    pub style: BorderStyle,
    pub color: Option<String>,
}

impl BorderSide {
    pub fn new(style: BorderStyle) -> Self {
        Self { style, color: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Double => "double",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_format_is_default() {
        assert!(CellFormat::default().is_default());
        assert!(!CellFormat::default().with_number_format("0.0").is_default());
    }

    #[test]
    fn border_all_sets_every_side() {
        let border = CellBorder::all(BorderSide::new(BorderStyle::Dashed));
        assert_eq!(border.left, border.bottom);
        assert_eq!(border.top.map(|s| s.style.to_string()).as_deref(), Some("dashed"));
    }
}
