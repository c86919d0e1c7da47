//! Excel (.xlsx) spreadsheet packages.
//!
//! A [`Document`] holds sheets of cells and their conditional-format rules.
//! Writing it runs one assembly pass over every part of the package:
//!
//! - worksheets are rendered against a shared string table and a style registry,
//! - the workbook part lists the sheets under relationship ids `rId1..rIdN`,
//! - relationships, content types, shared strings and styles are serialized so
//!   that every index referenced from a worksheet resolves.
//!
//! Existing packages can be opened, edited and written back.

pub mod config;
pub mod document;
pub mod format;
mod reader;
pub mod repair;
pub mod sheet;
pub(crate) mod template;
pub mod theme;
pub mod writer;

pub use config::{APPLICATION_NAME, Compression, WriterConfig};
pub use document::{Document, file_to_grid};
pub use format::{
    BorderSide, BorderStyle, CellBorder, CellFill, CellFont, CellFormat, FillPattern,
};
pub use repair::{DocumentRepairer, LibreOfficeRepairer, NoRepair};
pub use sheet::{Cell, CellValue, Row, Sheet};
pub use theme::Theme;
pub use writer::{
    ConditionalFormatRequest, ConditionalFormatRule, ConditionalFormatSpec, DefinedName, Dxf,
    PartMap, RuleKind, StyleRegistry,
};
