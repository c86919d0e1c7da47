//! Loquat - assembly of Office Open XML spreadsheet packages.
//!
//! A spreadsheet package is a zip container of XML parts that reference each
//! other by index and id: worksheets point into the shared string table and the
//! styles part, conditional-format rules point at differential formats, and the
//! workbook locates its sheets through relationship ids. This crate builds all
//! of those parts in one pass so the references agree, and writes the package.
//!
//! # Example - Writing a workbook
//!
//! ```no_run
//! use loquat::{ConditionalFormatRequest, Document};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! let sheet = doc.add_sheet("Scores")?;
//! sheet.set_cell_value(0, 0, "Alice");
//! sheet.set_cell_value(0, 1, 72);
//!
//! // Highlight B1 in red when it exceeds 50
//! let request: ConditionalFormatRequest = serde_json::from_str(
//!     r#"{"cf": [{"sqref": "B1", "formula": "$B$1>50", "BgColor": "FFFF0000"}]}"#,
//! )?;
//! doc.add_conditional_formats(&request)?;
//!
//! doc.save("scores.xlsx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Reading cell values
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! for (i, sheet) in loquat::file_to_grid("scores.xlsx")?.iter().enumerate() {
//!     println!("sheet {}: {:?}", i, sheet);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Logging
//!
//! Assembly steps are reported through the [`log`](https://docs.rs/log) facade
//! at debug level and the external repair step at info/warn level. No logger
//! is installed by the library.

pub mod common;
pub mod ooxml;

pub use ooxml::error::{Result, XlsxError};
pub use ooxml::xlsx::{
    Cell, CellValue, Compression, ConditionalFormatRequest, DefinedName, Document,
    DocumentRepairer, LibreOfficeRepairer, NoRepair, Row, Sheet, WriterConfig, file_to_grid,
};
