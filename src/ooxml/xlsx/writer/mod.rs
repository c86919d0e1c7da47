//! Write-side assembly of spreadsheet packages.

pub mod conditional;
pub mod package;
pub mod parts;
pub mod strings;
pub mod styles;
pub mod workbook;
pub mod worksheet;

pub use conditional::{ConditionalFormatRequest, ConditionalFormatRule, ConditionalFormatSpec, RuleKind};
pub use package::PackageWriter;
pub use parts::{AssemblyContext, PartMap};
pub use strings::StringInternTable;
pub use styles::{Dxf, StyleRegistry};
pub use workbook::{DefinedName, fix_relationship_namespace};
