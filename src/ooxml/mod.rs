//! Office Open XML (OOXML) spreadsheet packages.
//!
//! The module is organized into layers:
//!
//! 1. **OPC layer** (`opc`): zip container access, relationships, content types
//! 2. **Errors** (`error`): the error type shared by every layer
//! 3. **Format layer** (`xlsx`): the spreadsheet document, its writer and reader
pub mod error;
pub mod opc;
pub mod xlsx;

pub use error::{Result, XlsxError};
