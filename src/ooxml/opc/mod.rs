//! Open Packaging Conventions layer: part bookkeeping and the zip container.
//!
//! - `constants`: content types, namespaces, relationship types, fixed part names
//! - `content_types`: the `[Content_Types].xml` table
//! - `rel`: the workbook relationship map
//! - `phys_pkg`: zip container reading and writing
//! - `part`: shared serde serialization for modelled parts

pub mod constants;
pub mod content_types;
pub mod part;
pub mod phys_pkg;
pub mod rel;

pub use content_types::ContentTypes;
pub use phys_pkg::{PhysPkgReader, PhysPkgWriter};
pub use rel::{Relationship, WorkbookRels};
