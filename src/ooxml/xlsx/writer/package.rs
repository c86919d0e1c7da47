//! Package writer: parts into a zip container.

use std::io::Write;

use crate::ooxml::error::{Result, XlsxError};
use crate::ooxml::opc::PhysPkgWriter;
use crate::ooxml::opc::constants::part_name;
use crate::ooxml::xlsx::config::Compression;

use super::parts::PartMap;

/// Serializes an assembled [`PartMap`] to a zip container.
///
/// `[Content_Types].xml` is always the first entry; the remaining parts follow
/// in assembly order, one entry each.
pub struct PackageWriter;

impl PackageWriter {
    /// Serialize the parts to package bytes.
    pub fn to_bytes(parts: &PartMap, compression: Compression) -> Result<Vec<u8>> {
        let mut phys_writer = PhysPkgWriter::new(compression);

        if let Some(content_types) = parts.get(part_name::CONTENT_TYPES) {
            phys_writer.write(part_name::CONTENT_TYPES, content_types.as_bytes())?;
        }
        for (name, content) in parts.iter() {
            if name != part_name::CONTENT_TYPES {
                phys_writer.write(name, content.as_bytes())?;
            }
        }

        phys_writer.finish()
    }

    /// Write the parts as a package to a stream.
    pub fn write_to_stream<W: Write>(mut writer: W, parts: &PartMap, compression: Compression) -> Result<()> {
        let bytes = Self::to_bytes(parts, compression)?;
        writer.write_all(&bytes).map_err(XlsxError::container)?;
        writer.flush().map_err(XlsxError::container)?;
        log::debug!("wrote package of {} parts, {} bytes", parts.len(), bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::PhysPkgReader;
    use std::io::{self, Cursor};

    /// A sink whose every write fails, like a full disk.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn parts() -> PartMap {
        let mut parts = PartMap::default();
        parts.insert("xl/workbook.xml", "<workbook/>");
        parts.insert(part_name::CONTENT_TYPES, "<Types/>");
        parts.insert("xl/styles.xml", "<styleSheet/>");
        parts
    }

    #[test]
    fn content_types_first() {
        let bytes = PackageWriter::to_bytes(&parts(), Compression::Deflated).unwrap();
        let reader = PhysPkgReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            reader.member_names(),
            vec!["[Content_Types].xml", "xl/workbook.xml", "xl/styles.xml"]
        );
    }

    #[test]
    fn stored_entries_round_trip() {
        let mut out = Vec::new();
        PackageWriter::write_to_stream(&mut out, &parts(), Compression::Stored).unwrap();
        let mut reader = PhysPkgReader::new(Cursor::new(out)).unwrap();
        assert_eq!(reader.read("xl/styles.xml").unwrap(), "<styleSheet/>");
    }

    #[test]
    fn failing_sink_is_a_container_error() {
        let err = PackageWriter::write_to_stream(FullDisk, &parts(), Compression::Deflated).unwrap_err();
        assert!(matches!(err, XlsxError::ContainerIo(ref msg) if msg.contains("no space left")));
    }
}
