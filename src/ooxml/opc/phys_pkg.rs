//! Physical package access: the zip container boundary.
//!
//! Parts go in as `(name, content)` pairs and come out as strings; nothing above
//! this module touches the zip format directly.

use std::io::{Cursor, Read, Seek, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::ooxml::error::{Result, XlsxError};
use crate::ooxml::xlsx::config::Compression;

/// Physical package writer for creating OPC packages in memory.
pub struct PhysPkgWriter {
    archive: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl PhysPkgWriter {
    /// Create a new package writer that writes to memory.
    pub fn new(compression: Compression) -> Self {
        let method = match compression {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        };
        Self {
            archive: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(method),
        }
    }

    /// Write one part as a zip entry named by its part path.
    pub fn write(&mut self, member_name: &str, blob: &[u8]) -> Result<()> {
        self.archive.start_file(member_name, self.options)?;
        self.archive.write_all(blob).map_err(XlsxError::container)?;
        Ok(())
    }

    /// Finish writing and return the package bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.archive.finish()?;
        Ok(cursor.into_inner())
    }
}

/// Physical package reader over any seekable source.
pub struct PhysPkgReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> PhysPkgReader<R> {
    /// Open a zip container.
    pub fn new(source: R) -> Result<Self> {
        let archive = ZipArchive::new(source)?;
        Ok(Self { archive })
    }

    /// Read a member as UTF-8 text, `None` when the member does not exist.
    pub fn read_optional(&mut self, member_name: &str) -> Result<Option<String>> {
        let mut file = match self.archive.by_name(member_name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(XlsxError::container)?;
        Ok(Some(content))
    }

    /// Read a member that must exist.
    pub fn read(&mut self, member_name: &str) -> Result<String> {
        self.read_optional(member_name)?
            .ok_or_else(|| XlsxError::MissingPart(member_name.to_string()))
    }

    /// Names of all members, in central directory order.
    pub fn member_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut writer = PhysPkgWriter::new(Compression::Deflated);
        writer.write("xl/workbook.xml", b"<workbook/>").unwrap();
        let zip_data = writer.finish().unwrap();

        let mut reader = PhysPkgReader::new(Cursor::new(zip_data)).unwrap();
        assert_eq!(reader.read("xl/workbook.xml").unwrap(), "<workbook/>");
    }

    #[test]
    fn test_multiple_parts_keep_order() {
        let mut writer = PhysPkgWriter::new(Compression::Stored);
        writer.write("[Content_Types].xml", b"<Types/>").unwrap();
        writer.write("_rels/.rels", b"<Relationships/>").unwrap();
        writer.write("xl/workbook.xml", b"<workbook/>").unwrap();
        let zip_data = writer.finish().unwrap();

        let reader = PhysPkgReader::new(Cursor::new(zip_data)).unwrap();
        assert_eq!(
            reader.member_names(),
            vec!["[Content_Types].xml", "_rels/.rels", "xl/workbook.xml"]
        );
    }

    #[test]
    fn missing_member_is_reported() {
        let writer = PhysPkgWriter::new(Compression::Deflated);
        let zip_data = writer.finish().unwrap();

        let mut reader = PhysPkgReader::new(Cursor::new(zip_data)).unwrap();
        assert!(reader.read_optional("xl/styles.xml").unwrap().is_none());
        assert!(matches!(
            reader.read("xl/styles.xml"),
            Err(XlsxError::MissingPart(_))
        ));
    }
}
