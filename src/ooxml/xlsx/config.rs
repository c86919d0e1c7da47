//! Writer configuration.

use std::time::Duration;

/// Application name written to `fileVersion/@appName` in the workbook part.
pub const APPLICATION_NAME: &str = "Loquat XLSX";

/// Compression applied to every zip entry of the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Deflate compression (what spreadsheet applications write)
    #[default]
    Deflated,
    /// No compression
    Stored,
}

/// Settings that shape how a [`Document`](super::Document) is written.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use loquat::ooxml::xlsx::{Compression, WriterConfig};
///
/// let config = WriterConfig::default()
///     .with_compression(Compression::Stored)
///     .with_repair_timeout(Duration::from_secs(60));
/// assert_eq!(config.compression, Compression::Stored);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    /// Zip entry compression
    pub compression: Compression,
    /// Upper bound for the external repair step run by `save`
    pub repair_timeout: Option<Duration>,
    /// Value of `fileVersion/@appName`
    pub application_name: String,
}

impl WriterConfig {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_repair_timeout(mut self, timeout: Duration) -> Self {
        self.repair_timeout = Some(timeout);
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Deflated,
            repair_timeout: None,
            application_name: APPLICATION_NAME.to_string(),
        }
    }
}
