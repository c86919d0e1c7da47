/// Error types for spreadsheet package assembly and decoding.
use thiserror::Error;

/// Result type for package operations.
pub type Result<T> = std::result::Result<T, XlsxError>;

/// Error types for package operations.
#[derive(Error, Debug)]
pub enum XlsxError {
    /// A sheet with this name already exists in the document
    #[error("duplicate sheet name '{0}'")]
    DuplicateName(String),

    /// A stored counter (rule priority, dxf count) is not a valid integer
    #[error("malformed {field} counter: {value:?}")]
    MalformedCounter {
        /// Which counter failed to parse
        field: &'static str,
        /// The offending stored value
        value: String,
    },

    /// A part could not be encoded to XML
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The zip container could not be opened, written or closed
    #[error("container error: {0}")]
    ContainerIo(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The external repair tool is not installed
    #[error("repair tool '{0}' is not installed or not on PATH")]
    ToolUnavailable(String),

    /// The external repair tool ran but did not produce a repaired file
    #[error("repair failed: {0}")]
    RepairFailed(String),

    /// A part required by the decode path is missing from the package
    #[error("part not found: {0}")]
    MissingPart(String),

    /// A part could not be parsed as XML
    #[error("XML error: {0}")]
    Xml(String),

    /// A cell reference such as `AB12` could not be decoded
    #[error("invalid cell reference: {0}")]
    InvalidCellReference(String),
}

impl XlsxError {
    /// Build a [`XlsxError::MalformedCounter`] for a stored counter value.
    pub(crate) fn malformed(field: &'static str, value: impl Into<String>) -> Self {
        XlsxError::MalformedCounter {
            field,
            value: value.into(),
        }
    }

    /// Build a [`XlsxError::ContainerIo`] for an IO failure on the zip container.
    pub(crate) fn container(err: std::io::Error) -> Self {
        XlsxError::ContainerIo(err.to_string())
    }
}

impl From<zip::result::ZipError> for XlsxError {
    fn from(err: zip::result::ZipError) -> Self {
        XlsxError::ContainerIo(err.to_string())
    }
}

impl From<quick_xml::Error> for XlsxError {
    fn from(err: quick_xml::Error) -> Self {
        XlsxError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XlsxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        XlsxError::Xml(err.to_string())
    }
}

impl From<std::fmt::Error> for XlsxError {
    fn from(err: std::fmt::Error) -> Self {
        XlsxError::Serialization(format!("XML write error: {}", err))
    }
}
