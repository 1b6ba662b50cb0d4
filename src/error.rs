//! Error types for docx-fill

use std::path::PathBuf;
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt archive: {0}")]
    CorruptArchive(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Malformed XML in part '{part}': {source}")]
    MalformedXml {
        part: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Missing required part: {0}")]
    MissingPart(String),

    #[error("Invalid part name: {0}")]
    InvalidPartName(String),

    #[error("Missing attribute '{attr}' on element '{element}'")]
    MissingAttribute { element: String, attr: String },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Table has no grid definition (w:tblGrid)")]
    MissingGrid,

    #[error("Table key '{0}' not found in replacements")]
    UnknownTableKey(String),

    #[error("Table '{key}' should have {expected} columns, but source has {found}")]
    ColumnCountMismatch {
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("Font size {0}pt is too large")]
    FontSizeOutOfRange(u32),

    #[error("No picture named '{0}' in document")]
    ImageNotFound(String),

    #[error("Relationship ID '{0}' not found")]
    RelationshipNotFound(String),

    #[error("Cannot read image '{}': {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
