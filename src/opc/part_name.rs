//! Part names inside a DOCX archive

use crate::error::{Error, Result};
use std::fmt;

/// Name of a part within a package, as stored in the archive.
///
/// Names never start with '/'. Example: `word/document.xml`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartName {
    path: String,
}

impl PartName {
    /// Create a new PartName from an archive entry name or an absolute part URI.
    ///
    /// A leading '/' is stripped so `/word/document.xml` and `word/document.xml`
    /// name the same part.
    pub fn new(path: &str) -> Result<Self> {
        let path = path.trim().trim_start_matches('/');

        if path.is_empty() || path.ends_with('/') {
            return Err(Error::InvalidPartName(format!("'{}' is not a file", path)));
        }

        if path.contains("//") {
            return Err(Error::InvalidPartName(format!(
                "invalid path '{}': contains double slashes",
                path
            )));
        }

        Ok(Self {
            path: path.to_string(),
        })
    }

    /// Get the path as a string slice
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Get the file name portion
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Get the file extension
    pub fn extension(&self) -> Option<&str> {
        self.file_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }

    /// Get the parent directory ("" for parts at the archive root)
    pub fn parent(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    /// Resolve a relationship target against this part.
    ///
    /// For `word/document.xml` and `media/image1.png`, returns `word/media/image1.png`
    pub fn resolve(&self, target: &str) -> Result<PartName> {
        if target.starts_with('/') {
            return PartName::new(target);
        }

        let mut segments: Vec<&str> = self
            .parent()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        for segment in target.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }

        PartName::new(&segments.join("/"))
    }
}

impl fmt::Display for PartName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// Well-known part names
pub mod well_known {
    /// Main document part
    pub const DOCUMENT: &str = "word/document.xml";
    /// Relationships of the main document part
    pub const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";
    /// Content types part
    pub const CONTENT_TYPES: &str = "[Content_Types].xml";
    /// Directory holding embedded media, relative to the archive root
    pub const MEDIA_DIR: &str = "word/media";
}
