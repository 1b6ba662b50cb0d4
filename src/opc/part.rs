//! Part representation for DOCX packages

use crate::error::Result;
use crate::xml::XmlDocument;
use std::borrow::Cow;

/// A part within a package
#[derive(Clone, Debug)]
pub enum Part {
    /// Parsed XML (`*.xml`, `*.rels`)
    Xml(XmlPart),
    /// Image payload (`*.png`, `*.jpg`, `*.jpeg`)
    Binary(Vec<u8>),
    /// Anything else, passed through untouched
    Opaque(Vec<u8>),
}

/// How an archive entry is loaded
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartClass {
    Xml,
    Binary,
    Opaque,
}

impl PartClass {
    /// Classify an archive entry by the suffix of its name
    pub fn of(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name.ends_with("xml") || name.ends_with("rels") {
            PartClass::Xml
        } else if name.ends_with("jpeg") || name.ends_with("jpg") || name.ends_with("png") {
            PartClass::Binary
        } else {
            PartClass::Opaque
        }
    }
}

/// An XML part: the parsed tree plus the bytes it was loaded from
#[derive(Clone, Debug)]
pub struct XmlPart {
    /// Source bytes, if loaded from an archive
    source: Option<Vec<u8>>,
    /// Parsed tree
    document: XmlDocument,
    /// Whether the tree has been handed out for mutation
    modified: bool,
}

impl XmlPart {
    /// Parse raw part data
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        let document = XmlDocument::parse(std::str::from_utf8(&data)?)?;
        Ok(Self {
            source: Some(data),
            document,
            modified: false,
        })
    }

    /// Wrap a tree built in memory
    pub fn from_document(document: XmlDocument) -> Self {
        Self {
            source: None,
            document,
            modified: true,
        }
    }

    /// Get the parsed tree
    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Get the parsed tree mutably; the part will be re-serialized on save
    pub fn document_mut(&mut self) -> &mut XmlDocument {
        self.modified = true;
        &mut self.document
    }

    /// Check if the part has been modified
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Bytes to store in the archive.
    ///
    /// Unmodified parts return their source bytes verbatim.
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match &self.source {
            Some(source) if !self.modified => Ok(Cow::Borrowed(source.as_slice())),
            _ => Ok(Cow::Owned(self.document.to_bytes()?)),
        }
    }
}

impl Part {
    /// Load an archive entry according to its [`PartClass`]
    pub fn load(name: &str, data: Vec<u8>) -> Result<Self> {
        Ok(match PartClass::of(name) {
            PartClass::Xml => Part::Xml(XmlPart::parse(data)?),
            PartClass::Binary => Part::Binary(data),
            PartClass::Opaque => Part::Opaque(data),
        })
    }

    /// Get the XML part, if this is one
    pub fn as_xml(&self) -> Option<&XmlPart> {
        match self {
            Part::Xml(xml) => Some(xml),
            _ => None,
        }
    }

    /// Get the XML part mutably, if this is one
    pub fn as_xml_mut(&mut self) -> Option<&mut XmlPart> {
        match self {
            Part::Xml(xml) => Some(xml),
            _ => None,
        }
    }

    /// Bytes to store in the archive
    pub fn to_bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Part::Xml(xml) => xml.to_bytes(),
            Part::Binary(data) | Part::Opaque(data) => Ok(Cow::Borrowed(data.as_slice())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(PartClass::of("word/document.xml"), PartClass::Xml);
        assert_eq!(PartClass::of("_rels/.rels"), PartClass::Xml);
        assert_eq!(PartClass::of("word/media/image1.jpeg"), PartClass::Binary);
        assert_eq!(PartClass::of("word/media/image2.PNG"), PartClass::Binary);
        assert_eq!(PartClass::of("word/media/image3.emf"), PartClass::Opaque);
        assert_eq!(PartClass::of("word/vbaProject.bin"), PartClass::Opaque);
    }

    #[test]
    fn test_unmodified_part_keeps_source_bytes() {
        let data = b"<?xml version='1.0'?>\n<root   a='1' ><!-- keep --></root>".to_vec();
        let part = XmlPart::parse(data.clone()).unwrap();

        assert!(!part.is_modified());
        assert_eq!(part.to_bytes().unwrap().as_ref(), data.as_slice());
    }

    #[test]
    fn test_modified_part_is_reserialized() {
        let mut part = XmlPart::parse(b"<root a='1'/>".to_vec()).unwrap();
        part.document_mut().root.set_attr_local("a", "2");

        let bytes = part.to_bytes().unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with(crate::xml::XML_DECLARATION));
        assert!(text.ends_with(r#"<root a="2"/>"#));
    }

    #[test]
    fn test_invalid_xml_fails_to_load() {
        assert!(Part::load("word/document.xml", b"<w:p>".to_vec()).is_err());
        assert!(Part::load("word/media/x.png", b"<w:p>".to_vec()).is_ok());
    }
}
