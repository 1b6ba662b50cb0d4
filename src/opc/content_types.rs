//! Content Types handling for DOCX packages
//!
//! Reads and edits `[Content_Types].xml`

use crate::error::{Error, Result};
use crate::xml::{ElementKind, XmlDocument, XmlElement, XmlNode};
use std::collections::HashMap;

/// Snapshot of the extension defaults of a package.
///
/// `Override` entries are left to the XML; media parts are always covered by
/// an extension default.
#[derive(Clone, Debug, Default)]
pub struct ContentTypes {
    /// Lowercase extension -> content type
    defaults: HashMap<String, String>,
}

impl ContentTypes {
    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::from_document(&XmlDocument::parse(xml)?)
    }

    /// Read from a parsed `[Content_Types].xml`
    pub fn from_document(doc: &XmlDocument) -> Result<Self> {
        let mut ct = Self::default();

        for e in doc.root.elements().filter(|e| e.local_name() == "Default") {
            let ext = required_attr(e, "Extension")?;
            let content_type = required_attr(e, "ContentType")?;
            ct.defaults
                .insert(ext.to_lowercase(), content_type.to_string());
        }

        Ok(ct)
    }

    /// Check whether an extension has a default mapping
    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.contains_key(&extension.to_lowercase())
    }
}

/// Append a `Default` mapping for `extension` unless one exists
pub fn ensure_default(doc: &mut XmlDocument, extension: &str, content_type: &str) -> bool {
    let extension = extension.to_lowercase();
    let exists = doc.root.elements().any(|e| {
        e.local_name() == "Default"
            && e.attr_local("Extension")
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&extension))
    });
    if exists {
        return false;
    }

    let name = match doc.root.prefix() {
        Some(prefix) => format!("{}:Default", prefix),
        None => "Default".to_string(),
    };
    let elem = XmlElement::new(name, ElementKind::Other)
        .with_attr("Extension", extension)
        .with_attr("ContentType", content_type);

    // Defaults conventionally precede overrides
    let at = doc
        .root
        .children
        .iter()
        .position(|n| matches!(n, XmlNode::Element(e) if e.local_name() == "Override"))
        .unwrap_or(doc.root.children.len());
    doc.root.children.insert(at, XmlNode::Element(elem));
    true
}

/// Content type for an embedded media file extension
pub fn media_content_type(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn required_attr<'a>(element: &'a XmlElement, name: &str) -> Result<&'a str> {
    element
        .attr_local(name)
        .ok_or_else(|| Error::MissingAttribute {
            element: element.name.clone(),
            attr: name.to_string(),
        })
}
