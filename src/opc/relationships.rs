//! Relationships handling for DOCX packages
//!
//! Reads and edits `.rels` parts

use crate::error::{Error, Result};
use crate::xml::{ElementKind, XmlDocument, XmlElement};

/// Ordered snapshot of the relationships in a `.rels` part
#[derive(Clone, Debug, Default)]
pub struct Relationships {
    /// Relationships in document order
    items: Vec<Relationship>,
}

/// A single relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relationship {
    /// `rIdN`, unique within the part
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target, relative to the source part unless external
    pub target: String,
    /// Target mode
    pub target_mode: TargetMode,
}

/// Whether a target lives inside the package
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TargetMode {
    #[default]
    Internal,
    /// A URL or file outside the package
    External,
}

impl Relationships {
    /// Parse from XML string
    pub fn from_xml(xml: &str) -> Result<Self> {
        Self::from_document(&XmlDocument::parse(xml)?)
    }

    /// Read every `Relationship` child of a parsed `.rels` part
    pub fn from_document(doc: &XmlDocument) -> Result<Self> {
        let items = relationship_elements(doc)
            .map(parse_relationship)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items })
    }

    /// Look up by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// ID for the next appended relationship: `rId{len + 1}`, skipping any taken ID
    pub fn next_id(&self) -> String {
        let mut n = self.items.len() + 1;
        loop {
            let id = format!("rId{}", n);
            if self.get(&id).is_none() {
                return id;
            }
            n += 1;
        }
    }
}

/// Point the relationship `id` at `target`, leaving its other attributes alone
pub fn set_target(doc: &mut XmlDocument, id: &str, target: &str) -> Result<()> {
    let rel = doc
        .root
        .elements_mut()
        .find(|e| e.local_name() == "Relationship" && e.attr_local("Id") == Some(id))
        .ok_or_else(|| Error::RelationshipNotFound(id.to_string()))?;
    rel.set_attr_local("Target", target);
    Ok(())
}

/// Append a new internal relationship element
pub fn append(doc: &mut XmlDocument, rel: &Relationship) {
    let name = match doc.root.prefix() {
        Some(prefix) => format!("{}:Relationship", prefix),
        None => "Relationship".to_string(),
    };

    let mut elem = XmlElement::new(name, ElementKind::Other)
        .with_attr("Id", rel.id.as_str())
        .with_attr("Type", rel.rel_type.as_str())
        .with_attr("Target", rel.target.as_str());
    if rel.target_mode == TargetMode::External {
        elem = elem.with_attr("TargetMode", "External");
    }

    doc.root.children.push(crate::xml::XmlNode::Element(elem));
}

fn relationship_elements(doc: &XmlDocument) -> impl Iterator<Item = &XmlElement> {
    doc.root
        .elements()
        .filter(|e| e.local_name() == "Relationship")
}

fn parse_relationship(element: &XmlElement) -> Result<Relationship> {
    let required = |attr: &str| {
        element
            .attr_local(attr)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingAttribute {
                element: "Relationship".into(),
                attr: attr.into(),
            })
    };

    Ok(Relationship {
        id: required("Id")?,
        rel_type: required("Type")?,
        target: required("Target")?,
        target_mode: match element.attr_local("TargetMode") {
            Some("External") => TargetMode::External,
            _ => TargetMode::Internal,
        },
    })
}

/// Relationship type URIs used by the template engines
pub mod rel_types {
    pub const HEADER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    pub const FOOTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}
