//! Parsed element tree for XML parts

use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::{NsReader, Writer};
use std::io::BufRead;

use super::kind::ElementKind;
use super::namespace::split_qname;
use crate::error::{Error, Result};

/// Declaration written in front of every re-serialized XML part
pub const XML_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

/// A whole XML part: the nodes before the root, and the root element
#[derive(Clone, Debug)]
pub struct XmlDocument {
    /// Comments and processing instructions preceding the root
    pub prolog: Vec<XmlNode>,
    /// Root element
    pub root: XmlElement,
}

/// XML node
#[derive(Clone, Debug)]
pub enum XmlNode {
    /// Element node
    Element(XmlElement),
    /// Text node (unescaped)
    Text(String),
    /// CDATA section
    CData(String),
    /// Comment node
    Comment(String),
    /// Processing instruction
    ProcessingInstruction(String),
}

/// XML element with attributes and children
#[derive(Clone, Debug)]
pub struct XmlElement {
    /// Full element name (with prefix, e.g., "w:tbl")
    pub name: String,
    /// Kind resolved from namespace and local name
    pub kind: ElementKind,
    /// Attributes as (qualified name, unescaped value) pairs
    pub attributes: Vec<(String, String)>,
    /// Child nodes
    pub children: Vec<XmlNode>,
    /// Whether this was a self-closing element
    pub self_closing: bool,
}

impl XmlDocument {
    /// Parse a complete document
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);
        let mut prolog = Vec::new();
        let mut root = None;
        let mut buf = Vec::new();

        loop {
            let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
            let ns = namespace_uri(ns)?;
            match event {
                Event::Start(e) => {
                    if root.is_some() {
                        return Err(Error::InvalidDocument("multiple root elements".into()));
                    }
                    root = Some(XmlElement::from_reader(&mut reader, &e, ns.as_deref())?);
                }
                Event::Empty(e) => {
                    if root.is_some() {
                        return Err(Error::InvalidDocument("multiple root elements".into()));
                    }
                    root = Some(XmlElement::from_empty(&e, ns.as_deref())?);
                }
                Event::Comment(c) if root.is_none() => {
                    prolog.push(XmlNode::Comment(String::from_utf8_lossy(&c).to_string()));
                }
                Event::PI(pi) if root.is_none() => {
                    prolog.push(XmlNode::ProcessingInstruction(
                        String::from_utf8_lossy(&pi).to_string(),
                    ));
                }
                Event::Eof => break,
                // Declaration is re-emitted as a fixed prefix on save
                _ => {}
            }
            buf.clear();
        }

        let root = root.ok_or_else(|| Error::InvalidDocument("no root element".into()))?;
        Ok(Self { prolog, root })
    }

    /// Serialize, prefixed with [`XML_DECLARATION`]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            node.write_to(&mut writer)?;
        }
        self.root.write_to(&mut writer)?;

        let mut out = XML_DECLARATION.as_bytes().to_vec();
        out.extend_from_slice(&writer.into_inner());
        Ok(out)
    }
}

impl XmlElement {
    /// Create a new empty element
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Read a complete element from XML reader (starting after the start tag was read).
    ///
    /// `namespace` is the URI the reader resolved for the start tag.
    pub fn from_reader<R: BufRead>(
        reader: &mut NsReader<R>,
        start: &BytesStart,
        namespace: Option<&str>,
    ) -> Result<Self> {
        let mut elem = Self::from_empty(start, namespace)?;
        elem.self_closing = false;

        let mut buf = Vec::new();
        loop {
            let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
            let ns = namespace_uri(ns)?;
            match event {
                Event::Start(e) => {
                    let child = Self::from_reader(reader, &e, ns.as_deref())?;
                    elem.children.push(XmlNode::Element(child));
                }
                Event::Empty(e) => {
                    let child = Self::from_empty(&e, ns.as_deref())?;
                    elem.children.push(XmlNode::Element(child));
                }
                Event::Text(t) => {
                    let text = t.unescape()?.to_string();
                    if !text.is_empty() {
                        elem.children.push(XmlNode::Text(text));
                    }
                }
                Event::CData(c) => {
                    elem.children
                        .push(XmlNode::CData(String::from_utf8_lossy(&c).to_string()));
                }
                Event::Comment(c) => {
                    elem.children
                        .push(XmlNode::Comment(String::from_utf8_lossy(&c).to_string()));
                }
                Event::PI(pi) => {
                    elem.children.push(XmlNode::ProcessingInstruction(
                        String::from_utf8_lossy(&pi).to_string(),
                    ));
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(Error::InvalidDocument(format!(
                        "unexpected EOF inside <{}>",
                        elem.name
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(elem)
    }

    /// Create from empty element tag, or from the start tag of an element
    pub fn from_empty(start: &BytesStart, namespace: Option<&str>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).to_string();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                attr.unescape_value()?.to_string(),
            ));
        }

        let kind = ElementKind::resolve(namespace, split_qname(&name).1);

        Ok(Self {
            name,
            kind,
            attributes,
            children: Vec::new(),
            self_closing: true,
        })
    }

    /// Write element to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(start))?;
        } else {
            writer.write_event(Event::Start(start))?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        }

        Ok(())
    }

    /// Prefix of the element name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Local part of the element name
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Attribute value by qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by local name, ignoring the prefix
    pub fn attr_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| split_qname(k).1 == local)
            .map(|(_, v)| v.as_str())
    }

    /// Replace an attribute by local name, or append it under `name`
    pub fn set_attr_local(&mut self, name: &str, value: impl Into<String>) {
        let local = split_qname(name).1;
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(k, _)| split_qname(k).1 == local)
        {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child elements
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements, mutably
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element of the given kind
    pub fn child(&self, kind: ElementKind) -> Option<&XmlElement> {
        self.elements().find(|e| e.kind == kind)
    }

    /// Follow the first child of each kind in `path`
    pub fn descend(&self, path: &[ElementKind]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |elem, kind| elem.child(*kind))
    }

    /// This element and every element below it, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Concatenated text of the direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) | XmlNode::CData(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Visit every text node below this element, in document order
    pub fn visit_text_mut<F: FnMut(&mut String)>(&mut self, f: &mut F) {
        for child in &mut self.children {
            match child {
                XmlNode::Text(t) => f(t),
                XmlNode::Element(e) => e.visit_text_mut(f),
                _ => {}
            }
        }
    }

    /// Visit every element of `kind` at or below this one, in document order.
    ///
    /// The visitor runs before the element's children are walked.
    pub fn visit_kind_mut<F: FnMut(&mut XmlElement)>(&mut self, kind: ElementKind, f: &mut F) {
        if self.kind == kind {
            f(self);
        }
        for child in self.elements_mut() {
            child.visit_kind_mut(kind, f);
        }
    }

    /// Add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Add a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }
}

impl XmlNode {
    /// Write node to XML writer
    pub fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            XmlNode::Element(e) => e.write_to(writer)?,
            XmlNode::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            XmlNode::CData(c) => writer.write_event(Event::CData(BytesCData::new(c.as_str())))?,
            XmlNode::Comment(c) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(c.as_str())))?
            }
            XmlNode::ProcessingInstruction(pi) => {
                writer.write_event(Event::PI(BytesPI::new(pi.as_str())))?
            }
        }
        Ok(())
    }
}

/// Namespace URI of a resolved name; unbound and unknown prefixes give `None`
fn namespace_uri(ns: ResolveResult<'_>) -> Result<Option<String>> {
    Ok(match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(std::str::from_utf8(uri)?.to_string()),
        _ => None,
    })
}

/// Pre-order iterator returned by [`XmlElement::descendants`]
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.stack.pop()?;
        self.stack.extend(elem.elements().rev());
        Some(elem)
    }
}
