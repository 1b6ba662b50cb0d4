//! XML element tree with typed element kinds
//!
//! XML parts are parsed once into an [`XmlDocument`]. Elements the engines care
//! about carry an [`ElementKind`] resolved from their namespace, everything else
//! is kept as-is so it re-serializes unchanged.

mod kind;
mod namespace;
mod tree;

pub use kind::ElementKind;
pub use namespace::*;
pub use tree::{Descendants, XmlDocument, XmlElement, XmlNode, XML_DECLARATION};
