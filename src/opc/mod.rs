//! Open Packaging Convention (OPC) implementation
//!
//! This module handles the ZIP-based package format used by DOCX files.

pub mod content_types;
mod package;
mod part;
mod part_name;
pub mod relationships;

pub use content_types::ContentTypes;
pub use package::Package;
pub use part::{Part, PartClass, XmlPart};
pub use part_name::{well_known, PartName};
pub use relationships::{rel_types, Relationship, Relationships, TargetMode};
