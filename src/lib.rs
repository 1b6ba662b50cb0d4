//! # docx-fill
//!
//! Fill DOCX templates: scalar placeholders, table rows and pictures.
//!
//! ## Features
//!
//! - `@key@` placeholders in the body, headers and footers
//! - `@@key@@` table anchors expanded into data rows
//! - Pictures swapped by name, keeping their size and position
//! - Parts that are not edited are written back byte for byte
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docx_fill::{Package, ReplacementSession, ReplacementSpec};
//!
//! let mut package = Package::open("template.docx")?;
//! let spec = ReplacementSpec::from_json(&std::fs::read_to_string("values.json")?)?;
//!
//! let report = ReplacementSession::new(&mut package, &spec).run()?;
//! println!("{} placeholders replaced", report.text.replaced);
//!
//! package.save("filled.docx")?;
//! ```

pub mod error;
pub mod opc;
pub mod template;
pub mod xml;

pub use error::{Error, Result};
pub use opc::{Package, Part, PartName};
pub use template::{ReplacementSession, ReplacementSpec, Report};
