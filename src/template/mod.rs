//! Template substitution
//!
//! Three independent passes over a loaded [`Package`](crate::opc::Package):
//! scalar placeholders (`@key@`), table anchors (`@@key@@`) and named pictures.

pub mod image;
pub mod placeholder;
pub mod session;
pub mod spec;
pub mod table;
pub mod text;

pub use image::{relink_image, relink_image_bytes, relink_images, ImageOutcome, Relinked};
pub use placeholder::{find_table_key, tokenize, Segment};
pub use session::{ReplacementSession, Report};
pub use spec::{Border, CellValue, ReplacementSpec, ScalarValue, TableSettings, TableSpec};
pub use table::{expand_table, expand_tables, TableOutcome};
pub use text::{replace_text, substitute, Substitution, TextReport, Warning};
