//! Element kinds the substitution engines inspect

use super::namespace::{A, PIC, W};

/// Typed tag of an element, resolved once from its namespace and local name.
///
/// Everything the engines never look at is [`ElementKind::Other`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `w:tbl`
    Table,
    /// `w:tblGrid`
    TableGrid,
    /// `w:gridCol`
    GridColumn,
    /// `w:tr`
    Row,
    /// `w:tc`
    Cell,
    /// `w:tcPr`
    CellProperties,
    /// `w:p`
    Paragraph,
    /// `w:r`
    Run,
    /// `w:t`
    Text,
    /// `a:graphic`
    Graphic,
    /// `a:graphicData`
    GraphicData,
    /// `pic:pic`
    Picture,
    /// `pic:nvPicPr`
    PictureNonVisual,
    /// `pic:cNvPr`
    DrawingProperties,
    /// `pic:blipFill`
    BlipFill,
    /// `a:blip`
    Blip,
    #[default]
    Other,
}

impl ElementKind {
    /// Classify an element by namespace URI and local name
    pub fn resolve(namespace: Option<&str>, local: &str) -> Self {
        match (namespace, local) {
            (Some(W), "tbl") => Self::Table,
            (Some(W), "tblGrid") => Self::TableGrid,
            (Some(W), "gridCol") => Self::GridColumn,
            (Some(W), "tr") => Self::Row,
            (Some(W), "tc") => Self::Cell,
            (Some(W), "tcPr") => Self::CellProperties,
            (Some(W), "p") => Self::Paragraph,
            (Some(W), "r") => Self::Run,
            (Some(W), "t") => Self::Text,
            (Some(A), "graphic") => Self::Graphic,
            (Some(A), "graphicData") => Self::GraphicData,
            (Some(A), "blip") => Self::Blip,
            (Some(PIC), "pic") => Self::Picture,
            (Some(PIC), "nvPicPr") => Self::PictureNonVisual,
            (Some(PIC), "cNvPr") => Self::DrawingProperties,
            (Some(PIC), "blipFill") => Self::BlipFill,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_namespace() {
        assert_eq!(ElementKind::resolve(Some(W), "tbl"), ElementKind::Table);
        assert_eq!(ElementKind::resolve(Some(A), "graphic"), ElementKind::Graphic);
        // DrawingML text paragraphs share the local name but not the namespace
        assert_eq!(ElementKind::resolve(Some(A), "p"), ElementKind::Other);
        assert_eq!(ElementKind::resolve(None, "tbl"), ElementKind::Other);
    }
}
