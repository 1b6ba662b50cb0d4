//! Table expansion engine
//!
//! A table row whose first cell reads `@@key@@` is a placeholder row. It is
//! replaced by one generated row per entry of the matching [`TableSpec`].

use crate::error::{Error, Result};
use crate::opc::Package;
use crate::template::placeholder::find_table_key;
use crate::template::spec::{Border, CellValue, TableSettings, TableSpec};
use crate::xml::{ElementKind, XmlElement, XmlNode};
use log::{info, warn};
use std::collections::HashMap;

/// Descent from a row to the text holding its anchor
const ANCHOR_PATH: [ElementKind; 4] = [
    ElementKind::Cell,
    ElementKind::Paragraph,
    ElementKind::Run,
    ElementKind::Text,
];

/// What happened to one table
#[derive(Debug)]
pub enum TableOutcome {
    /// The anchor row for `key` was replaced by `rows` generated rows
    Expanded { key: String, rows: usize },
    /// No row carries an anchor
    NoAnchor,
    /// The table was left untouched
    Failed(Error),
}

impl TableOutcome {
    /// Check whether the table was changed
    pub fn is_expanded(&self) -> bool {
        matches!(self, TableOutcome::Expanded { .. })
    }
}

/// Expand every anchored table of the main document, in document order.
///
/// One outcome is returned per table. A failing table is reported and left
/// untouched; the remaining tables are still processed.
pub fn expand_tables(
    package: &mut Package,
    tables: &HashMap<String, TableSpec>,
) -> Result<Vec<TableOutcome>> {
    let part = package.document_mut()?;
    let mut doc = part.document().clone();
    let mut outcomes = Vec::new();

    doc.root.visit_kind_mut(ElementKind::Table, &mut |table: &mut XmlElement| {
        let outcome = match expand_table(table, tables) {
            Ok(Some((key, rows))) => {
                info!("Inserted {} rows into table {}", rows, key);
                TableOutcome::Expanded { key, rows }
            }
            Ok(None) => TableOutcome::NoAnchor,
            Err(e) => {
                warn!("Error reading or constructing table, no rows added: {}", e);
                TableOutcome::Failed(e)
            }
        };
        outcomes.push(outcome);
    });

    if outcomes.iter().any(TableOutcome::is_expanded) {
        *part.document_mut() = doc;
    }
    Ok(outcomes)
}

/// Expand a single table.
///
/// Returns the anchor key and number of generated rows, or `None` when no row
/// is anchored. On error the table is unchanged.
pub fn expand_table(
    table: &mut XmlElement,
    tables: &HashMap<String, TableSpec>,
) -> Result<Option<(String, usize)>> {
    let widths = grid_widths(table)?;

    // Only the first anchored row of a table is expanded
    let Some((index, key)) = find_anchor(table) else {
        return Ok(None);
    };

    let spec = tables
        .get(&key)
        .ok_or_else(|| Error::UnknownTableKey(key.clone()))?;

    if let Some(bad) = spec.rows.iter().find(|row| row.len() != widths.len()) {
        return Err(Error::ColumnCountMismatch {
            key,
            expected: widths.len(),
            found: bad.len(),
        });
    }

    // Sizes are stored in half-points
    let half_points = spec
        .settings
        .font_size
        .map(|size| size.checked_mul(2).ok_or(Error::FontSizeOutOfRange(size)))
        .transpose()?;

    let builder = RowBuilder {
        prefix: table.prefix().map(str::to_string),
        settings: &spec.settings,
        half_points,
        widths: &widths,
    };
    let mut rows = spec.rows.iter().map(|cells| builder.row(cells));

    match rows.next() {
        Some(first) => {
            table.children[index] = XmlNode::Element(first);
            table.children.extend(rows.map(XmlNode::Element));
        }
        None => {
            table.children.remove(index);
        }
    }

    Ok(Some((key, spec.rows.len())))
}

/// Column widths from the table grid; `None` where a column has no width
fn grid_widths(table: &XmlElement) -> Result<Vec<Option<String>>> {
    let grid = table.child(ElementKind::TableGrid).ok_or(Error::MissingGrid)?;
    Ok(grid
        .elements()
        .filter(|e| e.kind == ElementKind::GridColumn)
        .map(|col| col.attr_local("w").map(str::to_string))
        .collect())
}

/// Child index and key of the first row carrying a table anchor
fn find_anchor(table: &XmlElement) -> Option<(usize, String)> {
    table
        .children
        .iter()
        .enumerate()
        .find_map(|(i, node)| match node {
            XmlNode::Element(row) if row.kind == ElementKind::Row => {
                let text = row.descend(&ANCHOR_PATH)?.text();
                find_table_key(&text).map(|key| (i, key.to_string()))
            }
            _ => None,
        })
}

/// Builds data rows in the table's namespace prefix
struct RowBuilder<'a> {
    prefix: Option<String>,
    settings: &'a TableSettings,
    half_points: Option<u32>,
    widths: &'a [Option<String>],
}

impl RowBuilder<'_> {
    fn name(&self, local: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        }
    }

    fn elem(&self, local: &str, kind: ElementKind) -> XmlElement {
        XmlElement::new(self.name(local), kind)
    }

    fn row(&self, cells: &[CellValue]) -> XmlElement {
        cells
            .iter()
            .zip(self.widths)
            .fold(self.elem("tr", ElementKind::Row), |row, (cell, width)| {
                row.with_child(self.cell(cell, width.as_deref()))
            })
    }

    fn cell(&self, value: &CellValue, width: Option<&str>) -> XmlElement {
        let tc_w = self.elem("tcW", ElementKind::Other);
        let tc_w = match width {
            Some(w) => tc_w
                .with_attr(self.name("w"), w)
                .with_attr(self.name("type"), "dxa"),
            None => tc_w
                .with_attr(self.name("w"), "0")
                .with_attr(self.name("type"), "auto"),
        };
        let mut tc_pr = self
            .elem("tcPr", ElementKind::CellProperties)
            .with_child(tc_w);

        if !self.settings.borders.is_empty() {
            let borders = self.settings.borders.iter().fold(
                self.elem("tcBorders", ElementKind::Other),
                |acc, border| {
                    let edge = match border {
                        Border::Top => "top",
                        Border::Bottom => "bottom",
                    };
                    acc.with_child(
                        self.elem(edge, ElementKind::Other)
                            .with_attr(self.name("val"), "single")
                            .with_attr(self.name("sz"), "4")
                            .with_attr(self.name("space"), "0")
                            .with_attr(self.name("color"), "auto"),
                    )
                },
            );
            tc_pr = tc_pr.with_child(borders);
        }

        value.lines().iter().fold(
            self.elem("tc", ElementKind::Cell).with_child(tc_pr),
            |tc, line| tc.with_child(self.paragraph(line)),
        )
    }

    fn paragraph(&self, text: &str) -> XmlElement {
        let jc = self
            .elem("jc", ElementKind::Other)
            .with_attr(self.name("val"), "left");
        let mut p_pr = self.elem("pPr", ElementKind::Other).with_child(jc);
        let mut run = self.elem("r", ElementKind::Run);
        if let Some(r_pr) = self.run_properties() {
            p_pr = p_pr.with_child(r_pr.clone());
            run = run.with_child(r_pr);
        }

        let t = self
            .elem("t", ElementKind::Text)
            .with_attr("xml:space", "preserve")
            .with_text(text);
        self.elem("p", ElementKind::Paragraph)
            .with_child(p_pr)
            .with_child(run.with_child(t))
    }

    fn run_properties(&self) -> Option<XmlElement> {
        let face = self.settings.font_face.as_deref();
        if face.is_none() && self.half_points.is_none() {
            return None;
        }

        let mut r_pr = self.elem("rPr", ElementKind::Other);
        if let Some(face) = face {
            r_pr = r_pr.with_child(
                self.elem("rFonts", ElementKind::Other)
                    .with_attr(self.name("ascii"), face)
                    .with_attr(self.name("hAnsi"), face),
            );
        }
        if let Some(half_points) = self.half_points {
            let val = half_points.to_string();
            r_pr = r_pr
                .with_child(
                    self.elem("sz", ElementKind::Other)
                        .with_attr(self.name("val"), val.as_str()),
                )
                .with_child(
                    self.elem("szCs", ElementKind::Other)
                        .with_attr(self.name("val"), val),
                );
        }
        Some(r_pr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_docx, minimal_parts, paragraph, table_xml};
    use crate::xml::XmlDocument;
    use pretty_assertions::assert_eq;

    fn spec(settings: TableSettings, rows: &[&[&str]]) -> TableSpec {
        TableSpec {
            settings,
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| CellValue::from(*v)).collect())
                .collect(),
        }
    }

    fn parse_table(xml: &str) -> XmlElement {
        let mut doc = XmlDocument::parse(&format!(
            r#"<w:body xmlns:w="{}">{}</w:body>"#,
            crate::xml::W,
            xml
        ))
        .unwrap();
        match doc.root.children.remove(0) {
            XmlNode::Element(table) => table,
            other => panic!("expected a table, got {other:?}"),
        }
    }

    fn serialize(table: XmlElement) -> String {
        let doc = XmlDocument {
            prolog: Vec::new(),
            root: table,
        };
        String::from_utf8(doc.to_bytes().unwrap()).unwrap()
    }

    fn rows(table: &XmlElement) -> Vec<&XmlElement> {
        table.elements().filter(|e| e.kind == ElementKind::Row).collect()
    }

    fn cell_texts(row: &XmlElement) -> Vec<String> {
        row.elements()
            .filter_map(|c| c.descend(&ANCHOR_PATH[1..]).map(|t| t.text()))
            .collect()
    }

    #[test]
    fn test_expand_replaces_anchor_and_appends() {
        let mut table = parse_table(&table_xml(
            3,
            &[&["Name", "Qty", "Price"], &["@@items@@", "", ""]],
        ));
        let before = rows(&table).len();
        let tables: HashMap<_, _> = [(
            "items".to_string(),
            spec(
                TableSettings::default(),
                &[
                    &["apple", "1", "0.5"],
                    &["pear", "2", "0.7"],
                    &["fig", "3", "1.1"],
                ],
            ),
        )]
        .into();

        let result = expand_table(&mut table, &tables).unwrap();

        assert_eq!(result, Some(("items".to_string(), 3)));
        let after = rows(&table);
        assert_eq!(after.len(), before - 1 + 3);
        assert_eq!(cell_texts(after[0]), vec!["Name", "Qty", "Price"]);
        assert_eq!(cell_texts(after[1]), vec!["apple", "1", "0.5"]);
        assert_eq!(cell_texts(after[3]), vec!["fig", "3", "1.1"]);
    }

    #[test]
    fn test_column_mismatch_leaves_table_untouched() {
        let mut table = parse_table(&table_xml(3, &[&["@@items@@", "", ""]]));
        let original = format!("{:?}", table);
        let tables: HashMap<_, _> =
            [("items".to_string(), spec(TableSettings::default(), &[&["a", "b"]]))].into();

        let err = expand_table(&mut table, &tables).unwrap_err();

        assert!(matches!(
            err,
            Error::ColumnCountMismatch { expected: 3, found: 2, .. }
        ));
        assert_eq!(format!("{:?}", table), original);
    }

    #[test]
    fn test_unknown_key() {
        let mut table = parse_table(&table_xml(1, &[&["@@nope@@"]]));
        let err = expand_table(&mut table, &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownTableKey(k) if k == "nope"));
    }

    #[test]
    fn test_missing_grid() {
        let mut table = parse_table(
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>@@x@@</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        );
        assert!(matches!(
            expand_table(&mut table, &HashMap::new()),
            Err(Error::MissingGrid)
        ));
    }

    #[test]
    fn test_no_anchor_and_empty_cells() {
        // A row with an empty first cell has no anchor path and is skipped
        let mut table = parse_table(&table_xml(2, &[&["", "x"], &["plain", "text"]]));
        assert_eq!(expand_table(&mut table, &HashMap::new()).unwrap(), None);
    }

    #[test]
    fn test_only_first_anchor_expanded() {
        let mut table = parse_table(&table_xml(1, &[&["@@a@@"], &["@@b@@"]]));
        let tables: HashMap<_, _> = [
            ("a".to_string(), spec(TableSettings::default(), &[&["1"], &["2"]])),
            ("b".to_string(), spec(TableSettings::default(), &[&["3"]])),
        ]
        .into();

        expand_table(&mut table, &tables).unwrap();

        let texts: Vec<_> = rows(&table).into_iter().flat_map(cell_texts).collect();
        assert_eq!(texts, vec!["1", "@@b@@", "2"]);
    }

    #[test]
    fn test_empty_rows_remove_anchor() {
        let mut table = parse_table(&table_xml(1, &[&["head"], &["@@a@@"]]));
        let tables: HashMap<_, _> =
            [("a".to_string(), spec(TableSettings::default(), &[]))].into();

        assert_eq!(
            expand_table(&mut table, &tables).unwrap(),
            Some(("a".to_string(), 0))
        );
        assert_eq!(rows(&table).len(), 1);
    }

    #[test]
    fn test_generated_cell_formatting() {
        let mut table = parse_table(&table_xml(1, &[&["@@a@@"]]));
        let settings = TableSettings {
            font_size: Some(9),
            font_face: Some("Arial".into()),
            borders: [Border::Top, Border::Bottom].into(),
        };
        let tables: HashMap<_, _> = [("a".to_string(), spec(settings, &[&["x"]]))].into();
        expand_table(&mut table, &tables).unwrap();
        let xml = serialize(table);

        assert!(xml.contains(r#"<w:sz w:val="18"/><w:szCs w:val="18"/>"#));
        assert!(xml.contains(r#"<w:rFonts w:ascii="Arial" w:hAnsi="Arial"/>"#));
        assert!(xml.contains(
            r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#
        ));
        assert!(xml.contains(r#"<w:bottom w:val="single""#));
        assert!(xml.contains(r#"<w:tcW w:w="1000" w:type="dxa"/>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve">x</w:t>"#));
    }

    #[test]
    fn test_expand_tables_isolates_failures() {
        let body = format!(
            "{}{}{}{}",
            table_xml(2, &[&["@@bad@@", ""]]),
            paragraph("between"),
            table_xml(2, &[&["@@good@@", ""]]),
            table_xml(2, &[&["@@missing@@", ""]]),
        );
        let mut pkg = Package::from_bytes(&build_docx(&minimal_parts(&body))).unwrap();
        let tables: HashMap<_, _> = [
            ("bad".to_string(), spec(TableSettings::default(), &[&["only one"]])),
            (
                "good".to_string(),
                spec(TableSettings::default(), &[&["a", "b"], &["c", "d"]]),
            ),
        ]
        .into();

        let outcomes = expand_tables(&mut pkg, &tables).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(
            outcomes[0],
            TableOutcome::Failed(Error::ColumnCountMismatch { .. })
        ));
        assert!(matches!(
            &outcomes[1],
            TableOutcome::Expanded { key, rows: 2 } if key == "good"
        ));
        assert!(matches!(
            outcomes[2],
            TableOutcome::Failed(Error::UnknownTableKey(_))
        ));

        let doc = pkg.document().unwrap().document();
        let texts: Vec<_> = doc
            .root
            .descendants()
            .filter(|e| e.kind == ElementKind::Text)
            .map(|t| t.text())
            .collect();
        assert!(texts.contains(&"@@bad@@".to_string()));
        assert!(texts.contains(&"d".to_string()));
        assert!(!texts.contains(&"@@good@@".to_string()));
    }

    #[test]
    fn test_oversized_font_leaves_table_untouched() {
        let mut table = parse_table(&table_xml(1, &[&["@@a@@"]]));
        let original = format!("{:?}", table);
        let settings = TableSettings {
            font_size: Some(3_000_000_000),
            ..Default::default()
        };
        let tables: HashMap<_, _> = [("a".to_string(), spec(settings, &[&["x"]]))].into();

        let err = expand_table(&mut table, &tables).unwrap_err();

        assert!(matches!(err, Error::FontSizeOutOfRange(3_000_000_000)));
        assert_eq!(format!("{:?}", table), original);
    }

    #[test]
    fn test_list_cell_gets_one_paragraph_per_item() {
        let mut table = parse_table(&table_xml(2, &[&["@@a@@", ""]]));
        let row = vec![
            CellValue::from("name"),
            CellValue::Lines(vec!["line 1".into(), "line 2".into(), 3.into()]),
        ];
        let tables: HashMap<_, _> = [(
            "a".to_string(),
            TableSpec {
                settings: TableSettings::default(),
                rows: vec![row],
            },
        )]
        .into();

        expand_table(&mut table, &tables).unwrap();

        let cells: Vec<_> = rows(&table)[0].elements().collect();
        let paragraphs: Vec<_> = cells[1]
            .elements()
            .filter(|e| e.kind == ElementKind::Paragraph)
            .map(|p| p.descend(&ANCHOR_PATH[2..]).unwrap().text())
            .collect();
        assert_eq!(paragraphs, vec!["line 1", "line 2", "3"]);
        assert_eq!(
            cells[0]
                .elements()
                .filter(|e| e.kind == ElementKind::Paragraph)
                .count(),
            1
        );
    }
}
