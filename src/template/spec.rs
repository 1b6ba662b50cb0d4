//! Replacement specification: what to put into the template

use serde::Deserialize;
use serde_json::Number;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Everything a template run substitutes.
///
/// Mirrors the JSON layout:
///
/// ```json
/// { "text":   { "name": "Ada" },
///   "tables": { "sales": [ {"font_size": 9, "borders": ["top"]}, [["Q1", 10], ["Q2", 12]] ] },
///   "images": { "Picture 1": "charts/q2.png" } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReplacementSpec {
    /// Scalar placeholders: key -> value
    pub text: HashMap<String, ScalarValue>,
    /// Table anchors: key -> settings and data rows
    pub tables: HashMap<String, TableSpec>,
    /// Pictures: picture name -> new image file
    pub images: BTreeMap<String, PathBuf>,
}

impl ReplacementSpec {
    /// Parse from a JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A scalar value as it may appear in JSON
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    /// Kept as parsed so integers of any size print exactly
    Number(Number),
    Text(String),
    /// Renders as empty text
    Null,
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Number(n) => match n.as_f64() {
                Some(x) if n.is_f64() => write_float(f, x),
                _ => write!(f, "{}", n),
            },
            ScalarValue::Text(s) => f.write_str(s),
            ScalarValue::Null => Ok(()),
        }
    }
}

/// Shortest round-trip digits, always with a fraction or an exponent:
/// `10.0`, `0.0001`, `1e+20`, `1.5e-07`
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let sci = format!("{:e}", x);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let plain = x.to_string();
        if plain.contains('.') {
            f.write_str(&plain)
        } else {
            write!(f, "{}.0", plain)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        ScalarValue::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        ScalarValue::Text(s)
    }
}

impl From<i64> for ScalarValue {
    fn from(n: i64) -> Self {
        ScalarValue::Number(n.into())
    }
}

/// Content of one generated table cell
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// A single paragraph
    Value(ScalarValue),
    /// One paragraph per item
    Lines(Vec<ScalarValue>),
}

impl CellValue {
    /// Paragraph texts of the cell; an empty list still yields one empty paragraph
    pub fn lines(&self) -> Vec<String> {
        match self {
            CellValue::Value(v) => vec![v.to_string()],
            CellValue::Lines(items) if items.is_empty() => vec![String::new()],
            CellValue::Lines(items) => items.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<ScalarValue> for CellValue {
    fn from(value: ScalarValue) -> Self {
        CellValue::Value(value)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Value(s.into())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Value(n.into())
    }
}

/// Data for one table anchor: JSON `[settings, rows]`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "(TableSettings, Vec<Vec<CellValue>>)")]
pub struct TableSpec {
    /// Formatting applied to every generated cell
    pub settings: TableSettings,
    /// Data rows, each with one cell per table column
    pub rows: Vec<Vec<CellValue>>,
}

impl From<(TableSettings, Vec<Vec<CellValue>>)> for TableSpec {
    fn from((settings, rows): (TableSettings, Vec<Vec<CellValue>>)) -> Self {
        Self { settings, rows }
    }
}

/// Formatting of generated table cells
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Font size in points
    pub font_size: Option<u32>,
    /// Font family name
    pub font_face: Option<String>,
    /// Cell borders to draw
    pub borders: BTreeSet<Border>,
}

/// A cell border edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    Top,
    Bottom,
}
