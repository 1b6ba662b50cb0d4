//! Scalar substitution engine

use crate::error::Result;
use crate::opc::{Package, PartName};
use crate::template::placeholder::{tokenize, Segment};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;

/// Result of substituting one text run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    /// Text with placeholders resolved
    pub text: String,
    /// Number of placeholders replaced
    pub replaced: usize,
    /// Keys that had no mapping, in order of occurrence
    pub missing: Vec<String>,
}

/// Non-fatal finding of a substitution pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// A placeholder was left in place because its key has no mapping
    MissingKey { part: PartName, key: String },
}

/// Outcome of a scalar pass over a package
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextReport {
    /// Total placeholders replaced
    pub replaced: usize,
    /// Missing keys, one per unresolved occurrence
    pub warnings: Vec<Warning>,
}

/// Resolve the placeholders of `text` against `mapping`.
///
/// With `allowed` set, placeholders whose key is not in it are left untouched
/// and are not reported as missing.
pub fn substitute<V: Display>(
    text: &str,
    mapping: &HashMap<String, V>,
    allowed: Option<&HashSet<String>>,
) -> Substitution {
    let mut out = Substitution {
        text: String::with_capacity(text.len()),
        ..Default::default()
    };

    for segment in tokenize(text) {
        let Segment::Placeholder(key) = segment else {
            segment.push_original(&mut out.text);
            continue;
        };

        if allowed.is_some_and(|keys| !keys.contains(key)) {
            segment.push_original(&mut out.text);
            continue;
        }

        match mapping.get(key) {
            Some(value) => {
                out.text.push_str(&value.to_string());
                out.replaced += 1;
            }
            None => {
                segment.push_original(&mut out.text);
                out.missing.push(key.to_string());
            }
        }
    }

    out
}

/// Run the scalar pass over the document, header and footer parts.
///
/// Each text node is substituted on its own; a placeholder split across two
/// nodes is not recognized. Parts without a single replacement are left untouched.
pub fn replace_text<V: Display>(
    package: &mut Package,
    mapping: &HashMap<String, V>,
    allowed: Option<&HashSet<String>>,
) -> Result<TextReport> {
    let mut report = TextReport::default();

    for name in package.story_parts()? {
        let part = package.xml_part_mut(name.as_str())?;
        let mut doc = part.document().clone();
        let mut replaced = 0;

        doc.root.visit_text_mut(&mut |text: &mut String| {
            let sub = substitute(text.as_str(), mapping, allowed);
            for key in sub.missing {
                warn!("Key '@{}@' not found in replacements ({})", key, name);
                report.warnings.push(Warning::MissingKey {
                    part: name.clone(),
                    key,
                });
            }
            if sub.replaced > 0 {
                debug!("Replaced {} placeholder(s) in {:?}", sub.replaced, text);
                replaced += sub.replaced;
                *text = sub.text;
            }
        });

        if replaced > 0 {
            *part.document_mut() = doc;
            report.replaced += replaced;
        }
    }

    info!("Made {} replacements", report.replaced);
    Ok(report)
}
