//! One template run over a package

use crate::error::Result;
use crate::opc::Package;
use crate::template::image::{relink_images, ImageOutcome};
use crate::template::spec::ReplacementSpec;
use crate::template::table::{expand_tables, TableOutcome};
use crate::template::text::{replace_text, TextReport};
use log::info;

/// Applies a [`ReplacementSpec`] to a package.
///
/// Scalars are substituted first, then tables expanded, then images relinked.
/// Failures of a single table or image are recorded in the [`Report`].
pub struct ReplacementSession<'a> {
    package: &'a mut Package,
    spec: &'a ReplacementSpec,
}

impl<'a> ReplacementSession<'a> {
    pub fn new(package: &'a mut Package, spec: &'a ReplacementSpec) -> Self {
        Self { package, spec }
    }

    /// Scalar pass over document, headers and footers
    pub fn replace_text(&mut self) -> Result<TextReport> {
        replace_text(self.package, &self.spec.text, None)
    }

    /// Table pass over the main document
    pub fn expand_tables(&mut self) -> Result<Vec<TableOutcome>> {
        expand_tables(self.package, &self.spec.tables)
    }

    /// Image pass
    pub fn relink_images(&mut self) -> Vec<(String, ImageOutcome)> {
        relink_images(self.package, &self.spec.images)
    }

    /// Run all three passes
    pub fn run(mut self) -> Result<Report> {
        let text = self.replace_text()?;
        let tables = self.expand_tables()?;
        let images = self.relink_images();

        let report = Report {
            text,
            tables,
            images,
        };
        info!(
            "Template run finished: {} replacements, {} tables expanded, {} images relinked, {} problems",
            report.text.replaced,
            report.tables_expanded(),
            report.images_relinked(),
            report.problems()
        );
        Ok(report)
    }
}

/// Everything a session did
#[derive(Debug, Default)]
pub struct Report {
    pub text: TextReport,
    /// One entry per table of the main document, in document order
    pub tables: Vec<TableOutcome>,
    /// One entry per requested picture, ordered by picture name
    pub images: Vec<(String, ImageOutcome)>,
}

impl Report {
    pub fn tables_expanded(&self) -> usize {
        self.tables.iter().filter(|t| t.is_expanded()).count()
    }

    pub fn images_relinked(&self) -> usize {
        self.images
            .iter()
            .filter(|(_, o)| matches!(o, ImageOutcome::Relinked(_)))
            .count()
    }

    /// Missing keys plus failed tables and images
    pub fn problems(&self) -> usize {
        let tables = self
            .tables
            .iter()
            .filter(|t| matches!(t, TableOutcome::Failed(_)))
            .count();
        self.text.warnings.len() + tables + self.images.len() - self.images_relinked()
    }
}
