//! Image relinker
//!
//! Swaps the picture behind named drawings by storing new media and pointing
//! the drawings' image relationships at it. The drawing markup is not touched.

use crate::error::{Error, Result};
use crate::opc::Package;
use crate::xml::{ElementKind, XmlElement};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

const NAME_PATH: [ElementKind; 4] = [
    ElementKind::GraphicData,
    ElementKind::Picture,
    ElementKind::PictureNonVisual,
    ElementKind::DrawingProperties,
];

const BLIP_PATH: [ElementKind; 4] = [
    ElementKind::GraphicData,
    ElementKind::Picture,
    ElementKind::BlipFill,
    ElementKind::Blip,
];

/// Relationships that now point at new media
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relinked {
    /// Relationship IDs referenced by the pictures of that name, in document order
    pub ids: Vec<String>,
    /// New target, relative to the document part
    pub target: String,
}

/// What happened to one entry of an image batch
#[derive(Debug)]
pub enum ImageOutcome {
    Relinked(Relinked),
    Failed(Error),
}

/// Replace the image of every picture named `picture_name` with the file at `path`.
///
/// The file is stored as `word/media/<basename>`. Nothing is changed unless the
/// pictures and their relationships exist and the file can be read.
pub fn relink_image(
    package: &mut Package,
    picture_name: &str,
    path: &Path,
) -> Result<Relinked> {
    let ids = embed_ids(package, picture_name)?;

    let read_error = |source| Error::ImageRead {
        path: path.to_path_buf(),
        source,
    };
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            read_error(io::Error::new(io::ErrorKind::InvalidInput, "no file name"))
        })?;
    let data = std::fs::read(path).map_err(read_error)?;

    store(package, ids, file_name, data)
}

/// Replace the image of every picture named `picture_name` with in-memory bytes
pub fn relink_image_bytes(
    package: &mut Package,
    picture_name: &str,
    file_name: &str,
    data: Vec<u8>,
) -> Result<Relinked> {
    let ids = embed_ids(package, picture_name)?;
    store(package, ids, file_name, data)
}

/// Relink every entry of `images`; a failing entry is logged and skipped
pub fn relink_images(
    package: &mut Package,
    images: &BTreeMap<String, PathBuf>,
) -> Vec<(String, ImageOutcome)> {
    let outcomes: Vec<_> = images
        .iter()
        .map(|(name, path)| {
            let outcome = match relink_image(package, name, path) {
                Ok(relinked) => ImageOutcome::Relinked(relinked),
                Err(e) => {
                    warn!("Could not relink picture '{}': {}", name, e);
                    ImageOutcome::Failed(e)
                }
            };
            (name.clone(), outcome)
        })
        .collect();

    let relinked = outcomes
        .iter()
        .filter(|(_, o)| matches!(o, ImageOutcome::Relinked(_)))
        .count();
    info!("Relinked {} of {} images", relinked, outcomes.len());
    outcomes
}

/// Graphics in the main document whose picture is named `picture_name`
fn find_graphics<'a>(
    root: &'a XmlElement,
    picture_name: &'a str,
) -> impl Iterator<Item = &'a XmlElement> {
    root.descendants()
        .filter(|e| e.kind == ElementKind::Graphic)
        .filter(move |g| {
            g.descend(&NAME_PATH)
                .and_then(|props| props.attr("name"))
                .is_some_and(|name| name == picture_name)
        })
}

/// Relationship IDs embedded by the named pictures, checked against the relationships.
///
/// A picture without an embed ID is skipped; it is an error only if no picture
/// of that name has one.
fn embed_ids(package: &Package, picture_name: &str) -> Result<Vec<String>> {
    let document = package.document()?.document();
    let mut found = false;
    let mut ids: Vec<String> = Vec::new();

    for graphic in find_graphics(&document.root, picture_name) {
        found = true;
        match graphic.descend(&BLIP_PATH).and_then(|b| b.attr_local("embed")) {
            Some(id) if !ids.iter().any(|known| known == id) => ids.push(id.to_string()),
            Some(_) => {}
            None => warn!("Picture '{}' has no relationship ID", picture_name),
        }
    }

    if !found {
        return Err(Error::ImageNotFound(picture_name.to_string()));
    }
    if ids.is_empty() {
        return Err(Error::MissingAttribute {
            element: "a:blip".into(),
            attr: "r:embed".into(),
        });
    }

    let rels = package.relationships()?;
    if let Some(missing) = ids.iter().find(|id| rels.get(id).is_none()) {
        return Err(Error::RelationshipNotFound(missing.clone()));
    }
    Ok(ids)
}

fn store(
    package: &mut Package,
    ids: Vec<String>,
    file_name: &str,
    data: Vec<u8>,
) -> Result<Relinked> {
    let target = package.put_media(file_name, data)?;
    for id in &ids {
        package.set_relationship_target(id, &target)?;
        debug!("Relationship {} now targets {}", id, target);
    }
    Ok(Relinked { ids, target })
}
