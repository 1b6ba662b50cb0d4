//! Package container
//!
//! Handles reading and writing DOCX files as ZIP archives

use crate::error::{Error, Result};
use crate::opc::content_types::{self, media_content_type, ContentTypes};
use crate::opc::part_name::well_known;
use crate::opc::relationships::{self, rel_types, Relationship, Relationships, TargetMode};
use crate::opc::{Part, PartName, XmlPart};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

/// A DOCX package: every archive entry, in archive order
#[derive(Clone, Debug)]
pub struct Package {
    parts: Vec<(PartName, Part)>,
}

impl Package {
    /// Open a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader)
    }

    /// Open a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(bytes);
        Self::from_reader(cursor)
    }

    /// Open a package from a reader.
    ///
    /// Fails with [`Error::CorruptArchive`] if the archive cannot be read and with
    /// [`Error::MalformedXml`] if an XML part does not parse.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if file.is_dir() {
                continue;
            }

            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|e| Error::CorruptArchive(e.into()))?;

            let part = Part::load(&name, data).map_err(|e| Error::MalformedXml {
                part: name.clone(),
                source: Box::new(e),
            })?;
            debug!("Loaded part {} ({})", name, kind_label(&part));

            parts.push((PartName::new(&name)?, part));
        }

        let package = Self { parts };
        if package.part(well_known::DOCUMENT).is_none() {
            return Err(Error::MissingPart(well_known::DOCUMENT.into()));
        }
        Ok(package)
    }

    /// Save the package to a file.
    ///
    /// The archive is built in memory first so a failure never leaves a partial file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    /// Save the package to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, part) in &self.parts {
            debug!("Saving part {}", name);
            zip.start_file(name.as_str(), options)?;
            zip.write_all(&part.to_bytes()?)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Get a part by name
    pub fn part(&self, name: &str) -> Option<&Part> {
        let name = name.trim_start_matches('/');
        self.parts
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, p)| p)
    }

    /// Get a mutable part by name
    pub fn part_mut(&mut self, name: &str) -> Option<&mut Part> {
        let name = name.trim_start_matches('/');
        self.parts
            .iter_mut()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, p)| p)
    }

    /// Insert a part, replacing any part with the same name in place.
    ///
    /// Returns the replaced part.
    pub fn insert_part(&mut self, name: PartName, part: Part) -> Option<Part> {
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, part)),
            None => {
                self.parts.push((name, part));
                None
            }
        }
    }

    /// Get all part names, in archive order
    pub fn part_names(&self) -> impl Iterator<Item = &PartName> {
        self.parts.iter().map(|(n, _)| n)
    }

    /// Get an XML part by name
    pub fn xml_part(&self, name: &str) -> Result<&XmlPart> {
        self.part(name)
            .and_then(Part::as_xml)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Get an XML part mutably by name
    pub fn xml_part_mut(&mut self, name: &str) -> Result<&mut XmlPart> {
        self.part_mut(name)
            .and_then(Part::as_xml_mut)
            .ok_or_else(|| Error::MissingPart(name.to_string()))
    }

    /// Get the main document part
    pub fn document(&self) -> Result<&XmlPart> {
        self.xml_part(well_known::DOCUMENT)
    }

    /// Get the main document part mutably
    pub fn document_mut(&mut self) -> Result<&mut XmlPart> {
        self.xml_part_mut(well_known::DOCUMENT)
    }

    /// Relationships of the main document part
    pub fn relationships(&self) -> Result<Relationships> {
        Relationships::from_document(self.xml_part(well_known::DOCUMENT_RELS)?.document())
    }

    /// Content types of the package
    pub fn content_types(&self) -> Result<ContentTypes> {
        ContentTypes::from_document(self.xml_part(well_known::CONTENT_TYPES)?.document())
    }

    /// Point a document relationship at a new target
    pub fn set_relationship_target(&mut self, id: &str, target: &str) -> Result<()> {
        let rels = self.xml_part_mut(well_known::DOCUMENT_RELS)?;
        if Relationships::from_document(rels.document())?.get(id).is_none() {
            return Err(Error::RelationshipNotFound(id.to_string()));
        }
        relationships::set_target(rels.document_mut(), id, target)
    }

    /// Append a document relationship, returning its new ID
    pub fn add_relationship(&mut self, rel_type: &str, target: &str) -> Result<String> {
        let rels = self.xml_part_mut(well_known::DOCUMENT_RELS)?;
        let id = Relationships::from_document(rels.document())?.next_id();
        relationships::append(
            rels.document_mut(),
            &Relationship {
                id: id.clone(),
                rel_type: rel_type.to_string(),
                target: target.to_string(),
                target_mode: TargetMode::Internal,
            },
        );
        debug!("Added relationship {} -> {}", id, target);
        Ok(id)
    }

    /// Store a media file as `word/media/<file_name>`.
    ///
    /// Registers a content type default for its extension when none exists and
    /// returns the target relative to the document part (`media/<file_name>`).
    pub fn put_media(&mut self, file_name: &str, data: Vec<u8>) -> Result<String> {
        let name = PartName::new(&format!("{}/{}", well_known::MEDIA_DIR, file_name))?;

        if let Some(ext) = name.extension() {
            let types = self.content_types()?;
            if !types.has_default(ext) {
                let ext = ext.to_string();
                let content_type = media_content_type(&ext);
                let ct = self.xml_part_mut(well_known::CONTENT_TYPES)?;
                content_types::ensure_default(ct.document_mut(), &ext, content_type);
                debug!("Registered content type {} for .{}", content_type, ext);
            }
        }

        self.insert_part(name, Part::Binary(data));
        Ok(format!("media/{}", file_name))
    }

    /// Embed a new image and bind it to a fresh image relationship
    pub fn add_image(&mut self, file_name: &str, data: Vec<u8>) -> Result<String> {
        let target = self.put_media(file_name, data)?;
        self.add_relationship(rel_types::IMAGE, &target)
    }

    /// Parts holding document text: the main document plus its headers and footers
    pub fn story_parts(&self) -> Result<Vec<PartName>> {
        let document = PartName::new(well_known::DOCUMENT)?;
        let mut names = vec![document.clone()];

        if self.part(well_known::DOCUMENT_RELS).is_none() {
            return Ok(names);
        }

        for rel in self.relationships()?.iter() {
            if rel.target_mode != TargetMode::Internal
                || (rel.rel_type != rel_types::HEADER && rel.rel_type != rel_types::FOOTER)
            {
                continue;
            }
            let name = document.resolve(&rel.target)?;
            if self.xml_part(name.as_str()).is_ok() && !names.contains(&name) {
                names.push(name);
            }
        }

        Ok(names)
    }
}

fn kind_label(part: &Part) -> &'static str {
    match part {
        Part::Xml(_) => "xml",
        Part::Binary(_) => "binary",
        Part::Opaque(_) => "opaque",
    }
}
