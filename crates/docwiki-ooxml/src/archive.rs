//! Archive handling for DOCX files
//!
//! A DOCX file is a ZIP archive of XML parts. Only the parts the reader
//! needs are exposed by name; everything else is reachable through [`get`].
//!
//! [`get`]: OoxmlArchive::get

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::read::ZipArchive;

use crate::error::{OoxmlError, Result};

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Represents an unpacked DOCX package
#[derive(Debug)]
pub struct OoxmlArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        Ok(Self { files })
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get the main document content (word/document.xml)
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_PART)
            .ok_or_else(|| OoxmlError::MissingFile(DOCUMENT_PART.to_string()))
    }

    /// Get the styles definition (word/styles.xml)
    ///
    /// Optional: a document without it uses built-in defaults only.
    pub fn styles_xml(&self) -> Option<&[u8]> {
        self.get("word/styles.xml")
    }

    /// Get the numbering definitions (word/numbering.xml)
    pub fn numbering_xml(&self) -> Option<&[u8]> {
        self.get("word/numbering.xml")
    }

    /// Get the footnote bodies (word/footnotes.xml)
    pub fn footnotes_xml(&self) -> Option<&[u8]> {
        self.get("word/footnotes.xml")
    }

    /// Get the endnote bodies (word/endnotes.xml)
    pub fn endnotes_xml(&self) -> Option<&[u8]> {
        self.get("word/endnotes.xml")
    }

    /// Get the document relationships (word/_rels/document.xml.rels)
    pub fn document_rels_xml(&self) -> Option<&[u8]> {
        self.rels_xml_for(DOCUMENT_PART)
    }

    /// Get the relationships of any part, e.g. `word/footnotes.xml`
    pub fn rels_xml_for(&self, part: &str) -> Option<&[u8]> {
        let (dir, file) = match part.rfind('/') {
            Some(i) => (&part[..=i], &part[i + 1..]),
            None => ("", part),
        };
        self.get(&format!("{}_rels/{}.rels", dir, file))
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all files in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }
}
