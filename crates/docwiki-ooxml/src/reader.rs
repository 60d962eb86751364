//! DOCX to source model
//!
//! Reads every part a conversion needs (styles, numbering, notes, body and
//! their relationships) and produces the [`SourceDocument`] together with
//! the [`StyleSheet`] its runs resolve against.

use std::path::Path;

use docwiki_core::SourceDocument;
use tracing::debug;

use crate::archive::OoxmlArchive;
use crate::document::{parse_body, parse_notes, NoteBodies, StoryContext};
use crate::error::Result;
use crate::numbering::Numbering;
use crate::relationships::Relationships;
use crate::styles::StyleSheet;

const FOOTNOTES_PART: &str = "word/footnotes.xml";
const ENDNOTES_PART: &str = "word/endnotes.xml";

/// A DOCX document read into the source model
#[derive(Debug, Clone)]
pub struct DocxSource {
    pub document: SourceDocument,
    pub styles: StyleSheet,
}

/// Reads a [`DocxSource`] out of an unpacked archive
pub struct DocxReader<'a> {
    archive: &'a OoxmlArchive,
}

impl<'a> DocxReader<'a> {
    pub fn new(archive: &'a OoxmlArchive) -> Self {
        Self { archive }
    }

    /// Read styles, numbering, notes and the body
    pub fn read(&self) -> Result<DocxSource> {
        let archive = self.archive;
        let styles = archive
            .styles_xml()
            .map(StyleSheet::parse)
            .transpose()?
            .unwrap_or_default();
        let numbering = archive
            .numbering_xml()
            .map(Numbering::parse)
            .transpose()?
            .unwrap_or_default();
        debug!(styles = styles.len(), "parsed style sheet");

        let no_notes = NoteBodies::new();
        let notes = |xml: Option<&[u8]>, part: &str| -> Result<NoteBodies> {
            let Some(xml) = xml else {
                return Ok(NoteBodies::new());
            };
            let relationships = Relationships::parse_optional(archive.rels_xml_for(part))?;
            let ctx = StoryContext {
                styles: &styles,
                numbering: &numbering,
                relationships: &relationships,
                footnotes: &no_notes,
                endnotes: &no_notes,
            };
            parse_notes(xml, ctx)
        };
        let footnotes = notes(archive.footnotes_xml(), FOOTNOTES_PART)?;
        let endnotes = notes(archive.endnotes_xml(), ENDNOTES_PART)?;
        debug!(
            footnotes = footnotes.len(),
            endnotes = endnotes.len(),
            "parsed notes"
        );

        let relationships = Relationships::parse_optional(archive.document_rels_xml())?;
        let ctx = StoryContext {
            styles: &styles,
            numbering: &numbering,
            relationships: &relationships,
            footnotes: &footnotes,
            endnotes: &endnotes,
        };
        let paragraphs = parse_body(archive.document_xml()?, ctx)?;
        debug!(paragraphs = paragraphs.len(), "parsed document body");

        Ok(DocxSource {
            document: SourceDocument::new(paragraphs),
            styles,
        })
    }
}

/// Open a DOCX file and read it
pub fn read_docx<P: AsRef<Path>>(path: P) -> Result<DocxSource> {
    let archive = OoxmlArchive::open(path)?;
    DocxReader::new(&archive).read()
}
