//! List numbering definitions (word/numbering.xml)
//!
//! Paragraphs reference a `w:num` by ID and a level; the num points at an
//! `w:abstractNum` whose levels carry the number format. Only the
//! bullet/numbered distinction matters for wikitext.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::xml::get_attr_with_ns;

/// A paragraph's reference to a list definition (`w:numPr`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingRef {
    /// `w:numId`; "0" removes numbering
    pub num_id: String,
    /// Zero-based `w:ilvl`
    pub level: u8,
}

impl NumberingRef {
    /// Whether the reference actually makes the paragraph a list item
    pub fn is_list(&self) -> bool {
        !self.num_id.is_empty() && self.num_id != "0"
    }
}

/// Parsed numbering definitions
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    /// abstractNumId -> level -> numFmt
    formats: HashMap<String, HashMap<u8, String>>,
    /// numId -> abstractNumId
    instances: HashMap<String, String>,
}

impl Numbering {
    /// Parse numbering definitions from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut numbering = Numbering::default();
        let mut buf = Vec::new();
        let mut abstract_id: Option<String> = None;
        let mut level: Option<u8> = None;
        let mut num_id: Option<String> = None;
        // lvlOverride levels belong to a w:num, not to the abstract definition
        let mut in_override = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.local_name().as_ref() {
                        b"abstractNum" => {
                            abstract_id = get_attr_with_ns(e, b"w:abstractNumId");
                        }
                        b"lvl" if abstract_id.is_some() && !in_override => {
                            level = get_attr_with_ns(e, b"w:ilvl").and_then(|v| v.parse().ok());
                        }
                        b"numFmt" if !in_override => {
                            if let (Some(id), Some(lvl), Some(fmt)) =
                                (&abstract_id, level, get_attr_with_ns(e, b"w:val"))
                            {
                                numbering
                                    .formats
                                    .entry(id.clone())
                                    .or_default()
                                    .insert(lvl, fmt);
                            }
                        }
                        b"num" => num_id = get_attr_with_ns(e, b"w:numId"),
                        b"abstractNumId" => {
                            if let (Some(id), Some(target)) =
                                (num_id.clone(), get_attr_with_ns(e, b"w:val"))
                            {
                                numbering.instances.insert(id, target);
                            }
                        }
                        b"lvlOverride" => in_override = true,
                        _ => {}
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"abstractNum" => {
                        abstract_id = None;
                        level = None;
                    }
                    b"lvl" => level = None,
                    b"num" => num_id = None,
                    b"lvlOverride" => in_override = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(numbering)
    }

    /// Number format (`decimal`, `bullet`, ...) of a list level
    pub fn format(&self, num_id: &str, level: u8) -> Option<&str> {
        let abstract_id = self.instances.get(num_id)?;
        self.formats
            .get(abstract_id)?
            .get(&level)
            .map(|s| s.as_str())
    }

    /// Whether a list level shows a number rather than a bullet.
    /// Unknown lists are treated as bulleted.
    pub fn is_numbered(&self, num_id: &str, level: u8) -> bool {
        !matches!(self.format(num_id, level), None | Some("bullet") | Some("none"))
    }
}
