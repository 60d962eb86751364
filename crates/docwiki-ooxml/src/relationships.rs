//! Relationship parsing for DOCX parts
//!
//! Each part may carry a `_rels/<part>.rels` file mapping relationship IDs
//! to targets. The reader only needs them to resolve hyperlink targets.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// Hyperlink relationship type
pub const TYPE_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// A relationship target with its type and mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTarget {
    /// The target URL or path
    pub target: String,
    /// The relationship type URI
    pub rel_type: String,
    /// "External" for URLs, None for package-internal targets
    pub target_mode: Option<String>,
}

impl RelationshipTarget {
    /// Whether the target points outside the package
    pub fn is_external(&self) -> bool {
        self.target_mode.as_deref() == Some("External")
    }
}

/// Parsed relationships of one part
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    map: HashMap<String, RelationshipTarget>,
}

impl Relationships {
    /// Create an empty relationships map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut map = HashMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut target_mode = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.into_owned());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                b"TargetMode" => target_mode = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            map.insert(
                                id,
                                RelationshipTarget {
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                    target_mode,
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { map })
    }

    /// Parse optional relationship XML; a missing part means no relationships
    pub fn parse_optional(xml: Option<&[u8]>) -> Result<Self> {
        xml.map(Self::parse).transpose().map(Option::unwrap_or_default)
    }

    /// Look up a relationship by ID
    pub fn get(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    /// Target of a relationship by ID
    pub fn target(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether there are no relationships
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
