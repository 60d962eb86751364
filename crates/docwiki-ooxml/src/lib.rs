//! # docwiki-ooxml
//!
//! DOCX (Office Open XML) source adapter for docwiki.
//!
//! This crate provides functionality to:
//! - Unpack a DOCX file and parse its styles, numbering and relationships
//! - Read body paragraphs, footnotes and endnotes into the docwiki source model
//! - Resolve style names to effective character properties for the converter
//!
//! ## Example: Converting a Document
//!
//! ```no_run
//! use docwiki_core::{Converter, StyleNameMap, WikiRenderer};
//! use docwiki_ooxml::read_docx;
//!
//! let source = read_docx("document.docx")?;
//! let names = StyleNameMap::new();
//! let result = Converter::new(&source.styles, &names, &WikiRenderer).convert(&source.document);
//! println!("{}", result.text);
//! # Ok::<(), docwiki_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod numbering;
pub mod reader;
pub mod relationships;
pub mod run_props;
pub mod styles;
mod xml;

pub use archive::OoxmlArchive;
pub use document::{parse_body, parse_notes, NoteBodies, StoryContext};
pub use error::{OoxmlError, Result};
pub use numbering::{Numbering, NumberingRef};
pub use reader::{read_docx, DocxReader, DocxSource};
pub use relationships::{RelationshipTarget, Relationships};
pub use run_props::RunPropsPatch;
pub use styles::{Style, StyleSheet, StyleType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
