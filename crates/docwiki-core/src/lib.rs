//! docwiki-core - rich text to MediaWiki markup
//!
//! The style-resolution and run-compaction engine of docwiki. Given
//! paragraphs of text runs with absolute character formatting, it decides
//! which attributes are already implied by the inherited styles, merges
//! adjacent runs with identical effective formatting, and renders the
//! result as wikitext with as little markup as possible.
//!
//! The pipeline, leaves first:
//!
//! - [`resolver`]: explicit attributes of one run against its style chain
//! - [`run`] / [`paragraph`]: run model and compaction
//! - [`render`]: inline markup per run, template wrapping per named style
//! - [`assemble`]: paragraph grouping, list prefixes, references
//! - [`convert`]: the driver, including recursive footnote conversion
//!
//! # Example
//!
//! ```
//! use docwiki_core::{
//!     CharProps, Converter, SourceDocument, SourceParagraph, SourceRun, StyleNameMap,
//!     StyleTable, WikiRenderer,
//! };
//!
//! let styles = StyleTable::new().with_paragraph_style("quote", CharProps::default());
//! let names = StyleNameMap::new().with_mapping("quote", "myns:quote");
//! let doc = SourceDocument::new(vec![
//!     SourceParagraph::new("quote").with_run(SourceRun::new("Hi")),
//! ]);
//!
//! let result = Converter::new(&styles, &names, &WikiRenderer).convert(&doc);
//! assert_eq!(result.text, "{{myns:quote|Hi}}");
//! ```

pub mod assemble;
pub mod attributes;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod paragraph;
pub mod render;
pub mod resolver;
pub mod run;
pub mod settings;
pub mod source;
pub mod style_names;

// Re-export main types and functions
pub use assemble::assemble_document;
pub use attributes::{
    AttributeKind, AttributeValue, CaseMap, CharProps, Color, FontWeight, Posture, Strikeout,
    Underline,
};
pub use convert::{Conversion, Converter};
pub use diagnostics::{ConversionDiagnostics, Diagnostic, DiagnosticKind, Severity};
pub use error::SettingsError;
pub use paragraph::Paragraph;
pub use render::{MarkupRenderer, WikiRenderer};
pub use resolver::{
    AttributeResolver, ResolverOptions, StyleFamily, StyleResolutionContext, StyleTable,
};
pub use run::{AttributeMap, Run};
pub use settings::{ConversionOptions, ConversionSettings, SETTINGS_FILE_NAME};
pub use source::{Footnote, ListInfo, Portion, SourceDocument, SourceParagraph, SourceRun};
pub use style_names::{MappedStyle, NameMapper, StyleNameMap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.3.0");
    }
}
