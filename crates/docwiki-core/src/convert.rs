//! Document conversion
//!
//! Drives the pipeline: resolve each source run's explicit attributes,
//! compact runs into paragraphs, then render and assemble. Footnote bodies
//! are converted recursively with the same converter.

use tracing::{debug, trace};

use crate::assemble::assemble_document;
use crate::diagnostics::{
    ConversionDiagnostics, Diagnostic, CODE_FOOTNOTE_AT_START, CODE_UNSUPPORTED_ELEMENT,
};
use crate::paragraph::Paragraph;
use crate::render::MarkupRenderer;
use crate::resolver::{AttributeResolver, ResolverOptions, StyleResolutionContext};
use crate::run::Run;
use crate::source::{Footnote, Portion, SourceDocument, SourceParagraph};
use crate::style_names::{MappedStyle, NameMapper};

/// Result of one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Rendered markup
    pub text: String,
    /// Everything reported while converting
    pub diagnostics: ConversionDiagnostics,
}

/// Converts source documents with a fixed set of collaborators
///
/// ```
/// use docwiki_core::{
///     CharProps, Converter, SourceDocument, SourceParagraph, SourceRun, StyleNameMap,
///     StyleTable, WikiRenderer,
/// };
///
/// let styles = StyleTable::new().with_paragraph_style("Standard", CharProps::default());
/// let names = StyleNameMap::new();
/// let converter = Converter::new(&styles, &names, &WikiRenderer);
///
/// let doc = SourceDocument::new(vec![SourceParagraph::new("Standard")
///     .with_run(SourceRun::new("Hello").with_props(CharProps::default().bold()))]);
/// assert_eq!(converter.convert(&doc).text, "'''Hello'''");
/// ```
pub struct Converter<'a> {
    styles: &'a dyn StyleResolutionContext,
    names: &'a dyn NameMapper,
    renderer: &'a dyn MarkupRenderer,
    options: ResolverOptions,
}

impl<'a> Converter<'a> {
    pub fn new(
        styles: &'a dyn StyleResolutionContext,
        names: &'a dyn NameMapper,
        renderer: &'a dyn MarkupRenderer,
    ) -> Self {
        Self {
            styles,
            names,
            renderer,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Convert a whole document. A references marker is appended when the
    /// document contains footnotes.
    pub fn convert(&self, document: &SourceDocument) -> Conversion {
        let mut diagnostics = ConversionDiagnostics::new();
        let (paragraphs, has_footnotes) =
            self.build_paragraphs(&document.paragraphs, &mut diagnostics);
        let text = assemble_document(&paragraphs, self.renderer, has_footnotes, &mut diagnostics);
        debug!(
            paragraphs = paragraphs.len(),
            warnings = diagnostics.warning_count(),
            "converted document"
        );
        Conversion { text, diagnostics }
    }

    /// Convert a paragraph sequence on its own, as done for footnote bodies.
    /// Never appends a references marker.
    pub fn convert_paragraphs(&self, paragraphs: &[SourceParagraph]) -> Conversion {
        let mut diagnostics = ConversionDiagnostics::new();
        let (paragraphs, _) = self.build_paragraphs(paragraphs, &mut diagnostics);
        let text = assemble_document(&paragraphs, self.renderer, false, &mut diagnostics);
        Conversion { text, diagnostics }
    }

    fn build_paragraphs(
        &self,
        source: &[SourceParagraph],
        diagnostics: &mut ConversionDiagnostics,
    ) -> (Vec<Paragraph>, bool) {
        let resolver = AttributeResolver::new(self.styles).with_options(self.options);
        let mut paragraphs = Vec::with_capacity(source.len());
        let mut has_footnotes = false;

        for (index, source_paragraph) in source.iter().enumerate() {
            debug!(index, style = %source_paragraph.style, "converting paragraph");
            let location = format!("paragraph {}", index + 1);
            let named_style = self.map_style(&source_paragraph.style, diagnostics);
            let mut paragraph = Paragraph::new(named_style).with_list(source_paragraph.list);

            for portion in &source_paragraph.portions {
                match portion {
                    Portion::Text(run) => {
                        if run.text.is_empty() {
                            continue;
                        }
                        let attributes =
                            resolver.resolve(run, &source_paragraph.style, diagnostics);
                        let named_style = self.map_style(&run.char_style, diagnostics);
                        paragraph.add_run(Run::new(run.text.clone(), named_style, attributes));
                    }
                    Portion::Footnote(footnote) => {
                        has_footnotes = true;
                        self.add_footnote(&mut paragraph, footnote, &location, diagnostics);
                    }
                    Portion::Unsupported { kind } => {
                        diagnostics.skipped(
                            Diagnostic::structural_gap(format!(
                                "{} is not implemented, skipped",
                                kind
                            ))
                            .with_code(CODE_UNSUPPORTED_ELEMENT)
                            .with_location(location.clone()),
                        );
                    }
                }
            }

            paragraphs.push(paragraph);
        }

        (paragraphs, has_footnotes)
    }

    fn add_footnote(
        &self,
        paragraph: &mut Paragraph,
        footnote: &Footnote,
        location: &str,
        diagnostics: &mut ConversionDiagnostics,
    ) {
        trace!(caption = %footnote.caption, "footnote reference");
        let body = self.convert_paragraphs(&footnote.paragraphs);
        diagnostics.merge(body.diagnostics);

        if !paragraph.append_footnote(&self.renderer.footnote(&body.text)) {
            diagnostics.skipped(
                Diagnostic::structural_gap(
                    "footnote at the start of a paragraph is not implemented",
                )
                .with_code(CODE_FOOTNOTE_AT_START)
                .with_location(location)
                .with_note(format!("footnote '{}' was dropped", footnote.caption)),
            );
        }
    }

    /// Map a source style name, recording its use and whether it has a mapping
    fn map_style(&self, source: &str, diagnostics: &mut ConversionDiagnostics) -> Option<String> {
        let mapped = self.names.map_style(source);
        match &mapped {
            MappedStyle::Unstyled => {}
            MappedStyle::Unmapped(name) => {
                diagnostics.record_style_use(source);
                diagnostics.record_missing_style(name);
            }
            MappedStyle::Mapped(_) | MappedStyle::Suppressed => {
                diagnostics.record_style_use(source)
            }
        }
        mapped.into_target()
    }
}
