//! Conversion diagnostics
//!
//! Conversion never fails on malformed per-run data. Everything that went
//! wrong, or could not be represented, is collected here and returned to
//! the caller alongside the markup.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::resolver::StyleFamily;

/// Missing style reference in the source document
pub const CODE_MISSING_STYLE: &str = "W001";
/// Enumeration value the renderer has no mapping for
pub const CODE_UNMAPPED_VALUE: &str = "W002";
/// Attribute combination the target markup cannot express
pub const CODE_UNEXPECTED_COMBINATION: &str = "W003";
/// Footnote placed before any text of its paragraph
pub const CODE_FOOTNOTE_AT_START: &str = "N001";
/// Unsupported element skipped
pub const CODE_UNSUPPORTED_ELEMENT: &str = "N002";

/// A diagnostic message produced during conversion
///
/// # Example
///
/// ```
/// use docwiki_core::diagnostics::{Diagnostic, DiagnosticKind, Severity};
///
/// let diag = Diagnostic::new(
///     Severity::Warning,
///     DiagnosticKind::DataQuality,
///     "Unexpected font weight 500",
/// )
/// .with_code("W002")
/// .with_help("Weights below 600 are not rendered as bold");
/// assert!(diag.is_warning());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// Error taxonomy bucket
    pub kind: DiagnosticKind,

    /// The diagnostic message
    pub message: String,

    /// Optional code (e.g., "W001", "N002")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Where in the document the issue occurred (e.g., "paragraph 4")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    /// Related notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning, output is best effort
    Warning,

    /// Error, part of the input was lost
    Error,
}

/// Recoverable error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Bad or unexpected input data; a safe default was used
    DataQuality,
    /// Valid input the converter does not implement; the element was skipped
    StructuralGap,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            code: None,
            location: None,
            help: None,
            notes: Vec::new(),
        }
    }

    /// Create a data-quality warning
    pub fn data_quality(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, DiagnosticKind::DataQuality, message)
    }

    /// Create a "not implemented" warning
    pub fn structural_gap(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, DiagnosticKind::StructuralGap, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the document location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Add a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// Check if this is a warning-level diagnostic
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        if let Some(ref location) = self.location {
            write!(f, "\n  --> {}", location)?;
        }

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {}", note)?;
        }

        Ok(())
    }
}

/// Everything one conversion reports besides its markup
///
/// Owned by the caller of a single conversion; nested conversions (footnote
/// bodies) produce their own value which is [merged](Self::merge) back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionDiagnostics {
    diagnostics: Vec<Diagnostic>,
    /// How often each source style name was looked up
    style_usage: BTreeMap<String, usize>,
    /// Source style names without a configured mapping
    missing_styles: BTreeSet<String>,
    /// Number of source elements dropped from the output
    skipped_elements: usize,
    /// Style references already reported as missing, as "family:name"
    #[serde(skip)]
    reported_references: BTreeSet<String>,
}

impl ConversionDiagnostics {
    /// Create an empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic, mirroring it to the log
    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!(kind = ?diagnostic.kind, code = ?diagnostic.code, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Record a data-quality issue
    pub fn data_quality(&mut self, code: &str, message: impl Into<String>) {
        self.push(Diagnostic::data_quality(message).with_code(code));
    }

    /// Record a "not implemented" element that was skipped
    pub fn structural_gap(&mut self, code: &str, message: impl Into<String>) {
        self.skipped(Diagnostic::structural_gap(message).with_code(code));
    }

    /// Record a skipped element with a prepared diagnostic
    pub fn skipped(&mut self, diagnostic: Diagnostic) {
        self.skipped_elements += 1;
        self.push(diagnostic);
    }

    /// Report a style reference that the style context cannot resolve.
    /// Each reference is reported once per conversion.
    pub fn missing_style_reference(&mut self, family: StyleFamily, name: &str) {
        let key = format!("{}:{}", family, name);
        if self.reported_references.insert(key) {
            self.push(
                Diagnostic::data_quality(format!("{} style '{}' not found", family, name))
                    .with_code(CODE_MISSING_STYLE)
                    .with_help("attributes are kept as if the style did not imply them"),
            );
        }
    }

    /// Count one use of a source style name
    pub fn record_style_use(&mut self, name: &str) {
        *self.style_usage.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Remember a style name that has no mapping
    pub fn record_missing_style(&mut self, name: &str) {
        self.missing_styles.insert(name.to_string());
    }

    /// Fold a nested conversion's diagnostics into this one
    pub fn merge(&mut self, other: ConversionDiagnostics) {
        for diagnostic in other.diagnostics {
            let duplicate = diagnostic.code.as_deref() == Some(CODE_MISSING_STYLE)
                && self.diagnostics.contains(&diagnostic);
            if !duplicate {
                self.diagnostics.push(diagnostic);
            }
        }
        for (name, count) in other.style_usage {
            *self.style_usage.entry(name).or_insert(0) += count;
        }
        self.missing_styles.extend(other.missing_styles);
        self.skipped_elements += other.skipped_elements;
        self.reported_references.extend(other.reported_references);
    }

    /// All diagnostics in the order they were reported
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if no diagnostics were reported
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    /// Check whether a diagnostic with this code was reported
    pub fn has_code(&self, code: &str) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.code.as_deref() == Some(code))
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// Number of skipped source elements
    pub fn skipped_elements(&self) -> usize {
        self.skipped_elements
    }

    /// Usage count of a source style name
    pub fn style_usage(&self, name: &str) -> usize {
        self.style_usage.get(name).copied().unwrap_or(0)
    }

    /// Source style names without a mapping, sorted
    pub fn missing_styles(&self) -> &BTreeSet<String> {
        &self.missing_styles
    }

    /// Missing styles ordered by how often they were used, most used first.
    /// Ties are broken by name.
    pub fn most_common_missing_styles(&self, limit: usize) -> Vec<&str> {
        let mut styles: Vec<(&str, usize)> = self
            .missing_styles
            .iter()
            .map(|name| (name.as_str(), self.style_usage(name)))
            .collect();
        styles.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        styles.into_iter().take(limit).map(|(name, _)| name).collect()
    }

    /// Short human-readable list of the missing styles, e.g.
    /// `'Quote', 'Code' and 3 more styles`
    pub fn missing_styles_summary(&self, shown: usize) -> Option<String> {
        if self.missing_styles.is_empty() {
            return None;
        }
        let names: Vec<String> = self
            .most_common_missing_styles(shown)
            .into_iter()
            .map(|name| format!("'{}'", name))
            .collect();
        let mut summary = names.join(", ");
        let rest = self.missing_styles.len() - names.len();
        if rest > 0 {
            summary.push_str(&format!(
                " and {} more style{}",
                rest,
                if rest == 1 { "" } else { "s" }
            ));
        }
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::structural_gap("footnote at paragraph start")
            .with_code(CODE_FOOTNOTE_AT_START)
            .with_location("paragraph 2")
            .with_help("move the footnote after some text");

        let output = diag.to_string();
        assert!(output.starts_with("warning[N001]: footnote at paragraph start"));
        assert!(output.contains("--> paragraph 2"));
        assert!(output.contains("= help: move the footnote"));
    }

    #[test]
    fn test_missing_reference_reported_once() {
        let mut diags = ConversionDiagnostics::new();
        diags.missing_style_reference(StyleFamily::Character, "Ghost");
        diags.missing_style_reference(StyleFamily::Character, "Ghost");
        diags.missing_style_reference(StyleFamily::Paragraph, "Ghost");

        assert_eq!(diags.len(), 2);
        assert!(diags.has_code(CODE_MISSING_STYLE));
        assert_eq!(diags.of_kind(DiagnosticKind::DataQuality).count(), 2);
    }

    #[test]
    fn test_structural_gap_counts_skipped() {
        let mut diags = ConversionDiagnostics::new();
        diags.structural_gap(CODE_UNSUPPORTED_ELEMENT, "table skipped");
        diags.structural_gap(CODE_UNSUPPORTED_ELEMENT, "drawing skipped");
        assert_eq!(diags.skipped_elements(), 2);
        assert_eq!(diags.warning_count(), 2);
    }

    #[test]
    fn test_most_common_missing_styles() {
        let mut diags = ConversionDiagnostics::new();
        for name in ["Quote", "Code", "Code", "Code", "Aside", "Quote"] {
            diags.record_style_use(name);
            diags.record_missing_style(name);
        }

        assert_eq!(diags.most_common_missing_styles(2), vec!["Code", "Quote"]);
        assert_eq!(
            diags.missing_styles_summary(2).as_deref(),
            Some("'Code', 'Quote' and 1 more style")
        );
        assert_eq!(diags.missing_styles_summary(5).as_deref(), Some("'Code', 'Quote', 'Aside'"));
    }

    #[test]
    fn test_missing_styles_summary_empty() {
        assert!(ConversionDiagnostics::new().missing_styles_summary(2).is_none());
    }

    #[test]
    fn test_merge() {
        let mut outer = ConversionDiagnostics::new();
        outer.record_style_use("Quote");
        outer.missing_style_reference(StyleFamily::Paragraph, "Ghost");

        let mut inner = ConversionDiagnostics::new();
        inner.record_style_use("Quote");
        inner.record_missing_style("Footnote");
        inner.structural_gap(CODE_UNSUPPORTED_ELEMENT, "image skipped");
        inner.missing_style_reference(StyleFamily::Paragraph, "Ghost");

        outer.merge(inner);
        assert_eq!(outer.style_usage("Quote"), 2);
        assert!(outer.missing_styles().contains("Footnote"));
        assert_eq!(outer.skipped_elements(), 1);
        assert_eq!(outer.len(), 2);
    }

    #[test]
    fn test_serialize_json() {
        let mut diags = ConversionDiagnostics::new();
        diags.data_quality(CODE_UNMAPPED_VALUE, "unmapped underline kind");
        let json = serde_json::to_string(&diags).unwrap();
        assert!(json.contains("\"data_quality\""));
        assert!(json.contains("W002"));
    }
}
