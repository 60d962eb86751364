//! Markup rendering
//!
//! [`MarkupRenderer`] is the seam between the engine and a target markup
//! language; [`WikiRenderer`] renders MediaWiki wikitext with inline CSS.

use std::collections::BTreeMap;

use tracing::trace;

use crate::attributes::{
    AttributeKind, AttributeValue, CaseMap, Color, FontWeight, Posture, Strikeout, Underline,
};
use crate::diagnostics::{
    ConversionDiagnostics, CODE_UNEXPECTED_COMBINATION, CODE_UNMAPPED_VALUE,
};
use crate::paragraph::Paragraph;
use crate::run::Run;

/// A target markup dialect
pub trait MarkupRenderer {
    /// Render one run with all of its explicit attributes
    fn render_run(&self, run: &Run, diagnostics: &mut ConversionDiagnostics) -> String;

    /// Wrap content in a named block style. Unstyled and empty content
    /// pass through unchanged.
    fn wrap_styled(&self, style: Option<&str>, content: &str) -> String;

    /// Prefix of a list item at `level` (1-based)
    fn list_prefix(&self, level: u32, numbered: bool) -> String;

    /// Inline footnote reference carrying the footnote's rendered body
    fn footnote(&self, content: &str) -> String;

    /// Marker placed after the content of a document with footnotes
    fn references(&self) -> &str;

    /// Separator between blocks
    fn block_separator(&self) -> &str;

    /// Extension of output files, without leading dot
    fn file_extension(&self) -> &str;

    /// Append rendered inline markup to `buffer`
    fn join_inline(&self, buffer: &mut String, next: &str) {
        buffer.push_str(next);
    }

    /// Render a paragraph's runs, wrapping consecutive runs that share a
    /// named style in one template
    fn render_paragraph(
        &self,
        paragraph: &Paragraph,
        diagnostics: &mut ConversionDiagnostics,
    ) -> String {
        let mut result = String::new();
        let mut runs = paragraph.runs().iter().peekable();

        while let Some(first) = runs.next() {
            let style = first.named_style();
            let mut buffer = self.render_run(first, diagnostics);
            while let Some(next) = runs.next_if(|r| r.named_style() == style) {
                let rendered = self.render_run(next, diagnostics);
                self.join_inline(&mut buffer, &rendered);
            }
            result.push_str(&self.wrap_styled(style, &buffer));
        }

        result
    }
}

/// MediaWiki renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiRenderer;

impl WikiRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupRenderer for WikiRenderer {
    fn render_run(&self, run: &Run, diagnostics: &mut ConversionDiagnostics) -> String {
        let attrs = run.attributes();
        let mut text = escape_non_breaking(run.text());
        let mut css = CssDeclarations::default();

        if let Some(AttributeValue::HyperlinkTarget(target)) =
            attrs.get(AttributeKind::HyperlinkTarget)
        {
            text = if target == run.text() {
                format!("[{}]", text)
            } else {
                format!("[{} {}]", target, text)
            };
        }

        if let Some(AttributeValue::Italic(posture)) = attrs.get(AttributeKind::Italic) {
            match posture {
                Posture::Italic => text = surround(&text, "''"),
                Posture::Oblique => {
                    diagnostics.data_quality(
                        CODE_UNMAPPED_VALUE,
                        "oblique posture rendered as italic",
                    );
                    text = surround(&text, "''");
                }
                Posture::Normal => css.set("font-style", "normal", diagnostics),
            }
        }

        if let Some(AttributeValue::Bold(weight)) = attrs.get(AttributeKind::Bold) {
            if weight.is_bold() {
                if *weight != FontWeight::BOLD {
                    diagnostics.data_quality(
                        CODE_UNMAPPED_VALUE,
                        format!("font weight {} rendered as bold", weight.0),
                    );
                }
                text = surround(&text, "'''");
            } else {
                css.set("font-weight", "normal", diagnostics);
            }
        }

        if let Some(AttributeValue::CaseMap(case)) = attrs.get(AttributeKind::CaseMap) {
            match case {
                CaseMap::Upper => css.set("text-transform", "uppercase", diagnostics),
                CaseMap::Lower => css.set("text-transform", "lowercase", diagnostics),
                CaseMap::Title => css.set("text-transform", "capitalize", diagnostics),
                CaseMap::SmallCaps => css.set("font-variant", "small-caps", diagnostics),
                CaseMap::None => {
                    css.set("font-variant", "normal", diagnostics);
                    css.set("text-transform", "none", diagnostics);
                }
            }
        }

        if let Some(AttributeValue::FontColor(color)) = attrs.get(AttributeKind::FontColor) {
            match color {
                Color::Rgb(_) => css.set("color", &color.to_string(), diagnostics),
                Color::Auto => css.set("color", "initial", diagnostics),
            }
        }

        if let Some(AttributeValue::Escapement(escapement)) =
            attrs.get(AttributeKind::Escapement)
        {
            match escapement.signum() {
                1 => text = surround_with_tag(&text, "sup", None),
                -1 => text = surround_with_tag(&text, "sub", None),
                // back on the baseline inside a raised or lowered style
                _ => css.set("vertical-align", "baseline", diagnostics),
            }
        }

        if let Some(AttributeValue::Strikeout(kind)) = attrs.get(AttributeKind::Strikeout) {
            match strikeout_style(*kind) {
                Some(style) => css.decoration("line-through", style, diagnostics),
                None => diagnostics.data_quality(
                    CODE_UNMAPPED_VALUE,
                    format!("ignoring unexpected strikeout kind {:?}", kind),
                ),
            }
        }

        if let Some(AttributeValue::Underline(kind)) = attrs.get(AttributeKind::Underline) {
            match underline_style(*kind) {
                Some(style) => css.decoration("underline", style, diagnostics),
                None => diagnostics.data_quality(
                    CODE_UNMAPPED_VALUE,
                    format!("ignoring unexpected underline kind {:?}", kind),
                ),
            }
        }

        if let Some(AttributeValue::UnderlineColor(color)) =
            attrs.get(AttributeKind::UnderlineColor)
        {
            match color {
                Color::Rgb(_) => css.set("text-decoration-color", &color.to_string(), diagnostics),
                Color::Auto => diagnostics.data_quality(
                    CODE_UNEXPECTED_COMBINATION,
                    "automatic underline color cannot be expressed, skipped",
                ),
            }
        }

        if !css.is_empty() {
            let style = format!("style=\"{}\"", css);
            text = surround_with_tag(&text, "span", Some(&style));
            // <span> is not rendered inside {{templates}}, so go through #tag
            text = format!("{{{{#tag:span|{}}}}}", text);
        }

        text
    }

    fn wrap_styled(&self, style: Option<&str>, content: &str) -> String {
        match style {
            Some(name) if !content.is_empty() => {
                format!("{{{{{}|{}}}}}", name, template_argument(content))
            }
            _ => content.to_string(),
        }
    }

    fn list_prefix(&self, level: u32, numbered: bool) -> String {
        let marker = if numbered { "#" } else { "*" };
        format!("{} ", marker.repeat(level.max(1) as usize))
    }

    fn footnote(&self, content: &str) -> String {
        format!("<ref>{}</ref>", content.trim())
    }

    fn references(&self) -> &str {
        "<references />"
    }

    fn block_separator(&self) -> &str {
        "\n\n"
    }

    fn file_extension(&self) -> &str {
        "wiki.txt"
    }

    fn join_inline(&self, buffer: &mut String, next: &str) {
        // ''' followed by '' would read as one run of five apostrophes
        if buffer.ends_with('\'') && next.starts_with('\'') {
            buffer.push_str("<nowiki/>");
        }
        buffer.push_str(next);
    }
}

/// Make content safe as the single positional argument of a template.
///
/// Only top-level `|` and `=` are significant: nested templates, wiki
/// links and `<ref>` bodies are copied as they are. Pipes become `{{!}}`
/// and an equals sign turns the argument into an explicit `1=`.
pub fn template_argument(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut has_equals = false;
    let mut braces = 0usize;
    let mut brackets = 0usize;
    let mut rest = content;

    while let Some(c) = rest.chars().next() {
        if braces == 0 && brackets == 0 && rest.starts_with("<ref>") {
            let end = rest
                .find("</ref>")
                .map_or(rest.len(), |i| i + "</ref>".len());
            result.push_str(&rest[..end]);
            rest = &rest[end..];
            continue;
        }

        let pair = if rest.starts_with("{{") {
            braces += 1;
            true
        } else if rest.starts_with("}}") && braces > 0 {
            braces -= 1;
            true
        } else if rest.starts_with("[[") {
            brackets += 1;
            true
        } else if rest.starts_with("]]") && brackets > 0 {
            brackets -= 1;
            true
        } else {
            false
        };
        if pair {
            result.push_str(&rest[..2]);
            rest = &rest[2..];
            continue;
        }

        let nested = braces > 0 || brackets > 0;
        match c {
            '|' if !nested => result.push_str("{{!}}"),
            '=' if !nested => {
                has_equals = true;
                result.push(c);
            }
            _ => result.push(c),
        }
        rest = &rest[c.len_utf8()..];
    }

    if has_equals {
        result.insert_str(0, "1=");
    }
    result
}

/// Replace glue characters with entities so the wiki source stays readable
pub fn escape_non_breaking(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{00A0}' => result.push_str("&nbsp;"),
            '\u{2011}' => result.push_str("&#x2011;"),
            _ => result.push(c),
        }
    }
    result
}

fn surround(text: &str, marker: &str) -> String {
    format!("{}{}{}", marker, text, marker)
}

fn surround_with_tag(text: &str, tag: &str, attributes: Option<&str>) -> String {
    match attributes {
        Some(attributes) => format!("<{} {}>{}</{}>", tag, attributes, text, tag),
        None => format!("<{}>{}</{}>", tag, text, tag),
    }
}

/// CSS `text-decoration-style` of a strikeout kind; `Some(None)` means the
/// kind removes an inherited decoration
fn strikeout_style(kind: Strikeout) -> Option<Option<&'static str>> {
    let style = match kind {
        Strikeout::None => None,
        Strikeout::Single | Strikeout::Bold => Some("solid"),
        Strikeout::Double | Strikeout::Slash | Strikeout::X => Some("double"),
        Strikeout::DontKnow => return None,
    };
    Some(style)
}

/// CSS `text-decoration-style` of an underline kind, see [`strikeout_style`]
fn underline_style(kind: Underline) -> Option<Option<&'static str>> {
    let style = match kind {
        Underline::None => None,
        Underline::Single | Underline::Bold => Some("solid"),
        Underline::Double => Some("double"),
        Underline::Dotted | Underline::DashDotDot | Underline::BoldDotted => Some("dotted"),
        Underline::Dash
        | Underline::LongDash
        | Underline::DashDot
        | Underline::BoldDash
        | Underline::BoldLongDash
        | Underline::BoldDashDot
        | Underline::BoldDashDotDot => Some("dashed"),
        Underline::SmallWave | Underline::Wave | Underline::DoubleWave | Underline::BoldWave => {
            Some("wavy")
        }
        Underline::DontKnow => return None,
    };
    Some(style)
}

/// Accumulated CSS declarations, serialized sorted by property name
#[derive(Debug, Default)]
struct CssDeclarations {
    properties: BTreeMap<&'static str, String>,
}

impl CssDeclarations {
    fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Set a property; a different existing value is overwritten with a warning
    fn set(&mut self, name: &'static str, value: &str, diagnostics: &mut ConversionDiagnostics) {
        if let Some(old) = self.properties.get(name) {
            if old != value {
                diagnostics.data_quality(
                    CODE_UNEXPECTED_COMBINATION,
                    format!("css property '{}' changed from '{}' to '{}'", name, old, value),
                );
            }
        }
        self.properties.insert(name, value.to_string());
    }

    /// Append to a space-separated property value
    fn append(&mut self, name: &'static str, value: &str) {
        self.properties
            .entry(name)
            .and_modify(|v| {
                v.push(' ');
                v.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    /// Add a text decoration. `None` drops inherited decorations instead.
    fn decoration(
        &mut self,
        line: &str,
        style: Option<&str>,
        diagnostics: &mut ConversionDiagnostics,
    ) {
        match style {
            None => {
                trace!(line, "overriding inherited decoration");
                self.set("display", "inline-block", diagnostics);
            }
            Some(style) => {
                self.append("text-decoration", line);
                if style != "solid" {
                    self.set("text-decoration-style", style, diagnostics);
                }
            }
        }
    }
}

impl std::fmt::Display for CssDeclarations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in &self.properties {
            write!(f, "{}:{};", name, value)?;
        }
        Ok(())
    }
}
