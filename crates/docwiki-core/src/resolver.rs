//! Attribute resolution
//!
//! Decides, for one run, which of its absolute character properties are
//! already implied by the style chain (character style, paragraph style,
//! document default) and which must be emitted explicitly.
//!
//! The policy for one attribute, in order:
//!
//! 1. `in_default`: the value equals the document default.
//! 2. `in_char`: the run has a character style whose value equals it.
//! 3. `in_para`: the paragraph has a style whose value equals it.
//! 4. A value set deliberately on the character style (`!in_default && in_char`)
//!    is implied.
//! 5. Otherwise, with a paragraph style, the value is implied iff `in_para`.
//! 6. Otherwise it is implied iff `in_default`.
//!
//! Step 4 takes precedence over step 5: a character style that sets a value
//! suppresses it even when the paragraph style disagrees.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::attributes::{AttributeKind, AttributeValue, CharProps, Underline};
use crate::diagnostics::{ConversionDiagnostics, CODE_UNEXPECTED_COMBINATION};
use crate::run::AttributeMap;
use crate::source::SourceRun;

/// Style family a style name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleFamily {
    Paragraph,
    Character,
}

impl fmt::Display for StyleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleFamily::Paragraph => write!(f, "paragraph"),
            StyleFamily::Character => write!(f, "character"),
        }
    }
}

/// Read access to the source document's style definitions
pub trait StyleResolutionContext {
    /// Effective character properties of a named style, `None` if the
    /// document has no such style
    fn style_props(&self, family: StyleFamily, name: &str) -> Option<CharProps>;

    /// Document-wide baseline properties
    fn default_props(&self) -> CharProps;

    /// A style's value for one attribute kind
    fn style_value(
        &self,
        family: StyleFamily,
        name: &str,
        kind: AttributeKind,
    ) -> Option<Option<AttributeValue>> {
        self.style_props(family, name).map(|props| props.value(kind))
    }
}

/// In-memory style definitions
///
/// ```
/// use docwiki_core::{CharProps, StyleFamily, StyleResolutionContext, StyleTable};
///
/// let styles = StyleTable::new()
///     .with_paragraph_style("Heading", CharProps::default().bold());
/// assert!(styles.style_props(StyleFamily::Paragraph, "Heading").is_some());
/// assert!(styles.style_props(StyleFamily::Character, "Heading").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    pub defaults: CharProps,
    pub paragraph: BTreeMap<String, CharProps>,
    pub character: BTreeMap<String, CharProps>,
}

impl StyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: CharProps) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_paragraph_style(mut self, name: impl Into<String>, props: CharProps) -> Self {
        self.paragraph.insert(name.into(), props);
        self
    }

    pub fn with_character_style(mut self, name: impl Into<String>, props: CharProps) -> Self {
        self.character.insert(name.into(), props);
        self
    }
}

impl StyleResolutionContext for StyleTable {
    fn style_props(&self, family: StyleFamily, name: &str) -> Option<CharProps> {
        match family {
            StyleFamily::Paragraph => self.paragraph.get(name).copied(),
            StyleFamily::Character => self.character.get(name).copied(),
        }
    }

    fn default_props(&self) -> CharProps {
        self.defaults
    }
}

/// Resolver switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Never emit font colors
    pub ignore_font_color: bool,
}

/// Computes the explicit attributes of runs against a style context
pub struct AttributeResolver<'a, C: StyleResolutionContext + ?Sized> {
    styles: &'a C,
    options: ResolverOptions,
}

impl<'a, C: StyleResolutionContext + ?Sized> AttributeResolver<'a, C> {
    pub fn new(styles: &'a C) -> Self {
        Self {
            styles,
            options: ResolverOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Explicit attributes of `run` inside a paragraph styled `para_style`
    ///
    /// Style names are *source* names; an empty name means "no style".
    pub fn resolve(
        &self,
        run: &SourceRun,
        para_style: &str,
        diagnostics: &mut ConversionDiagnostics,
    ) -> AttributeMap {
        let mut attributes = AttributeMap::new();

        let link = run.hyperlink.as_deref().filter(|t| !t.is_empty());
        if let Some(target) = link {
            attributes.insert(AttributeValue::HyperlinkTarget(target.to_string()));
        }

        let whitespace_only = run.text.trim().is_empty();

        for kind in AttributeKind::CHARACTER {
            if whitespace_only && !kind.visible_on_whitespace() {
                continue;
            }
            if link.is_some() && kind.absorbed_by_hyperlink() {
                continue;
            }
            if kind == AttributeKind::FontColor && self.options.ignore_font_color {
                continue;
            }
            let Some(value) = run.props.value(kind) else {
                continue;
            };
            if self.is_implied(&value, &run.char_style, para_style, diagnostics) {
                continue;
            }
            trace!(?value, text = %run.text, "explicit attribute");
            attributes.insert(value);
        }

        if run.props.underline == Underline::None
            && attributes.remove(AttributeKind::UnderlineColor).is_some()
        {
            diagnostics.data_quality(
                CODE_UNEXPECTED_COMBINATION,
                format!("underline color without underline dropped on '{}'", run.text),
            );
        }

        attributes
    }

    /// Whether `value` is already supplied by the run's style chain
    pub fn is_implied(
        &self,
        value: &AttributeValue,
        char_style: &str,
        para_style: &str,
        diagnostics: &mut ConversionDiagnostics,
    ) -> bool {
        let kind = value.kind();
        let in_default = self.styles.default_props().value(kind).as_ref() == Some(value);
        let in_char = !char_style.is_empty()
            && self.style_has(StyleFamily::Character, char_style, value, diagnostics);
        let in_para = !para_style.is_empty()
            && self.style_has(StyleFamily::Paragraph, para_style, value, diagnostics);

        if !in_default && in_char {
            return true;
        }
        if !para_style.is_empty() {
            return in_para;
        }
        in_default
    }

    fn style_has(
        &self,
        family: StyleFamily,
        name: &str,
        value: &AttributeValue,
        diagnostics: &mut ConversionDiagnostics,
    ) -> bool {
        match self.styles.style_value(family, name, value.kind()) {
            Some(style_value) => style_value.as_ref() == Some(value),
            None => {
                diagnostics.missing_style_reference(family, name);
                false
            }
        }
    }
}
