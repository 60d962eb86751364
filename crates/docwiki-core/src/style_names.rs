//! Source-to-target style name mapping

use std::collections::BTreeMap;

/// Style names that mean "no particular style" in common word processors
pub const DEFAULT_STYLE_NAMES: &[&str] =
    &["Standard", "Normal", "Default Paragraph Font", "Default Style"];

/// Outcome of mapping one source style name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedStyle {
    /// Default or empty style: content is not wrapped
    Unstyled,
    /// Mapped to a blank name: the style is deliberately dropped
    Suppressed,
    /// Explicitly mapped to a target template name
    Mapped(String),
    /// No mapping configured; the source name is used as is
    Unmapped(String),
}

impl MappedStyle {
    /// Target template name to wrap content in, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            MappedStyle::Unstyled | MappedStyle::Suppressed => None,
            MappedStyle::Mapped(name) | MappedStyle::Unmapped(name) => Some(name),
        }
    }

    /// Owned form of [`MappedStyle::target`]
    pub fn into_target(self) -> Option<String> {
        match self {
            MappedStyle::Unstyled | MappedStyle::Suppressed => None,
            MappedStyle::Mapped(name) | MappedStyle::Unmapped(name) => Some(name),
        }
    }
}

/// Maps source style names to target template names
pub trait NameMapper {
    fn map_style(&self, source: &str) -> MappedStyle;
}

impl<F> NameMapper for F
where
    F: Fn(&str) -> MappedStyle,
{
    fn map_style(&self, source: &str) -> MappedStyle {
        self(source)
    }
}

/// Table-driven [`NameMapper`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNameMap {
    mappings: BTreeMap<String, String>,
    defaults: Vec<String>,
}

impl Default for StyleNameMap {
    fn default() -> Self {
        Self {
            mappings: BTreeMap::new(),
            defaults: DEFAULT_STYLE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StyleNameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list of names treated as "no style"
    pub fn with_default_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaults = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add a mapping; a blank target suppresses the style
    pub fn with_mapping(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.insert(source, target);
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.mappings.insert(source.into(), target.into());
    }

    pub fn mappings(&self) -> &BTreeMap<String, String> {
        &self.mappings
    }

    pub fn is_default_name(&self, name: &str) -> bool {
        name.is_empty() || self.defaults.iter().any(|d| d == name)
    }
}

impl NameMapper for StyleNameMap {
    fn map_style(&self, source: &str) -> MappedStyle {
        if self.is_default_name(source) {
            return MappedStyle::Unstyled;
        }
        match self.mappings.get(source) {
            Some(target) if target.trim().is_empty() => MappedStyle::Suppressed,
            Some(target) => MappedStyle::Mapped(target.trim().to_string()),
            None => MappedStyle::Unmapped(source.to_string()),
        }
    }
}
