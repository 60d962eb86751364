//! Run model
//!
//! A [`Run`] is a formatting-homogeneous span of text: its resolved target
//! style name plus the attributes that must be written out explicitly.

use serde::Serialize;

use crate::attributes::{AttributeKind, AttributeValue};

/// Ordered set of explicit attributes, at most one value per kind
///
/// Insertion order drives rendering. Equality ignores order: two maps are
/// equal when they hold the same kinds with the same values.
#[derive(Debug, Clone, Default, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeMap {
    entries: Vec<AttributeValue>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any existing value of the same kind in place
    pub fn insert(&mut self, value: AttributeValue) {
        let kind = value.kind();
        match self.entries.iter_mut().find(|v| v.kind() == kind) {
            Some(existing) => *existing = value,
            None => self.entries.push(value),
        }
    }

    pub fn get(&self, kind: AttributeKind) -> Option<&AttributeValue> {
        self.entries.iter().find(|v| v.kind() == kind)
    }

    pub fn contains(&self, kind: AttributeKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn remove(&mut self, kind: AttributeKind) -> Option<AttributeValue> {
        let index = self.entries.iter().position(|v| v.kind() == kind)?;
        Some(self.entries.remove(index))
    }

    /// Values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &AttributeValue> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for AttributeMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|value| other.get(value.kind()) == Some(value))
    }
}

impl FromIterator<AttributeValue> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = AttributeValue>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for value in iter {
            map.insert(value);
        }
        map
    }
}

/// A formatting-homogeneous span of text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Run {
    text: String,
    named_style: Option<String>,
    attributes: AttributeMap,
}

impl Run {
    pub fn new(
        text: impl Into<String>,
        named_style: Option<String>,
        attributes: AttributeMap,
    ) -> Self {
        Self {
            text: text.into(),
            named_style,
            attributes,
        }
    }

    /// Unstyled run without explicit attributes
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None, AttributeMap::new())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Target style name, `None` when the run is not wrapped
    pub fn named_style(&self) -> Option<&str> {
        self.named_style.as_deref()
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Same target style and the same explicit attributes, in any order
    pub fn has_same_formatting(&self, other: &Run) -> bool {
        self.named_style == other.named_style && self.attributes == other.attributes
    }

    pub fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
