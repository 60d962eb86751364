//! Source document model
//!
//! The already-extracted input of a conversion: paragraphs of runs with
//! absolute character properties and the *source* style names they
//! reference. Source adapters (such as the DOCX reader) produce this
//! model; the engine never touches the original file format.

use serde::{Deserialize, Serialize};

use crate::attributes::CharProps;

/// A whole document, or the body of a footnote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub paragraphs: Vec<SourceParagraph>,
}

impl SourceDocument {
    pub fn new(paragraphs: Vec<SourceParagraph>) -> Self {
        Self { paragraphs }
    }
}

/// One source paragraph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceParagraph {
    /// Paragraph style name, empty if none
    #[serde(default)]
    pub style: String,

    /// List membership, `None` for ordinary paragraphs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<ListInfo>,

    #[serde(default)]
    pub portions: Vec<Portion>,
}

impl SourceParagraph {
    /// Create an empty paragraph with the given style name
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            list: None,
            portions: Vec::new(),
        }
    }

    /// Mark the paragraph as a list item
    pub fn with_list(mut self, level: u32, numbered: bool) -> Self {
        self.list = Some(ListInfo::new(level, numbered));
        self
    }

    /// Append a text run
    pub fn with_run(mut self, run: SourceRun) -> Self {
        self.portions.push(Portion::Text(run));
        self
    }

    /// Append any portion
    pub fn with_portion(mut self, portion: Portion) -> Self {
        self.portions.push(portion);
        self
    }

    /// Concatenated text of all text runs
    pub fn plain_text(&self) -> String {
        self.portions
            .iter()
            .filter_map(|p| match p {
                Portion::Text(run) => Some(run.text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// List metadata of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInfo {
    /// Nesting level, 1 for top-level items
    pub level: u32,
    /// Numbered (`#`) or bulleted (`*`) list
    pub numbered: bool,
}

impl ListInfo {
    /// Levels below 1 are clamped to 1
    pub fn new(level: u32, numbered: bool) -> Self {
        Self {
            level: level.max(1),
            numbered,
        }
    }
}

/// One element of a paragraph's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Portion {
    /// Formatted text
    Text(SourceRun),
    /// A footnote reference with its body
    Footnote(Footnote),
    /// Content the converter cannot represent (images, embedded objects)
    Unsupported { kind: String },
}

/// A run of text with absolute formatting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRun {
    pub text: String,

    /// Character style name, empty if none
    #[serde(default)]
    pub char_style: String,

    /// Absolute (fully inherited) character properties
    #[serde(default)]
    pub props: CharProps,

    /// Hyperlink target, if the run is part of a link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
}

impl SourceRun {
    /// A run with baseline properties and no character style
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_props(mut self, props: CharProps) -> Self {
        self.props = props;
        self
    }

    pub fn with_char_style(mut self, style: impl Into<String>) -> Self {
        self.char_style = style.into();
        self
    }

    pub fn with_hyperlink(mut self, target: impl Into<String>) -> Self {
        self.hyperlink = Some(target.into());
        self
    }
}

/// A footnote (or endnote) reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footnote {
    /// Reference mark as shown in the text
    #[serde(default)]
    pub caption: String,
    /// Footnote body, converted recursively
    #[serde(default)]
    pub paragraphs: Vec<SourceParagraph>,
}

impl Footnote {
    pub fn new(caption: impl Into<String>, paragraphs: Vec<SourceParagraph>) -> Self {
        Self {
            caption: caption.into(),
            paragraphs,
        }
    }
}
