//! Paragraph model and run compaction

use serde::Serialize;
use tracing::trace;

use crate::run::Run;
use crate::source::ListInfo;

/// A converted paragraph: target style, compacted runs, list metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    named_style: Option<String>,
    runs: Vec<Run>,
    list: Option<ListInfo>,
}

impl Paragraph {
    pub fn new(named_style: Option<String>) -> Self {
        Self {
            named_style,
            runs: Vec::new(),
            list: None,
        }
    }

    pub fn with_list(mut self, list: Option<ListInfo>) -> Self {
        self.list = list;
        self
    }

    /// Append a run, merging it into the last run when both are formatted
    /// the same. Empty runs are rejected.
    ///
    /// ```
    /// use docwiki_core::{Paragraph, Run};
    ///
    /// let mut para = Paragraph::new(None);
    /// para.add_run(Run::plain("Foo"));
    /// para.add_run(Run::plain("Bar"));
    /// assert_eq!(para.runs().len(), 1);
    /// assert_eq!(para.runs()[0].text(), "FooBar");
    /// ```
    pub fn add_run(&mut self, run: Run) {
        if run.is_empty() {
            trace!("rejecting empty run");
            return;
        }
        match self.runs.last_mut() {
            Some(last) if last.has_same_formatting(&run) => {
                trace!(into = last.text(), text = run.text(), "merging run");
                last.append_text(run.text());
            }
            _ => self.runs.push(run),
        }
    }

    /// Append rendered footnote markup to the last run.
    ///
    /// Returns `false`, leaving the paragraph untouched, when there is no
    /// run to attach it to.
    pub fn append_footnote(&mut self, reference: &str) -> bool {
        match self.runs.last_mut() {
            Some(last) => {
                last.append_text(reference);
                true
            }
            None => false,
        }
    }

    pub fn named_style(&self) -> Option<&str> {
        self.named_style.as_deref()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn is_list_item(&self) -> bool {
        self.list.is_some()
    }

    /// Nesting level, 1 for top-level items and ordinary paragraphs
    pub fn list_level(&self) -> u32 {
        self.list.map(|l| l.level).unwrap_or(1)
    }

    pub fn is_numbered(&self) -> bool {
        self.list.map(|l| l.numbered).unwrap_or(false)
    }
}
