//! Story parsing (word/document.xml, word/footnotes.xml, word/endnotes.xml)
//!
//! Turns WordprocessingML paragraphs into [`SourceParagraph`]s with absolute
//! run properties. Content the wikitext output cannot carry (tables,
//! drawings, embedded objects) becomes [`Portion::Unsupported`] so the
//! converter can report it.

use std::collections::HashMap;
use std::mem;

use docwiki_core::{Footnote, Portion, SourceParagraph, SourceRun};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::error::{OoxmlError, Result};
use crate::numbering::{Numbering, NumberingRef};
use crate::relationships::Relationships;
use crate::run_props::RunPropsPatch;
use crate::styles::StyleSheet;
use crate::xml::get_attr_with_ns;

/// Footnote or endnote bodies keyed by `w:id`
pub type NoteBodies = HashMap<String, Vec<SourceParagraph>>;

/// Everything a story needs to resolve references
#[derive(Debug, Clone, Copy)]
pub struct StoryContext<'a> {
    pub styles: &'a StyleSheet,
    pub numbering: &'a Numbering,
    /// Relationships of the part being parsed
    pub relationships: &'a Relationships,
    pub footnotes: &'a NoteBodies,
    pub endnotes: &'a NoteBodies,
}

/// Parse the paragraphs of the main document body
pub fn parse_body(xml: &[u8], ctx: StoryContext<'_>) -> Result<Vec<SourceParagraph>> {
    let mut parser = StoryParser::new(ctx, false);
    parser.parse(xml)?;
    Ok(parser.paragraphs)
}

/// Parse a footnotes or endnotes part into note bodies. Separator notes
/// are skipped.
pub fn parse_notes(xml: &[u8], ctx: StoryContext<'_>) -> Result<NoteBodies> {
    let mut parser = StoryParser::new(ctx, true);
    parser.parse(xml)?;
    Ok(parser.notes)
}

#[derive(Debug, Default)]
struct ParagraphState {
    style_id: Option<String>,
    num_id: Option<String>,
    level: Option<u8>,
    portions: Vec<Portion>,
}

#[derive(Debug, Default)]
struct RunState {
    style_id: Option<String>,
    direct: RunPropsPatch,
    text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteKind {
    Footnote,
    Endnote,
}

struct StoryParser<'a> {
    ctx: StoryContext<'a>,
    collect_notes: bool,
    depth: usize,
    /// Events are ignored until the element opened at this depth closes
    skip_at: Option<usize>,
    paragraphs: Vec<SourceParagraph>,
    notes: NoteBodies,
    note_id: Option<String>,
    paragraph: Option<ParagraphState>,
    run: Option<RunState>,
    hyperlink: Option<String>,
    in_ppr: bool,
    in_num_pr: bool,
    in_rpr: bool,
    in_text: bool,
    footnote_count: usize,
    endnote_count: usize,
}

impl<'a> StoryParser<'a> {
    fn new(ctx: StoryContext<'a>, collect_notes: bool) -> Self {
        Self {
            ctx,
            collect_notes,
            depth: 0,
            skip_at: None,
            paragraphs: Vec::new(),
            notes: NoteBodies::new(),
            note_id: None,
            paragraph: None,
            run: None,
            hyperlink: None,
            in_ppr: false,
            in_num_pr: false,
            in_rpr: false,
            in_text: false,
            footnote_count: 0,
            endnote_count: 0,
        }
    }

    fn parse(&mut self, xml: &[u8]) -> Result<()> {
        let mut reader = Reader::from_reader(xml);
        // Don't trim text - preserve whitespace in runs
        reader.config_mut().trim_text(false);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    self.depth += 1;
                    if self.skip_at.is_none() {
                        self.start(e, false);
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if self.skip_at.is_none() {
                        self.depth += 1;
                        self.start(e, true);
                        if self.skip_at == Some(self.depth) {
                            self.skip_at = None;
                        } else {
                            self.end(e.local_name().as_ref());
                        }
                        self.depth -= 1;
                    }
                }
                Ok(Event::End(ref e)) => {
                    match self.skip_at {
                        Some(at) if at == self.depth => self.skip_at = None,
                        Some(_) => {}
                        None => self.end(e.local_name().as_ref()),
                    }
                    self.depth = self.depth.saturating_sub(1);
                }
                Ok(Event::Text(ref e)) => {
                    if self.skip_at.is_none() && self.in_text {
                        if let Some(run) = self.run.as_mut() {
                            run.text.push_str(&e.unescape()?);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if self.depth != 0 {
            return Err(OoxmlError::InvalidStructure(
                "unexpected end of story part".to_string(),
            ));
        }
        Ok(())
    }

    fn skip(&mut self) {
        self.skip_at = Some(self.depth);
    }

    fn start(&mut self, e: &BytesStart, is_empty: bool) {
        let name = e.local_name();
        match name.as_ref() {
            b"footnote" | b"endnote" if self.collect_notes => {
                let separator = matches!(
                    get_attr_with_ns(e, b"w:type").as_deref(),
                    Some("separator") | Some("continuationSeparator") | Some("continuationNotice")
                );
                match get_attr_with_ns(e, b"w:id") {
                    Some(id) if !separator => {
                        self.paragraphs.clear();
                        self.note_id = Some(id);
                    }
                    _ => self.skip(),
                }
            }
            // Deleted text, fallback renderings, tracked-change history
            b"del" | b"Fallback" | b"rPrChange" | b"pPrChange" => {
                if !is_empty {
                    self.skip();
                }
            }
            b"tbl" if self.paragraph.is_none() => {
                debug!("table replaced by placeholder");
                let style = self.paragraph_style_name(None);
                self.paragraphs.push(SourceParagraph::new(style).with_portion(
                    Portion::Unsupported {
                        kind: "table".to_string(),
                    },
                ));
                self.skip();
            }
            b"p" => {
                self.paragraph = Some(ParagraphState::default());
            }
            b"pPr" if self.run.is_none() => self.in_ppr = true,
            b"pStyle" if self.in_ppr => {
                if let Some(para) = self.paragraph.as_mut() {
                    para.style_id = get_attr_with_ns(e, b"w:val");
                }
            }
            b"numPr" if self.in_ppr => self.in_num_pr = true,
            b"numId" if self.in_num_pr => {
                if let Some(para) = self.paragraph.as_mut() {
                    para.num_id = get_attr_with_ns(e, b"w:val");
                }
            }
            b"ilvl" if self.in_num_pr => {
                if let Some(para) = self.paragraph.as_mut() {
                    para.level = get_attr_with_ns(e, b"w:val").and_then(|v| v.parse().ok());
                }
            }
            // paragraph mark formatting and tab stops are not run content
            _ if self.in_ppr => {}
            b"hyperlink" => {
                self.hyperlink = self.hyperlink_target(e);
            }
            b"r" if self.paragraph.is_some() => {
                self.run = Some(RunState::default());
            }
            b"rPr" if self.run.is_some() => self.in_rpr = true,
            b"rStyle" if self.in_rpr => {
                if let Some(run) = self.run.as_mut() {
                    run.style_id = get_attr_with_ns(e, b"w:val");
                }
            }
            _ if self.in_rpr => {
                if let Some(run) = self.run.as_mut() {
                    run.direct.apply_element(e);
                }
            }
            b"drawing" | b"pict" | b"object" => {
                if self.paragraph.is_some() {
                    let kind = String::from_utf8_lossy(name.as_ref()).into_owned();
                    self.push_portion(Portion::Unsupported { kind });
                }
                if !is_empty {
                    self.skip();
                }
            }
            b"t" if self.run.is_some() => self.in_text = !is_empty,
            b"tab" => self.push_text("\t"),
            b"br" | b"cr" => {
                let kind = get_attr_with_ns(e, b"w:type");
                if matches!(kind.as_deref(), Some("page") | Some("column")) {
                    debug!("dropped {} break", kind.as_deref().unwrap_or_default());
                } else {
                    self.push_text("<br />");
                }
            }
            b"noBreakHyphen" => self.push_text("\u{2011}"),
            b"footnoteReference" => self.note_reference(e, NoteKind::Footnote),
            b"endnoteReference" => self.note_reference(e, NoteKind::Endnote),
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"footnote" | b"endnote" if self.collect_notes => {
                if let Some(id) = self.note_id.take() {
                    self.notes.insert(id, mem::take(&mut self.paragraphs));
                }
            }
            b"pPr" => self.in_ppr = false,
            b"numPr" => self.in_num_pr = false,
            b"rPr" => self.in_rpr = false,
            b"t" => self.in_text = false,
            b"r" => {
                self.flush_text();
                self.run = None;
            }
            b"hyperlink" => self.hyperlink = None,
            b"p" => self.finish_paragraph(),
            _ => {}
        }
    }

    fn hyperlink_target(&self, e: &BytesStart) -> Option<String> {
        let anchor = get_attr_with_ns(e, b"w:anchor");
        let target = match get_attr_with_ns(e, b"r:id") {
            Some(id) => match self.ctx.relationships.target(&id) {
                Some(target) => Some(target.to_string()),
                None => {
                    warn!("hyperlink relationship {} not found", id);
                    None
                }
            },
            None => None,
        };
        match (target, anchor) {
            (Some(target), Some(anchor)) => Some(format!("{}#{}", target, anchor)),
            (Some(target), None) => Some(target),
            (None, Some(anchor)) => Some(format!("#{}", anchor)),
            (None, None) => None,
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    /// Push non-text content, keeping it after the run text seen so far
    fn push_portion(&mut self, portion: Portion) {
        self.flush_text();
        if let Some(para) = self.paragraph.as_mut() {
            para.portions.push(portion);
        }
    }

    fn flush_text(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        if run.text.is_empty() {
            return;
        }
        let text = mem::take(&mut run.text);
        let Some(para) = self.paragraph.as_mut() else {
            return;
        };

        let styles = self.ctx.styles;
        let props = styles.run_props(
            para.style_id.as_deref(),
            run.style_id.as_deref(),
            &run.direct,
        );
        let mut source = SourceRun::new(text).with_props(props);
        if let Some(id) = run.style_id.as_deref() {
            source = source.with_char_style(styles.display_name(id));
        }
        if let Some(target) = &self.hyperlink {
            source = source.with_hyperlink(target.clone());
        }
        para.portions.push(Portion::Text(source));
    }

    fn note_reference(&mut self, e: &BytesStart, kind: NoteKind) {
        let Some(id) = get_attr_with_ns(e, b"w:id") else {
            return;
        };
        let (bodies, caption) = match kind {
            NoteKind::Footnote => {
                self.footnote_count += 1;
                (self.ctx.footnotes, self.footnote_count.to_string())
            }
            NoteKind::Endnote => {
                self.endnote_count += 1;
                (self.ctx.endnotes, roman(self.endnote_count))
            }
        };
        let portion = match bodies.get(&id) {
            Some(paragraphs) => Portion::Footnote(Footnote::new(caption, paragraphs.clone())),
            None => {
                warn!("{:?} {} has no body", kind, id);
                Portion::Unsupported {
                    kind: format!("{:?} without body", kind).to_lowercase(),
                }
            }
        };
        self.push_portion(portion);
    }

    fn paragraph_style_name(&self, style_id: Option<&str>) -> String {
        let styles = self.ctx.styles;
        style_id
            .or(styles.default_paragraph.as_deref())
            .map(|id| styles.display_name(id).to_string())
            .unwrap_or_default()
    }

    fn finish_paragraph(&mut self) {
        self.flush_text();
        self.run = None;
        let Some(state) = self.paragraph.take() else {
            return;
        };

        let style = self.paragraph_style_name(state.style_id.as_deref());
        let mut paragraph = SourceParagraph::new(style);
        paragraph.portions = state.portions;

        let inherited = state
            .style_id
            .as_deref()
            .or(self.ctx.styles.default_paragraph.as_deref())
            .and_then(|id| self.ctx.styles.numbering_of(id));
        let numbering = NumberingRef {
            num_id: state
                .num_id
                .or_else(|| inherited.map(|n| n.num_id.clone()))
                .unwrap_or_default(),
            level: state
                .level
                .or_else(|| inherited.map(|n| n.level))
                .unwrap_or(0),
        };
        if numbering.is_list() {
            let numbered = self
                .ctx
                .numbering
                .is_numbered(&numbering.num_id, numbering.level);
            paragraph = paragraph.with_list(u32::from(numbering.level) + 1, numbered);
        }

        self.paragraphs.push(paragraph);
    }
}

/// Lower-case roman numeral, the default endnote numbering
fn roman(mut n: usize) -> String {
    const NUMERALS: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}
