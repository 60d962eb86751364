//! Style definitions parsing (word/styles.xml)
//!
//! Parses the style table and document defaults and computes effective
//! character properties along `w:basedOn` chains. [`StyleSheet`] is the
//! [`StyleResolutionContext`] the converter resolves DOCX runs against.

use std::collections::{HashMap, HashSet};

use docwiki_core::{CharProps, StyleFamily, StyleResolutionContext};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};
use crate::numbering::NumberingRef;
use crate::run_props::RunPropsPatch;
use crate::xml::get_attr_with_ns;

/// Collection of styles from a document
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    /// All styles, keyed by style ID
    styles: HashMap<String, Style>,
    /// Style IDs keyed by type and display name
    names: HashMap<(StyleType, String), String>,
    /// Run properties from `w:docDefaults`
    defaults: RunPropsPatch,
    /// Default paragraph style ID
    pub default_paragraph: Option<String>,
}

/// A Word style definition
#[derive(Debug, Clone)]
pub struct Style {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: String,
    /// Style type
    pub style_type: StyleType,
    /// Base style ID (for inheritance)
    pub based_on: Option<String>,
    /// Character properties the style itself sets
    pub run_props: RunPropsPatch,
    /// List numbering attached to a paragraph style
    pub numbering: Option<NumberingRef>,
}

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleType {
    /// Paragraph style
    Paragraph,
    /// Character (run) style
    Character,
    /// Table style
    Table,
    /// Numbering style
    Numbering,
}

impl From<StyleFamily> for StyleType {
    fn from(family: StyleFamily) -> Self {
        match family {
            StyleFamily::Paragraph => StyleType::Paragraph,
            StyleFamily::Character => StyleType::Character,
        }
    }
}

/// Where `w:rPr` children currently go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPropsTarget {
    None,
    Defaults,
    Style,
}

impl StyleSheet {
    /// Parse styles from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut stylesheet = StyleSheet::default();
        let mut buf = Vec::new();
        let mut current_style: Option<StyleBuilder> = None;
        let mut in_rpr_default = false;
        // conditional table formatting has its own rPr
        let mut in_table_condition = false;
        let mut in_num_pr = false;
        let mut target = RunPropsTarget::None;

        loop {
            let event = reader.read_event_into(&mut buf);
            match event {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let is_empty = matches!(event, Ok(Event::Empty(_)));
                    let name = e.local_name();
                    match name.as_ref() {
                        b"rPrDefault" => in_rpr_default = true,
                        b"rPr" if in_rpr_default && current_style.is_none() => {
                            target = RunPropsTarget::Defaults;
                        }
                        b"rPr" if current_style.is_some() && !in_table_condition => {
                            target = RunPropsTarget::Style;
                        }
                        b"tblStylePr" => in_table_condition = true,
                        b"style" => {
                            let mut builder = StyleBuilder::default();

                            if let Some(t) = get_attr_with_ns(e, b"w:type") {
                                builder.style_type = Some(match t.as_str() {
                                    "paragraph" => StyleType::Paragraph,
                                    "character" => StyleType::Character,
                                    "table" => StyleType::Table,
                                    "numbering" => StyleType::Numbering,
                                    _ => StyleType::Paragraph,
                                });
                            }
                            builder.id = get_attr_with_ns(e, b"w:styleId");
                            builder.is_default = matches!(
                                get_attr_with_ns(e, b"w:default").as_deref(),
                                Some("1") | Some("true")
                            );

                            current_style = Some(builder);
                        }
                        b"name" if target == RunPropsTarget::None => {
                            if let (Some(builder), Some(val)) =
                                (current_style.as_mut(), get_attr_with_ns(e, b"w:val"))
                            {
                                builder.name = Some(val);
                            }
                        }
                        b"basedOn" => {
                            if let (Some(builder), Some(val)) =
                                (current_style.as_mut(), get_attr_with_ns(e, b"w:val"))
                            {
                                builder.based_on = Some(val);
                            }
                        }
                        b"numPr" => in_num_pr = true,
                        b"numId" if in_num_pr => {
                            if let (Some(builder), Some(val)) =
                                (current_style.as_mut(), get_attr_with_ns(e, b"w:val"))
                            {
                                builder.num_id = Some(val);
                            }
                        }
                        b"ilvl" if in_num_pr => {
                            if let (Some(builder), Some(val)) =
                                (current_style.as_mut(), get_attr_with_ns(e, b"w:val"))
                            {
                                builder.num_level = val.parse().ok();
                            }
                        }
                        _ => match target {
                            RunPropsTarget::Defaults => {
                                stylesheet.defaults.apply_element(e);
                            }
                            RunPropsTarget::Style => {
                                if let Some(builder) = current_style.as_mut() {
                                    builder.run_props.apply_element(e);
                                }
                            }
                            RunPropsTarget::None => {}
                        },
                    }
                    // an empty <w:rPr/> or <w:numPr/> closes immediately
                    if is_empty {
                        match name.as_ref() {
                            b"rPr" => target = RunPropsTarget::None,
                            b"numPr" => in_num_pr = false,
                            b"rPrDefault" => in_rpr_default = false,
                            b"tblStylePr" => in_table_condition = false,
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"rPr" => target = RunPropsTarget::None,
                    b"rPrDefault" => in_rpr_default = false,
                    b"tblStylePr" => in_table_condition = false,
                    b"numPr" => in_num_pr = false,
                    b"style" => {
                        if let Some(builder) = current_style.take() {
                            let is_default = builder.is_default;
                            if let Some(style) = builder.build() {
                                if is_default && style.style_type == StyleType::Paragraph {
                                    stylesheet.default_paragraph = Some(style.id.clone());
                                }
                                stylesheet.insert(style);
                            }
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(stylesheet)
    }

    fn insert(&mut self, style: Style) {
        self.names
            .entry((style.style_type, style.name.clone()))
            .or_insert_with(|| style.id.clone());
        self.styles.insert(style.id.clone(), style);
    }

    /// Get a style by ID
    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.get(id)
    }

    /// Get a style by type and display name
    pub fn by_name(&self, style_type: StyleType, name: &str) -> Option<&Style> {
        self.names
            .get(&(style_type, name.to_string()))
            .and_then(|id| self.get(id))
    }

    /// Display name of a style ID; unknown IDs are returned as-is so the
    /// converter can report them as missing
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or(id)
    }

    /// Get all paragraph styles
    pub fn paragraph_styles(&self) -> impl Iterator<Item = &Style> {
        self.styles
            .values()
            .filter(|s| s.style_type == StyleType::Paragraph)
    }

    /// Get all character styles
    pub fn character_styles(&self) -> impl Iterator<Item = &Style> {
        self.styles
            .values()
            .filter(|s| s.style_type == StyleType::Character)
    }

    /// Resolve the full inheritance chain for a style, the style itself first
    pub fn resolve_chain(&self, style_id: &str) -> Vec<&Style> {
        let mut chain = Vec::new();
        let mut current = style_id;
        let mut seen = HashSet::new();

        while let Some(style) = self.get(current) {
            if !seen.insert(&style.id) {
                break; // basedOn cycle
            }
            chain.push(style);
            match style.based_on {
                Some(ref base) => current = base,
                None => break,
            }
        }

        chain
    }

    /// Document-wide baseline from `w:docDefaults`
    pub fn defaults(&self) -> CharProps {
        self.defaults.applied(CharProps::default())
    }

    /// Run properties a style contributes, its bases included
    pub fn chain_props(&self, style_id: &str) -> RunPropsPatch {
        let mut patch = RunPropsPatch::new();
        for style in self.resolve_chain(style_id).iter().rev() {
            patch.merge(&style.run_props);
        }
        patch
    }

    /// Effective character properties of a style
    pub fn effective_props(&self, style_id: &str) -> CharProps {
        self.chain_props(style_id).applied(self.defaults())
    }

    /// Absolute properties of a run: defaults, then the paragraph style
    /// chain, then the character style chain, then direct formatting
    pub fn run_props(
        &self,
        paragraph_style: Option<&str>,
        character_style: Option<&str>,
        direct: &RunPropsPatch,
    ) -> CharProps {
        let mut props = self.defaults();
        if let Some(id) = paragraph_style.or(self.default_paragraph.as_deref()) {
            self.chain_props(id).apply_to(&mut props);
        }
        if let Some(id) = character_style {
            self.chain_props(id).apply_to(&mut props);
        }
        direct.apply_to(&mut props);
        props
    }

    /// List numbering of a paragraph style, inherited along its chain
    pub fn numbering_of(&self, style_id: &str) -> Option<&NumberingRef> {
        self.resolve_chain(style_id)
            .into_iter()
            .find_map(|s| s.numbering.as_ref())
    }

    /// Number of styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether the sheet has no styles
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl StyleResolutionContext for StyleSheet {
    fn style_props(&self, family: StyleFamily, name: &str) -> Option<CharProps> {
        self.by_name(family.into(), name)
            .map(|style| self.effective_props(&style.id))
    }

    fn default_props(&self) -> CharProps {
        self.defaults()
    }
}

#[derive(Default)]
struct StyleBuilder {
    id: Option<String>,
    name: Option<String>,
    style_type: Option<StyleType>,
    based_on: Option<String>,
    run_props: RunPropsPatch,
    num_id: Option<String>,
    num_level: Option<u8>,
    is_default: bool,
}

impl StyleBuilder {
    fn build(self) -> Option<Style> {
        let id = self.id?;
        let numbering = self.num_id.map(|num_id| NumberingRef {
            num_id,
            level: self.num_level.unwrap_or(0),
        });
        Some(Style {
            name: self.name.unwrap_or_else(|| id.clone()),
            id,
            style_type: self.style_type.unwrap_or(StyleType::Paragraph),
            based_on: self.based_on,
            run_props: self.run_props,
            numbering,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docwiki_core::{AttributeKind, AttributeValue, Color, FontWeight, Posture, Underline};

    const STYLES: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
    <w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
        <w:docDefaults>
            <w:rPrDefault>
                <w:rPr><w:rFonts w:ascii="Calibri"/><w:color w:val="222222"/></w:rPr>
            </w:rPrDefault>
            <w:pPrDefault><w:pPr><w:spacing w:after="160"/></w:pPr></w:pPrDefault>
        </w:docDefaults>
        <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
            <w:name w:val="Normal"/>
        </w:style>
        <w:style w:type="paragraph" w:styleId="Heading1">
            <w:name w:val="heading 1"/>
            <w:basedOn w:val="Normal"/>
            <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
            <w:rPr><w:b/><w:color w:val="2F5496"/></w:rPr>
        </w:style>
        <w:style w:type="paragraph" w:styleId="Heading2">
            <w:name w:val="heading 2"/>
            <w:basedOn w:val="Heading1"/>
            <w:rPr><w:i/></w:rPr>
        </w:style>
        <w:style w:type="paragraph" w:styleId="ListBullet">
            <w:name w:val="List Bullet"/>
            <w:basedOn w:val="Normal"/>
            <w:pPr><w:numPr><w:numId w:val="3"/></w:numPr></w:pPr>
        </w:style>
        <w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont">
            <w:name w:val="Default Paragraph Font"/>
        </w:style>
        <w:style w:type="character" w:styleId="Hyperlink">
            <w:name w:val="Hyperlink"/>
            <w:basedOn w:val="DefaultParagraphFont"/>
            <w:rPr><w:color w:val="0563C1"/><w:u w:val="single"/></w:rPr>
        </w:style>
        <w:style w:type="table" w:styleId="TableGrid">
            <w:name w:val="Table Grid"/>
            <w:tblStylePr w:type="firstRow"><w:rPr><w:b/></w:rPr></w:tblStylePr>
        </w:style>
    </w:styles>"#;

    #[test]
    fn test_parse_styles() {
        let styles = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(styles.len(), 7);
        assert_eq!(styles.default_paragraph.as_deref(), Some("Normal"));
        assert_eq!(styles.display_name("Heading1"), "heading 1");
        assert_eq!(styles.display_name("Missing"), "Missing");
        assert_eq!(styles.paragraph_styles().count(), 4);
        assert_eq!(styles.character_styles().count(), 2);
        assert!(styles.get("TableGrid").unwrap().run_props.is_empty());
    }

    #[test]
    fn test_doc_defaults() {
        let styles = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(styles.defaults().color, Color::Rgb(0x222222));
        assert_eq!(styles.effective_props("Normal").color, Color::Rgb(0x222222));
    }

    #[test]
    fn test_effective_props_follow_chain() {
        let styles = StyleSheet::parse(STYLES).unwrap();
        let chain = styles.resolve_chain("Heading2");
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].id, "Heading2");
        assert_eq!(chain[2].id, "Normal");

        let props = styles.effective_props("Heading2");
        assert_eq!(props.weight, FontWeight::BOLD);
        assert_eq!(props.posture, Posture::Italic);
        assert_eq!(props.color, Color::Rgb(0x2F5496));
    }

    #[test]
    fn test_run_props_layering() {
        let styles = StyleSheet::parse(STYLES).unwrap();
        let direct = RunPropsPatch {
            bold: Some(false),
            ..Default::default()
        };
        let props = styles.run_props(Some("Heading1"), Some("Hyperlink"), &direct);
        assert_eq!(props.weight, FontWeight::NORMAL);
        assert_eq!(props.color, Color::Rgb(0x0563C1));
        assert_eq!(props.underline, Underline::Single);

        // no paragraph style means the default one
        let props = styles.run_props(None, None, &RunPropsPatch::new());
        assert_eq!(props, styles.effective_props("Normal"));
    }

    #[test]
    fn test_numbering_from_style() {
        let styles = StyleSheet::parse(STYLES).unwrap();
        let numbering = styles.numbering_of("ListBullet").unwrap();
        assert_eq!(numbering.num_id, "3");
        assert_eq!(numbering.level, 0);
        assert!(styles.numbering_of("Heading1").is_none());
    }

    #[test]
    fn test_resolution_context_by_name() {
        let styles = StyleSheet::parse(STYLES).unwrap();
        assert_eq!(
            styles.style_value(StyleFamily::Paragraph, "heading 1", AttributeKind::Bold),
            Some(Some(AttributeValue::Bold(FontWeight::BOLD)))
        );
        assert!(styles
            .style_props(StyleFamily::Character, "heading 1")
            .is_none());
        assert!(styles
            .style_props(StyleFamily::Character, "Hyperlink")
            .is_some());
        assert_eq!(styles.default_props(), styles.defaults());
    }

    #[test]
    fn test_based_on_cycle() {
        let xml = br#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
            <w:style w:type="paragraph" w:styleId="A"><w:basedOn w:val="B"/><w:rPr><w:b/></w:rPr></w:style>
            <w:style w:type="paragraph" w:styleId="B"><w:basedOn w:val="A"/></w:style>
        </w:styles>"#;
        let styles = StyleSheet::parse(xml).unwrap();
        assert_eq!(styles.resolve_chain("A").len(), 2);
        assert_eq!(styles.effective_props("A").weight, FontWeight::BOLD);
        assert_eq!(styles.display_name("A"), "A");
    }
}
