//! End-to-end conversion scenarios
//!
//! These tests drive the whole pipeline (resolver, compactor, renderer,
//! assembler) through the public API.

use docwiki_core::{
    AttributeValue, CharProps, Color, ConversionDiagnostics, Converter, FontWeight, Footnote,
    MarkupRenderer, MappedStyle, Paragraph, Portion, Posture, Run, SourceDocument,
    SourceParagraph, SourceRun, Strikeout, StyleNameMap, StyleTable, Underline, WikiRenderer,
};

fn styles() -> StyleTable {
    StyleTable::new()
        .with_paragraph_style("Standard", CharProps::default())
        .with_paragraph_style("quote", CharProps::default())
        .with_paragraph_style(
            "Warning",
            CharProps::default()
                .bold()
                .with(AttributeValue::FontColor(Color::Rgb(0xCC0000))),
        )
        .with_character_style("Emphasis", CharProps::default().italic())
        .with_character_style("Link", CharProps::default().with(AttributeValue::Underline(Underline::Single)))
}

fn convert_with(doc: &SourceDocument, names: &StyleNameMap) -> String {
    let styles = styles();
    Converter::new(&styles, names, &WikiRenderer).convert(doc).text
}

fn convert(doc: &SourceDocument) -> String {
    convert_with(doc, &StyleNameMap::new())
}

fn single(style: &str, runs: Vec<SourceRun>) -> SourceDocument {
    let paragraph = runs
        .into_iter()
        .fold(SourceParagraph::new(style), |p, r| p.with_run(r));
    SourceDocument::new(vec![paragraph])
}

#[test]
fn scenario_bold_in_standard_paragraph() {
    let doc = single(
        "Standard",
        vec![SourceRun::new("Hello").with_props(CharProps::default().bold())],
    );
    assert_eq!(convert(&doc), "'''Hello'''");
}

#[test]
fn scenario_mapped_paragraph_style() {
    let names = StyleNameMap::new().with_mapping("quote", "myns:quote");
    let doc = single("quote", vec![SourceRun::new("Hi")]);
    assert_eq!(convert_with(&doc, &names), "{{myns:quote|Hi}}");
}

#[test]
fn scenario_adjacent_italic_runs_merge() {
    let italic = CharProps::default().italic();
    let doc = single(
        "Standard",
        vec![
            SourceRun::new("Foo").with_props(italic),
            SourceRun::new("Bar").with_props(italic),
        ],
    );
    assert_eq!(convert(&doc), "''FooBar''");
}

#[test]
fn scenario_autolink() {
    let doc = single(
        "Standard",
        vec![SourceRun::new("http://x").with_hyperlink("http://x")],
    );
    assert_eq!(convert(&doc), "[http://x]");
}

#[test]
fn scenario_strikeout_and_color() {
    let props = CharProps::default()
        .with(AttributeValue::Strikeout(Strikeout::Double))
        .with(AttributeValue::FontColor(Color::Rgb(0xFF0000)));
    let doc = single("Standard", vec![SourceRun::new("old").with_props(props)]);
    assert_eq!(
        convert(&doc),
        "{{#tag:span|<span style=\"color:#FF0000;text-decoration:line-through;text-decoration-style:double;\">old</span>}}"
    );
}

#[test]
fn paragraph_style_values_never_rendered() {
    // Run carries exactly what the Warning style implies
    let props = CharProps::default()
        .bold()
        .with(AttributeValue::FontColor(Color::Rgb(0xCC0000)));
    let names = StyleNameMap::new().with_mapping("Warning", "warn");
    let doc = single("Warning", vec![SourceRun::new("Careful").with_props(props)]);
    let out = convert_with(&doc, &names);
    assert_eq!(out, "{{warn|Careful}}");
    assert!(!out.contains("'''"));
    assert!(!out.contains("color"));
}

#[test]
fn merging_is_invisible_in_output() {
    let cases = [
        CharProps::default(),
        CharProps::default().bold(),
        CharProps::default().bold().italic(),
        CharProps::default().with(AttributeValue::Underline(Underline::Wave)),
        CharProps::default()
            .with(AttributeValue::Escapement(-33))
            .with(AttributeValue::FontColor(Color::Rgb(0x336699))),
    ];
    for props in cases {
        let split = single(
            "Standard",
            vec![
                SourceRun::new("Foo").with_props(props),
                SourceRun::new("Bar").with_props(props),
            ],
        );
        let joined = single(
            "Standard",
            vec![SourceRun::new("FooBar").with_props(props)],
        );
        assert_eq!(convert(&split), convert(&joined), "props: {:?}", props);
    }
}

#[test]
fn one_attribute_difference_keeps_spans_apart() {
    let red = CharProps::default().with(AttributeValue::FontColor(Color::Rgb(0xFF0000)));
    let blue = CharProps::default().with(AttributeValue::FontColor(Color::Rgb(0x0000FF)));
    let doc = single(
        "Standard",
        vec![
            SourceRun::new("red").with_props(red),
            SourceRun::new("blue").with_props(blue),
        ],
    );
    let out = convert(&doc);
    assert_eq!(out.matches("{{#tag:span|").count(), 2);
    assert!(out.contains("color:#FF0000;\">red</span>}}"));
    assert!(out.contains("color:#0000FF;\">blue</span>}}"));

    let doc = single(
        "Standard",
        vec![
            SourceRun::new("a").with_props(CharProps::default().bold()),
            SourceRun::new("b").with_props(CharProps::default().bold().italic()),
        ],
    );
    assert_eq!(convert(&doc), "'''a'''<nowiki/>'''''b'''''");
}

#[test]
fn template_content_with_pipes_and_equals() {
    let names = StyleNameMap::new().with_mapping("quote", "myns:quote");
    let doc = single("quote", vec![SourceRun::new("E = mc2 | x")]);
    assert_eq!(
        convert_with(&doc, &names),
        "{{myns:quote|1=E = mc2 {{!}} x}}"
    );
}

#[test]
fn baseline_run_inside_superscript_style() {
    let raised = CharProps::default().with(AttributeValue::Escapement(33));
    let styles = StyleTable::new().with_paragraph_style("Exponent", raised);
    let names = StyleNameMap::new().with_mapping("Exponent", "sup");
    let doc = single(
        "Exponent",
        vec![
            SourceRun::new("n").with_props(raised),
            SourceRun::new("0"),
        ],
    );
    let result = Converter::new(&styles, &names, &WikiRenderer).convert(&doc);
    assert_eq!(
        result.text,
        "{{sup|n{{#tag:span|<span style=\"vertical-align:baseline;\">0</span>}}}}"
    );
    assert_eq!(result.diagnostics.warning_count(), 0);
}

#[test]
fn hyperlink_absorbs_underline_and_color() {
    let props = CharProps::default()
        .with(AttributeValue::Underline(Underline::Single))
        .with(AttributeValue::FontColor(Color::Rgb(0x0000FF)));
    let doc = single(
        "Standard",
        vec![SourceRun::new("the docs")
            .with_props(props)
            .with_hyperlink("https://example.org/docs")],
    );
    assert_eq!(convert(&doc), "[https://example.org/docs the docs]");
}

#[test]
fn list_prefixes() {
    let doc = SourceDocument::new(vec![
        SourceParagraph::new("Standard")
            .with_list(1, false)
            .with_run(SourceRun::new("bullet")),
        SourceParagraph::new("Standard")
            .with_list(2, true)
            .with_run(SourceRun::new("numbered")),
    ]);
    assert_eq!(convert(&doc), "* bullet\n## numbered");
    assert_eq!(WikiRenderer.list_prefix(2, true), "## ");
    assert_eq!(WikiRenderer.list_prefix(1, false), "* ");
}

#[test]
fn style_wrapping_identities() {
    assert_eq!(WikiRenderer.wrap_styled(None, "content"), "content");
    assert_eq!(WikiRenderer.wrap_styled(Some("x"), ""), "");
}

#[test]
fn character_style_precedence_over_paragraph_style() {
    // Italic is set on the Emphasis character style; the quote paragraph is
    // upright. The character style wins and nothing is emitted.
    let doc = single(
        "quote",
        vec![SourceRun::new("word")
            .with_char_style("Emphasis")
            .with_props(CharProps::default().italic())],
    );
    let names = StyleNameMap::new()
        .with_mapping("quote", "q")
        .with_mapping("Emphasis", "");
    assert_eq!(convert_with(&doc, &names), "{{q|word}}");

    // Same run without the character style: the paragraph style decides and
    // italic is emitted explicitly.
    let doc = single(
        "quote",
        vec![SourceRun::new("word").with_props(CharProps::default().italic())],
    );
    assert_eq!(convert_with(&doc, &names), "{{q|''word''}}");
}

#[test]
fn grouped_paragraphs_and_footnotes() {
    let note = Footnote::new(
        "1",
        vec![SourceParagraph::new("Standard").with_run(SourceRun::new("Source: archive."))],
    );
    let doc = SourceDocument::new(vec![
        SourceParagraph::new("quote").with_run(SourceRun::new("First line")),
        SourceParagraph::new("quote").with_run(SourceRun::new("")),
        SourceParagraph::new("quote")
            .with_run(SourceRun::new("Second line"))
            .with_portion(Portion::Footnote(note)),
        SourceParagraph::new("Standard").with_run(SourceRun::new("After")),
    ]);
    let names = StyleNameMap::new().with_mapping("quote", "myns:quote");
    assert_eq!(
        convert_with(&doc, &names),
        "{{myns:quote|First line\n\nSecond line<ref>Source: archive.</ref>}}\n\nAfter\n\n<references />"
    );
}

#[test]
fn closure_name_mapper() {
    let styles = styles();
    let names = |name: &str| match name {
        "" | "Standard" => MappedStyle::Unstyled,
        other => MappedStyle::Mapped(format!("ns:{}", other.to_lowercase())),
    };
    let doc = single("quote", vec![SourceRun::new("Hi")]);
    let result = Converter::new(&styles, &names, &WikiRenderer).convert(&doc);
    assert_eq!(result.text, "{{ns:quote|Hi}}");
    assert!(result.diagnostics.missing_styles().is_empty());
}

#[test]
fn compactor_and_renderer_directly() {
    let bold = |text: &str| {
        Run::new(
            text,
            None,
            [AttributeValue::Bold(FontWeight::BOLD)].into_iter().collect(),
        )
    };
    let mut paragraph = Paragraph::new(Some("box".into()));
    paragraph.add_run(bold("a"));
    paragraph.add_run(bold("b"));
    paragraph.add_run(Run::new(
        "c",
        None,
        [AttributeValue::Italic(Posture::Italic)].into_iter().collect(),
    ));
    assert_eq!(paragraph.runs().len(), 2);

    let mut diagnostics = ConversionDiagnostics::new();
    assert_eq!(
        WikiRenderer.render_paragraph(&paragraph, &mut diagnostics),
        "'''ab'''<nowiki/>''c''"
    );
    assert!(diagnostics.is_empty());
}
