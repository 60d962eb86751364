//! Integration tests for docwiki CLI
//!
//! These tests run the commands against DOCX files written into a
//! temporary folder.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use docwiki_cli::{
    convert_command, convert_file, default_output_path, expand_inputs, outcome_report,
    style_listing, ConvertOptions, OutputFormat,
};
use docwiki_core::{ConversionSettings, MappedStyle, SETTINGS_FILE_NAME};
use docwiki_ooxml::{read_docx, StyleType};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Title">
    <w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:rPr><w:b/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="CodeBlock">
    <w:name w:val="Code Block"/><w:basedOn w:val="Normal"/>
  </w:style>
  <w:style w:type="character" w:styleId="Emphasis">
    <w:name w:val="Emphasis"/><w:rPr><w:i/></w:rPr>
  </w:style>
</w:styles>"#;

const BODY: &str = r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Release notes</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Now </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>faster</w:t></w:r><w:r><w:t>.</w:t></w:r></w:p>
<w:p><w:pPr><w:pStyle w:val="CodeBlock"/></w:pPr><w:r><w:t>make install</w:t></w:r></w:p>"#;

/// Create a minimal DOCX with the given body
fn create_docx(body: &str) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="xml" ContentType="application/xml"/>
</Types>"#).unwrap();

    zip.start_file("word/styles.xml", options).unwrap();
    zip.write_all(STYLES.as_bytes()).unwrap();

    zip.start_file("word/document.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
        .as_bytes(),
    )
    .unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

fn write_docx(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, create_docx(BODY)).unwrap();
    path
}

fn options() -> ConvertOptions {
    ConvertOptions {
        save_settings: true,
        ..Default::default()
    }
}

#[test]
fn test_convert_writes_wikitext_and_settings() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "notes.docx");

    let outcome = convert_file(&input, &options()).unwrap();

    assert_eq!(outcome.output, temp.path().join("notes.wiki.txt"));
    let text = fs::read_to_string(&outcome.output).unwrap();
    assert_eq!(
        text,
        "{{Title|Release notes}}\n\nNow '''faster'''.\n\n{{Code Block|make install}}"
    );

    // unmapped styles land in docwiki.toml as identity mappings
    assert!(outcome.settings_updated);
    assert_eq!(outcome.settings, temp.path().join(SETTINGS_FILE_NAME));
    let settings = ConversionSettings::load(&outcome.settings).unwrap();
    assert_eq!(settings.styles.get("Title").map(String::as_str), Some("Title"));
    assert_eq!(
        settings.styles.get("Code Block").map(String::as_str),
        Some("Code Block")
    );
}

#[test]
fn test_convert_uses_existing_mappings() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "notes.docx");
    fs::write(
        temp.path().join(SETTINGS_FILE_NAME),
        "[styles]\n\"Title\" = \"wiki:title\"\n\"Code Block\" = \"\"\n",
    )
    .unwrap();

    let outcome = convert_file(&input, &options()).unwrap();
    let text = fs::read_to_string(&outcome.output).unwrap();
    assert_eq!(text, "{{wiki:title|Release notes}}\n\nNow '''faster'''.\n\nmake install");
    assert!(!outcome.settings_updated);
    assert!(outcome.diagnostics.missing_styles().is_empty());
}

#[test]
fn test_convert_refuses_to_overwrite() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "notes.docx");
    let output = default_output_path(&input);
    fs::write(&output, "keep me").unwrap();

    let err = convert_file(&input, &options()).unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

    let forced = ConvertOptions {
        force: true,
        ..options()
    };
    convert_file(&input, &forced).unwrap();
    assert_ne!(fs::read_to_string(&output).unwrap(), "keep me");
}

#[test]
fn test_convert_without_saving_settings() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "notes.docx");
    let explicit = temp.path().join("out.txt");

    let outcome = convert_file(
        &input,
        &ConvertOptions {
            output: Some(explicit.clone()),
            save_settings: false,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(outcome.output, explicit);
    assert!(explicit.exists());
    assert!(!outcome.settings_updated);
    assert!(!temp.path().join(SETTINGS_FILE_NAME).exists());
    assert_eq!(outcome.diagnostics.missing_styles().len(), 2);
}

#[test]
fn test_convert_command_reports_unmapped_styles() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "notes.docx");

    let text_options = ConvertOptions {
        format: OutputFormat::Text,
        ..options()
    };
    let outcomes = convert_command(&[input.display().to_string()], &text_options).unwrap();
    assert_eq!(outcomes.len(), 1);

    let report = outcome_report(&outcomes[0]);
    assert!(report.contains("✓ Written: "));
    assert!(report.contains("Styles without a wiki mapping: 'Code Block', 'Title'\n"));
    assert!(report.contains(&format!(
        "They were added to {}",
        temp.path().join(SETTINGS_FILE_NAME).display()
    )));
}

#[test]
fn test_report_without_missing_styles() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "notes.docx");
    fs::write(
        temp.path().join(SETTINGS_FILE_NAME),
        "[styles]\n\"Title\" = \"wiki:title\"\n\"Code Block\" = \"code\"\n",
    )
    .unwrap();

    let outcome = convert_file(&input, &options()).unwrap();
    let report = outcome_report(&outcome);
    assert!(!report.contains("Styles without a wiki mapping"));
    assert!(report.ends_with("  0 warning(s)\n"));
}

#[test]
fn test_missing_input() {
    let temp = TempDir::new().unwrap();
    let err = convert_file(&temp.path().join("nope.docx"), &options()).unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_not_a_docx() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("plain.docx");
    fs::write(&input, "just text").unwrap();
    let err = convert_file(&input, &options()).unwrap_err();
    assert!(err.to_string().contains("Failed to read DOCX file"));
}

#[test]
fn test_expand_glob_inputs() {
    let temp = TempDir::new().unwrap();
    write_docx(temp.path(), "a.docx");
    write_docx(temp.path(), "b.docx");
    fs::write(temp.path().join("c.txt"), "x").unwrap();

    let pattern = format!("{}/*.docx", temp.path().display());
    let mut inputs = expand_inputs(&[pattern]).unwrap();
    inputs.sort();
    assert_eq!(
        inputs,
        vec![temp.path().join("a.docx"), temp.path().join("b.docx")]
    );

    let none = format!("{}/*.odt", temp.path().display());
    assert!(expand_inputs(&[none]).is_err());

    // plain paths pass through unchecked
    let plain = expand_inputs(&["missing.docx".to_string()]).unwrap();
    assert_eq!(plain, vec![PathBuf::from("missing.docx")]);
}

#[test]
fn test_style_listing() {
    let temp = TempDir::new().unwrap();
    let input = write_docx(temp.path(), "notes.docx");
    let source = read_docx(&input).unwrap();
    let settings = ConversionSettings::from_toml_str("[styles]\n\"Title\" = \"wiki:title\"\n")
        .unwrap();

    let entries = style_listing(&source, &settings.name_map());
    let summary: Vec<(StyleType, &str, &MappedStyle)> = entries
        .iter()
        .map(|e| (e.style_type, e.name.as_str(), &e.mapping))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                StyleType::Paragraph,
                "Code Block",
                &MappedStyle::Unmapped("Code Block".into())
            ),
            (StyleType::Paragraph, "Normal", &MappedStyle::Unstyled),
            (
                StyleType::Paragraph,
                "Title",
                &MappedStyle::Mapped("wiki:title".into())
            ),
            (
                StyleType::Character,
                "Emphasis",
                &MappedStyle::Unmapped("Emphasis".into())
            ),
        ]
    );
}
