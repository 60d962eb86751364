//! Document assembly
//!
//! Joins rendered paragraphs into the final text. Consecutive paragraphs
//! with the same target style share one style block; list items get their
//! prefix bound to the start of their own line.

use tracing::{debug, trace};

use crate::diagnostics::ConversionDiagnostics;
use crate::paragraph::Paragraph;
use crate::render::MarkupRenderer;

/// Render and join paragraphs into one document
///
/// With `with_references`, the renderer's references marker is appended
/// as a final block.
pub fn assemble_document<R: MarkupRenderer + ?Sized>(
    paragraphs: &[Paragraph],
    renderer: &R,
    with_references: bool,
    diagnostics: &mut ConversionDiagnostics,
) -> String {
    let separator = renderer.block_separator();
    let mut blocks: Vec<String> = Vec::new();

    let mut paragraphs = paragraphs
        .iter()
        .enumerate()
        .filter(|(index, p)| {
            if p.is_empty() {
                trace!(index, "skipping empty paragraph");
            }
            !p.is_empty()
        })
        .map(|(_, p)| p)
        .peekable();

    if let Some(&first) = paragraphs.peek() {
        let mut current_style = first.named_style();
        let mut buffer = String::new();

        for paragraph in paragraphs {
            if paragraph.named_style() != current_style {
                flush(&mut blocks, &mut buffer, current_style, renderer);
                current_style = paragraph.named_style();
            }

            if paragraph.is_list_item() {
                // Drop one line break so the marker starts the item's own line
                if buffer.ends_with('\n') {
                    buffer.pop();
                }
                let prefix = renderer.list_prefix(paragraph.list_level(), paragraph.is_numbered());
                buffer.push_str(&prefix);
            }

            buffer.push_str(&renderer.render_paragraph(paragraph, diagnostics));
            buffer.push_str(separator);
        }

        flush(&mut blocks, &mut buffer, current_style, renderer);
    }

    if with_references {
        blocks.push(renderer.references().to_string());
    }

    debug!(blocks = blocks.len(), "assembled document");
    blocks.join(separator)
}

fn flush<R: MarkupRenderer + ?Sized>(
    blocks: &mut Vec<String>,
    buffer: &mut String,
    style: Option<&str>,
    renderer: &R,
) {
    let separator = renderer.block_separator();
    let content = buffer.strip_suffix(separator).unwrap_or(buffer.as_str());
    blocks.push(renderer.wrap_styled(style, content));
    buffer.clear();
}
