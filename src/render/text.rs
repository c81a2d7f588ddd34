//! Plain text preview of rendered documents.

use crate::model::{BlockKind, RenderedDocument};

/// Convert a rendered document to a plain text preview.
///
/// Headings are followed by a blank line, list items are indented two
/// spaces per level and prefixed with their glyph, and separators become a
/// dashed rule. Deduced runs are wrapped in `[~ ~]` when `mark_inferred`
/// is set so provenance stays visible without color.
pub fn to_text(doc: &RenderedDocument, mark_inferred: bool) -> String {
    let mut output = String::new();

    for block in &doc.blocks {
        match block.kind {
            BlockKind::Heading => {
                output.push('\n');
                output.push_str(&runs_text(&block.runs, mark_inferred));
                output.push('\n');
            }
            BlockKind::Paragraph => {
                output.push_str(&runs_text(&block.runs, mark_inferred));
                output.push('\n');
            }
            BlockKind::BulletedList => {
                for item in &block.items {
                    let indent = "  ".repeat(item.level.max(1) as usize);
                    output.push_str(&indent);
                    output.push_str(&item.glyph);
                    output.push(' ');
                    output.push_str(&runs_text(&item.runs, mark_inferred));
                    output.push('\n');
                }
            }
            BlockKind::Separator => {
                output.push_str(&"-".repeat(40));
                output.push('\n');
            }
        }
    }

    output.trim().to_string()
}

fn runs_text(runs: &[crate::model::Run], mark_inferred: bool) -> String {
    let mut text = String::new();
    for run in runs {
        if mark_inferred && run.inferred {
            text.push_str("[~");
            text.push_str(&run.text);
            text.push_str("~]");
        } else {
            text.push_str(&run.text);
        }
    }
    text
}
