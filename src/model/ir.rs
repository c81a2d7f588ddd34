//! Style-annotated intermediate representation produced by generators.
//!
//! The IR is independent of any document-file format: a document writer
//! only has to walk the blocks in order and serialize each run with the
//! emphasis and color it carries.

use super::{Color, Language};
use crate::detect::DocType;
use crate::profile::{FormatCode, FormatProfile};
use serde::{Deserialize, Serialize};

/// Semantic role of a block or run, used by the color policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Document title line
    Title,
    /// Section heading
    SectionHeading,
    /// Budget line (color locked)
    Budget,
    /// Company / employer name
    Company,
    /// Position held
    Position,
    /// Period label
    Period,
    /// Highlighted summary text
    Summary,
    /// Inline label ("Tâches :")
    Label,
    /// Horizontal rule
    Separator,
    /// Running text
    Body,
}

impl Role {
    /// Roles whose color ignores provenance and explicit overrides.
    pub fn is_locked(&self) -> bool {
        matches!(self, Role::Budget)
    }
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Left aligned
    #[default]
    Left,
    /// Centered
    Center,
    /// Justified
    Justify,
}

/// A run of text with uniform emphasis and color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Text content
    pub text: String,
    /// Bold emphasis
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Italic emphasis
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    /// Small capitals
    #[serde(default, skip_serializing_if = "is_false")]
    pub small_caps: bool,
    /// Resolved color
    pub color: Color,
    /// Whether the text is deduced (or a placeholder)
    #[serde(default, skip_serializing_if = "is_false")]
    pub inferred: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Run {
    /// Create a plain run.
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            small_caps: false,
            color,
            inferred: false,
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>, color: Color) -> Self {
        Self::new(text, color).with_bold(true)
    }

    /// Set bold emphasis.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic emphasis.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set small capitals.
    pub fn with_small_caps(mut self, small_caps: bool) -> Self {
        self.small_caps = small_caps;
        self
    }

    /// Set the provenance flag.
    pub fn with_inferred(mut self, inferred: bool) -> Self {
        self.inferred = inferred;
        self
    }
}

/// Block kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    /// Heading line
    Heading,
    /// Paragraph of runs
    Paragraph,
    /// List of bullet items
    BulletedList,
    /// Horizontal rule
    Separator,
}

/// Layout attributes of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Semantic role
    pub role: Role,
    /// Paragraph alignment
    pub alignment: Alignment,
    /// Font size in points
    pub font_size: f32,
    /// Space before in points
    pub space_before: f32,
    /// Space after in points
    pub space_after: f32,
    /// Indentation level (0 = flush)
    pub indent_level: u8,
}

impl BlockStyle {
    /// Style for a role at the given size, left aligned and flush.
    pub fn new(role: Role, font_size: f32) -> Self {
        Self {
            role,
            alignment: Alignment::Left,
            font_size,
            space_before: 0.0,
            space_after: 0.0,
            indent_level: 0,
        }
    }

    /// Set alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set spacing before and after.
    pub fn with_spacing(mut self, before: f32, after: f32) -> Self {
        self.space_before = before;
        self.space_after = after;
        self
    }

    /// Set indentation level.
    pub fn with_indent(mut self, level: u8) -> Self {
        self.indent_level = level;
        self
    }
}

/// One bullet in a bulleted list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Nesting level (1 = top level, 2 = sub-item)
    pub level: u8,
    /// Bullet glyph for this level
    pub glyph: String,
    /// Styled runs
    pub runs: Vec<Run>,
}

impl ListItem {
    /// Plain text of the item.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// An ordered unit of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block kind
    pub kind: BlockKind,
    /// Layout attributes
    pub style: BlockStyle,
    /// Runs (headings and paragraphs)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<Run>,
    /// Items (bulleted lists)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ListItem>,
}

impl Block {
    /// Create a heading.
    pub fn heading(style: BlockStyle, runs: Vec<Run>) -> Self {
        Self {
            kind: BlockKind::Heading,
            style,
            runs,
            items: Vec::new(),
        }
    }

    /// Create a paragraph.
    pub fn paragraph(style: BlockStyle, runs: Vec<Run>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            style,
            runs,
            items: Vec::new(),
        }
    }

    /// Create a bulleted list.
    pub fn list(style: BlockStyle, items: Vec<ListItem>) -> Self {
        Self {
            kind: BlockKind::BulletedList,
            style,
            runs: Vec::new(),
            items,
        }
    }

    /// Create a horizontal rule in the given color.
    pub fn separator(color: Color) -> Self {
        Self {
            kind: BlockKind::Separator,
            style: BlockStyle::new(Role::Separator, 0.0),
            runs: vec![Run::new("", color)],
            items: Vec::new(),
        }
    }

    /// Plain text of the block (items joined by newlines).
    pub fn plain_text(&self) -> String {
        match self.kind {
            BlockKind::BulletedList => self
                .items
                .iter()
                .map(ListItem::plain_text)
                .collect::<Vec<_>>()
                .join("\n"),
            _ => self.runs.iter().map(|r| r.text.as_str()).collect(),
        }
    }

    /// Check if the block is a heading.
    pub fn is_heading(&self) -> bool {
        self.kind == BlockKind::Heading
    }
}

/// Generator output: ordered blocks plus the profile needed to serialize them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    /// Document type of the source record
    pub doc_type: DocType,
    /// Target format
    pub format: FormatCode,
    /// Language of every localized string in the blocks
    pub language: Language,
    /// Snapshot of the target format's visual constants
    pub profile: FormatProfile,
    /// Ordered output blocks
    pub blocks: Vec<Block>,
}

impl RenderedDocument {
    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Iterate over every run, including list item runs, in document order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.blocks
            .iter()
            .flat_map(|b| b.runs.iter().chain(b.items.iter().flat_map(|i| i.runs.iter())))
    }

    /// Headings in document order.
    pub fn headings(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.is_heading())
            .map(Block::plain_text)
            .collect()
    }

    /// Plain text of the whole document.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_serialization_skips_defaults() {
        let run = Run::new("hello", Color::BLACK);
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["text"], "hello");
        assert!(json.get("bold").is_none());
        assert!(json.get("inferred").is_none());

        let run = Run::bold("x", Color::BLACK).with_inferred(true);
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["bold"], true);
        assert_eq!(json["inferred"], true);
    }

    #[test]
    fn test_block_plain_text() {
        let style = BlockStyle::new(Role::Body, 10.0);
        let para = Block::paragraph(
            style.clone(),
            vec![Run::new("a ", Color::BLACK), Run::bold("b", Color::BLACK)],
        );
        assert_eq!(para.plain_text(), "a b");

        let list = Block::list(
            style,
            vec![
                ListItem {
                    level: 1,
                    glyph: "*".into(),
                    runs: vec![Run::new("one", Color::BLACK)],
                },
                ListItem {
                    level: 2,
                    glyph: "-".into(),
                    runs: vec![Run::new("two", Color::BLACK)],
                },
            ],
        );
        assert_eq!(list.plain_text(), "one\ntwo");
    }

    #[test]
    fn test_locked_roles() {
        assert!(Role::Budget.is_locked());
        assert!(!Role::Body.is_locked());
    }
}
