//! Block assembly helpers shared by the generators.

use super::RenderContext;
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, BlockStyle, BulletEntry, Formatting, ListItem, RichText, Role, Run,
};
use crate::profile::Palette;
use crate::render::{check_explicit, resolve_color, segment};

/// Emphasis applied on top of segmentation.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Emphasis {
    pub bold: bool,
    pub italic: bool,
    pub small_caps: bool,
}

impl Emphasis {
    pub const PLAIN: Emphasis = Emphasis {
        bold: false,
        italic: false,
        small_caps: false,
    };

    pub const BOLD: Emphasis = Emphasis {
        bold: true,
        italic: false,
        small_caps: false,
    };

    pub const ITALIC: Emphasis = Emphasis {
        bold: false,
        italic: true,
        small_caps: false,
    };

    pub const BOLD_SMALL_CAPS: Emphasis = Emphasis {
        bold: true,
        italic: false,
        small_caps: true,
    };
}

/// A value ready to render: either the record's text or the placeholder.
pub(crate) struct Scalar {
    pub text: String,
    pub missing: bool,
}

/// Accumulates blocks for one document.
pub(crate) struct BlockWriter<'a> {
    ctx: &'a RenderContext<'a>,
    blocks: Vec<Block>,
}

impl<'a> BlockWriter<'a> {
    pub fn new(ctx: &'a RenderContext<'a>) -> Self {
        Self {
            ctx,
            blocks: Vec::new(),
        }
    }

    pub fn ctx(&self) -> &RenderContext<'a> {
        self.ctx
    }

    fn palette(&self) -> &Palette {
        &self.ctx.profile.palette
    }

    pub fn body_size(&self) -> f32 {
        self.ctx.profile.font.body_size
    }

    pub fn heading_size(&self) -> f32 {
        self.ctx.profile.font.heading_size
    }

    pub fn title_size(&self) -> f32 {
        self.ctx.profile.font.title_size
    }

    /// Body paragraph style: justified, small spacing.
    pub fn body_style(&self, role: Role) -> BlockStyle {
        BlockStyle::new(role, self.body_size())
            .with_alignment(Alignment::Justify)
            .with_spacing(3.0, 3.0)
    }

    /// Record text, or the placeholder when blank or absent.
    pub fn scalar(&self, value: Option<&str>) -> Scalar {
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => Scalar {
                text: text.to_string(),
                missing: false,
            },
            _ => Scalar {
                text: self.ctx.options.placeholder.clone(),
                missing: true,
            },
        }
    }

    /// A single run without bold directives.
    pub fn run(&self, text: &str, role: Role, inferred: bool, emphasis: Emphasis) -> Run {
        let color = resolve_color(role, inferred, None, self.palette());
        Run::new(text, color)
            .with_bold(emphasis.bold)
            .with_italic(emphasis.italic)
            .with_small_caps(emphasis.small_caps)
            .with_inferred(inferred)
    }

    /// A scalar as a run; placeholders are marked inferred.
    pub fn scalar_run(&self, scalar: &Scalar, role: Role, emphasis: Emphasis) -> Run {
        self.run(&scalar.text, role, scalar.missing, emphasis)
    }

    /// Segment text by its formatting and color every run.
    pub fn runs(
        &self,
        text: &str,
        formatting: Option<&Formatting>,
        role: Role,
        inferred: bool,
        emphasis: Emphasis,
    ) -> Result<Vec<Run>> {
        let explicit = formatting.and_then(|f| f.color);
        check_explicit(explicit, inferred, self.palette())?;
        let color = resolve_color(role, inferred, explicit, self.palette());

        let runs = segment(text, formatting)?
            .into_iter()
            .map(|seg| {
                Run::new(seg.text, color)
                    .with_bold(seg.bold || emphasis.bold)
                    .with_italic(emphasis.italic)
                    .with_small_caps(emphasis.small_caps)
                    .with_inferred(inferred)
            })
            .collect();
        Ok(runs)
    }

    /// Runs for a rich text field; a blank text renders the placeholder.
    pub fn rich_runs(&self, rich: &RichText, role: Role, emphasis: Emphasis) -> Result<Vec<Run>> {
        if rich.text().trim().is_empty() {
            let scalar = self.scalar(None);
            return Ok(vec![self.scalar_run(&scalar, role, emphasis)]);
        }
        self.runs(rich.text(), rich.formatting(), role, false, emphasis)
    }

    fn heading_text(&self, text: &str) -> String {
        if self.ctx.options.uppercase_headings {
            text.to_uppercase()
        } else {
            text.to_string()
        }
    }

    /// Localized section heading for a vocabulary slot.
    pub fn section_heading(&mut self, slot: usize, alignment: Alignment) -> Result<()> {
        let doc_type = self.ctx.profile.code.doc_type();
        let title = self
            .ctx
            .vocabulary
            .section_title(doc_type, slot)
            .ok_or_else(|| {
                Error::MissingRequiredBlock(format!("no {} section title for slot {}", doc_type, slot))
            })?;
        let text = self.heading_text(title);
        let style = BlockStyle::new(Role::SectionHeading, self.heading_size())
            .with_alignment(alignment)
            .with_spacing(20.0, 6.0);
        let run = self.run(&text, Role::SectionHeading, false, Emphasis::BOLD);
        self.blocks.push(Block::heading(style, vec![run]));
        Ok(())
    }

    pub fn heading(&mut self, style: BlockStyle, runs: Vec<Run>) {
        self.blocks.push(Block::heading(style, runs));
    }

    pub fn paragraph(&mut self, style: BlockStyle, runs: Vec<Run>) {
        self.blocks.push(Block::paragraph(style, runs));
    }

    /// Horizontal rule in the separator color.
    pub fn separator(&mut self) {
        let color = resolve_color(Role::Separator, false, None, self.palette());
        self.blocks.push(Block::separator(color));
    }

    /// Bulleted list from bullet entries, one sub-item level deep.
    ///
    /// `path` locates the entries in the record for nesting errors. When
    /// `bold_top_level` is set, level-1 items are emboldened entirely.
    pub fn bullets(
        &mut self,
        entries: &[BulletEntry],
        path: &str,
        role: Role,
        bold_top_level: bool,
    ) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut items = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let emphasis = if bold_top_level {
                Emphasis::BOLD
            } else {
                Emphasis::PLAIN
            };
            self.list_items(entry, 1, &format!("{}[{}]", path, i), role, emphasis, &mut items)?;
        }
        let style = self.body_style(role);
        self.blocks.push(Block::list(style, items));
        Ok(())
    }

    fn list_items(
        &self,
        entry: &BulletEntry,
        level: u8,
        path: &str,
        role: Role,
        emphasis: Emphasis,
        out: &mut Vec<ListItem>,
    ) -> Result<()> {
        let max = self.ctx.profile.max_level();
        if level > max {
            return Err(Error::UnsupportedNesting {
                path: path.to_string(),
                depth: usize::from(level - 1),
            });
        }

        let runs = self.runs(entry.text(), entry.formatting(), role, entry.inferred(), emphasis)?;
        out.push(ListItem {
            level,
            glyph: self.ctx.profile.glyph(level).to_string(),
            runs,
        });

        for (i, sub) in entry.sub_items().iter().enumerate() {
            let sub_path = format!("{}.sub_items[{}]", path, i);
            self.list_items(sub, level + 1, &sub_path, role, Emphasis::PLAIN, out)?;
        }
        Ok(())
    }

    /// Bulleted list of plain (text, inferred) lines.
    pub fn simple_list(&mut self, lines: Vec<(String, bool)>, role: Role) {
        if lines.is_empty() {
            return;
        }
        let glyph = self.ctx.profile.glyph(1).to_string();
        let items = lines
            .into_iter()
            .map(|(text, inferred)| ListItem {
                level: 1,
                glyph: glyph.clone(),
                runs: vec![self.run(&text, role, inferred, Emphasis::PLAIN)],
            })
            .collect();
        let style = self.body_style(role);
        self.blocks.push(Block::list(style, items));
    }

    pub fn finish(self) -> Vec<Block> {
        self.blocks
    }
}
