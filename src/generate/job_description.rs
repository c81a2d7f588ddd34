//! Job posting generator.

use super::blocks::{BlockWriter, Emphasis};
use super::{Generator, RenderContext};
use crate::detect::DocType;
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, BlockStyle, DocumentRecord, JobDescriptionRecord, Role, SectionContent,
};
use crate::validate::ValidatedRecord;

/// Slot whose level-1 bullets are emboldened entirely.
const SKILLS_SLOT: usize = 3;

/// Generator for job postings (`JD-AKAZI-FR`, `JD-AKAZI-EN`).
///
/// Layout: upper-cased title, locked budget line, optional client line, then
/// the six sections under their localized titles.
#[derive(Debug, Default)]
pub struct JobDescriptionGenerator;

impl JobDescriptionGenerator {
    /// Create a new job posting generator.
    pub fn new() -> Self {
        Self
    }

    fn render_record(&self, record: &JobDescriptionRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        let mut w = BlockWriter::new(ctx);

        let title = w.scalar(Some(&record.mission_title));
        let style = BlockStyle::new(Role::Title, w.title_size())
            .with_alignment(Alignment::Center)
            .with_spacing(0.0, 12.0);
        let run = w.run(&title.text.to_uppercase(), Role::Title, title.missing, Emphasis::BOLD);
        w.heading(style, vec![run]);

        let budget = w.scalar(record.budget.text.as_deref());
        let line = format!("{} : {}", ctx.vocabulary.budget_label, budget.text);
        let style = BlockStyle::new(Role::Budget, w.heading_size()).with_spacing(20.0, 6.0);
        let inferred = record.budget.inferred || budget.missing;
        let run = w.run(&line, Role::Budget, inferred, Emphasis::BOLD);
        w.paragraph(style, vec![run]);

        if let Some(client) = &record.client {
            if !client.sector.trim().is_empty() {
                let line = ctx.vocabulary.client_line(client.sector.trim());
                let run = w.run(&line, Role::Body, false, Emphasis::ITALIC);
                w.paragraph(w.body_style(Role::Body), vec![run]);
            }
        }

        let sections = &record.description.sections;
        let expected = ctx.vocabulary.section_count(DocType::JobDescription);
        if sections.len() != expected {
            return Err(Error::MissingRequiredBlock(format!(
                "job posting has {} sections, expected {}",
                sections.len(),
                expected
            )));
        }

        for (slot, section) in sections.iter().enumerate() {
            w.section_heading(slot, Alignment::Left)?;
            match &section.content {
                SectionContent::Paragraph(text) => {
                    let runs = w.runs(
                        text,
                        section.formatting.as_ref(),
                        Role::Body,
                        false,
                        Emphasis::PLAIN,
                    )?;
                    w.paragraph(w.body_style(Role::Body), runs);
                }
                SectionContent::Bullets(entries) => {
                    let path = format!("description.sections[{}].content", slot);
                    w.bullets(entries, &path, Role::Body, slot == SKILLS_SLOT)?;
                }
            }
        }

        Ok(w.finish())
    }
}

impl Generator for JobDescriptionGenerator {
    fn name(&self) -> &str {
        "job_description"
    }

    fn doc_type(&self) -> DocType {
        DocType::JobDescription
    }

    fn render(&self, record: &ValidatedRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        match record.record() {
            DocumentRecord::JobDescription(jd) => self.render_record(jd, ctx),
            other => Err(Error::Render(format!(
                "{} cannot render {}",
                self.name(),
                other.doc_type()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::GeneratorRegistry;
    use crate::model::{BlockKind, Color, RenderedDocument};
    use crate::profile::FormatCode;
    use crate::render::RenderOptions;
    use crate::validate::{fixtures, validate};
    use serde_json::{json, Value};

    const RED: Color = Color::rgb(0xC0, 0x00, 0x00);
    const ORANGE: Color = Color::rgb(0xFF, 0x8C, 0x00);

    fn render(raw: &Value, code: FormatCode) -> Result<RenderedDocument> {
        let record = validate(raw, DocType::JobDescription)?;
        GeneratorRegistry::with_defaults().render(&record, code, &RenderOptions::default())
    }

    #[test]
    fn test_layout_french() {
        let doc = render(&fixtures::job_description("FRA"), FormatCode::JdAkaziFr).unwrap();
        assert_eq!(doc.blocks[0].plain_text(), "DATA GOVERNANCE MANAGER");
        assert_eq!(doc.blocks[0].style.alignment, Alignment::Center);

        let budget = &doc.blocks[1];
        assert_eq!(budget.plain_text(), "BUDGET : 650 €/j");
        assert_eq!(budget.runs[0].color, RED);
        assert!(budget.runs[0].bold);

        assert_eq!(
            doc.blocks[2].plain_text(),
            "Pour notre client dans le secteur bancaire basé au Rwanda"
        );

        let headings = doc.headings();
        assert_eq!(headings.len(), 7);
        assert_eq!(headings[1], "CONTEXTE DE LA MISSION");
        assert_eq!(headings[6], "MODALITÉS");
    }

    #[test]
    fn test_english_vocabulary_only() {
        let doc = render(&fixtures::job_description("ENG"), FormatCode::JdAkaziEn).unwrap();
        let headings = doc.headings();
        assert_eq!(headings[1], "MISSION CONTEXT");
        assert_eq!(headings[4], "REQUIRED SKILLS");
        assert!(!doc.plain_text().contains("Contexte"));
        assert!(doc.plain_text().contains("For our client in the bancaire sector"));
    }

    #[test]
    fn test_bold_terms_paragraph() {
        let doc = render(&fixtures::job_description("FRA"), FormatCode::JdAkaziFr).unwrap();
        let paragraph = &doc.blocks[4];
        assert_eq!(paragraph.kind, BlockKind::Paragraph);
        let runs: Vec<(&str, bool)> = paragraph
            .runs
            .iter()
            .map(|r| (r.text.as_str(), r.bold))
            .collect();
        assert_eq!(
            runs,
            vec![
                ("Rattaché au ", false),
                ("Data Governance Lead", true),
                (", vous piloterez la ", false),
                ("stratégie MDM", true),
                (".", false),
            ]
        );
    }

    #[test]
    fn test_bold_spans_and_sub_items() {
        let doc = render(&fixtures::job_description("FRA"), FormatCode::JdAkaziFr).unwrap();
        let list = &doc.blocks[6];
        assert_eq!(list.kind, BlockKind::BulletedList);
        let first = &list.items[0];
        assert_eq!(first.runs[0].text, "Pilotage Stratégique");
        assert!(first.runs[0].bold);
        assert_eq!(first.runs[1].text, " : Supervision des 7 streams");
        assert!(!first.runs[1].bold);

        assert_eq!(list.items[1].level, 2);
        assert_eq!(list.items[2].runs[0].color, ORANGE);
        assert_eq!(list.items[3].level, 1);
        assert_eq!(list.items[3].runs[0].color, Color::BLACK);
    }

    #[test]
    fn test_skills_slot_bold() {
        let doc = render(&fixtures::job_description("FRA"), FormatCode::JdAkaziFr).unwrap();
        let skills = doc
            .blocks
            .iter()
            .skip_while(|b| b.plain_text() != "COMPÉTENCES REQUISES")
            .nth(1)
            .unwrap();
        assert!(skills.items.iter().all(|i| i.runs.iter().all(|r| r.bold)));
        assert!(skills.items[1].runs[0].inferred);
    }

    #[test]
    fn test_missing_budget_placeholder() {
        let mut raw = fixtures::job_description("FRA");
        raw["budget"] = json!({});
        raw.as_object_mut().unwrap().remove("client");
        let doc = render(&raw, FormatCode::JdAkaziFr).unwrap();
        let budget = &doc.blocks[1];
        assert_eq!(budget.plain_text(), "BUDGET : ----------");
        assert!(budget.runs[0].inferred);
        assert_eq!(budget.runs[0].color, RED);
        assert!(doc.blocks[2].is_heading());
    }

    #[test]
    fn test_budget_color_locked() {
        let mut raw = fixtures::job_description("FRA");
        raw["budget"] = json!({"text": "A définir", "inferred": true});
        let doc = render(&raw, FormatCode::JdAkaziFr).unwrap();
        assert_eq!(doc.blocks[1].runs[0].color, RED);
    }

    #[test]
    fn test_second_nesting_level_rejected() {
        let mut raw = fixtures::job_description("FRA");
        raw["description"]["sections"][1]["content"][1] =
            json!({"text": "a", "sub_items": [{"text": "b", "sub_items": ["c"]}]});
        assert!(render(&raw, FormatCode::JdAkaziFr).is_err());
    }
}
