//! CV generator for the AKAZI house style.

use super::blocks::{BlockWriter, Emphasis};
use super::{Generator, RenderContext};
use crate::detect::DocType;
use crate::error::{Error, Result};
use crate::model::{
    AkaziCvRecord, AkaziExperience, Alignment, Block, BlockStyle, DocumentRecord, Role, Run,
    SkillGroup,
};
use crate::render::period_label;
use crate::validate::ValidatedRecord;

const FUNCTIONAL: usize = 0;
const TECHNICAL: usize = 1;
const EDUCATION: usize = 2;
const CERTIFICATIONS: usize = 3;
const LANGUAGES: usize = 4;
const EXPERIENCE: usize = 5;

/// Generator for `CV-AKAZI`.
#[derive(Debug, Default)]
pub struct AkaziCvGenerator;

impl AkaziCvGenerator {
    /// Create a new AKAZI CV generator.
    pub fn new() -> Self {
        Self
    }

    fn header(&self, w: &mut BlockWriter<'_>, record: &AkaziCvRecord) {
        let header = &record.header;
        let parts = [
            w.scalar(Some(&header.initials)),
            w.scalar(Some(&header.title)),
            w.scalar(Some(&header.years_of_experience)),
        ];

        let mut runs = Vec::with_capacity(parts.len() * 2);
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                runs.push(w.run(" - ", Role::Title, false, Emphasis::BOLD));
            }
            runs.push(w.scalar_run(part, Role::Title, Emphasis::BOLD));
        }
        let style = BlockStyle::new(Role::Title, w.title_size())
            .with_alignment(Alignment::Center)
            .with_spacing(0.0, 6.0);
        w.heading(style, runs);

        let rate = w.scalar(header.daily_rate.as_deref());
        let label = w.ctx().vocabulary.daily_rate_label;
        let runs = vec![
            w.run(label, Role::Summary, false, Emphasis::BOLD),
            w.scalar_run(&rate, Role::Summary, Emphasis::BOLD),
        ];
        let style = BlockStyle::new(Role::Summary, w.body_size())
            .with_alignment(Alignment::Center)
            .with_spacing(0.0, 12.0);
        w.paragraph(style, runs);
    }

    fn skill_group(
        &self,
        w: &mut BlockWriter<'_>,
        slot: usize,
        group: &SkillGroup,
        path: &str,
    ) -> Result<()> {
        w.section_heading(slot, Alignment::Left)?;
        let runs = w.rich_runs(&group.summary, Role::Summary, Emphasis::BOLD)?;
        w.paragraph(w.body_style(Role::Summary), runs);
        w.bullets(&group.details, &format!("{}.details", path), Role::Body, false)
    }

    fn skills_table(&self, w: &mut BlockWriter<'_>, record: &AkaziCvRecord) -> Result<()> {
        let table = &record.skills_table;
        self.skill_group(
            w,
            FUNCTIONAL,
            &table.functional_skills,
            "skills_table.functional_skills",
        )?;
        self.skill_group(
            w,
            TECHNICAL,
            &table.technical_skills,
            "skills_table.technical_skills",
        )?;

        if !table.education.is_empty() {
            w.section_heading(EDUCATION, Alignment::Left)?;
            let lines = table
                .education
                .iter()
                .map(|e| (format!("{} : {} - {}", e.year, e.degree, e.institution), false))
                .collect();
            w.simple_list(lines, Role::Body);
        }

        if !table.certifications.is_empty() {
            w.section_heading(CERTIFICATIONS, Alignment::Left)?;
            let lines = table
                .certifications
                .iter()
                .map(|c| (c.text().to_string(), c.inferred()))
                .collect();
            w.simple_list(lines, Role::Body);
        }

        if !table.languages.is_empty() {
            w.section_heading(LANGUAGES, Alignment::Left)?;
            let lines = table
                .languages
                .iter()
                .map(|l| (format!("{} : {}", l.language, l.level), l.inferred))
                .collect();
            w.simple_list(lines, Role::Body);
        }
        Ok(())
    }

    fn experience(
        &self,
        w: &mut BlockWriter<'_>,
        index: usize,
        exp: &AkaziExperience,
    ) -> Result<()> {
        let vocab = w.ctx().vocabulary;

        let company = w.scalar(exp.company.as_deref());
        let period = w.scalar(
            exp.period
                .as_ref()
                .and_then(|p| period_label(p, vocab))
                .as_deref(),
        );
        let runs = vec![
            w.scalar_run(&company, Role::Company, Emphasis::BOLD),
            w.run(" ", Role::Company, false, Emphasis::BOLD),
            w.run(
                &format!("({})", period.text),
                Role::Period,
                period.missing,
                Emphasis::BOLD,
            ),
        ];
        let style = BlockStyle::new(Role::Company, w.body_size()).with_spacing(12.0, 0.0);
        w.paragraph(style, runs);

        let title = w.scalar(exp.title.as_deref());
        let run = w.scalar_run(&title, Role::Position, Emphasis::BOLD);
        let style = BlockStyle::new(Role::Position, w.body_size()).with_spacing(0.0, 6.0);
        w.paragraph(style, vec![run]);

        if let Some(context) = exp.mission_context.as_deref().map(str::trim) {
            if !context.is_empty() {
                let runs = vec![
                    w.run(vocab.context_label, Role::Label, false, Emphasis::BOLD),
                    w.run(context, Role::Body, false, Emphasis::ITALIC),
                ];
                w.paragraph(w.body_style(Role::Body), runs);
            }
        }

        let label = w.run(vocab.tasks_label, Role::Label, false, Emphasis::BOLD);
        w.paragraph(w.body_style(Role::Label), vec![label]);
        w.bullets(
            &exp.tasks,
            &format!("experiences[{}].tasks", index),
            Role::Body,
            false,
        )?;

        if !exp.technical_environment.is_empty() {
            let mut runs: Vec<Run> =
                vec![w.run(vocab.technologies_label, Role::Label, false, Emphasis::BOLD)];
            for (i, tech) in exp.technical_environment.iter().enumerate() {
                if i > 0 {
                    runs.push(w.run(", ", Role::Body, false, Emphasis::BOLD));
                }
                runs.push(w.run(tech.text(), Role::Body, tech.inferred(), Emphasis::BOLD));
            }
            w.paragraph(w.body_style(Role::Body), runs);
        }
        Ok(())
    }

    fn render_record(&self, record: &AkaziCvRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        if record.experiences.is_empty() {
            return Err(Error::MissingRequiredBlock(
                "CV has no professional experience".into(),
            ));
        }

        let mut w = BlockWriter::new(ctx);
        self.header(&mut w, record);
        self.skills_table(&mut w, record)?;

        w.section_heading(EXPERIENCE, Alignment::Left)?;
        for (i, exp) in record.experiences.iter().enumerate() {
            self.experience(&mut w, i, exp)?;
        }
        Ok(w.finish())
    }
}

impl Generator for AkaziCvGenerator {
    fn name(&self) -> &str {
        "akazi_cv"
    }

    fn doc_type(&self) -> DocType {
        DocType::AkaziCv
    }

    fn render(&self, record: &ValidatedRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        match record.record() {
            DocumentRecord::AkaziCv(cv) => self.render_record(cv, ctx),
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
    const NAVY: Color = Color::rgb(0x00, 0x20, 0x60);
    const ORANGE: Color = Color::rgb(0xFF, 0x8C, 0x00);

    fn render(raw: &Value) -> RenderedDocument {
        let record = validate(raw, DocType::AkaziCv).unwrap();
        GeneratorRegistry::with_defaults()
            .render(&record, FormatCode::CvAkazi, &RenderOptions::default())
            .unwrap()
    }

    #[test]
    fn test_header_lines() {
        let doc = render(&fixtures::akazi_cv());
        let title = &doc.blocks[0];
        assert_eq!(
            title.plain_text(),
            "J.D. - Chef de projet Data - 12 ans d'expérience"
        );
        assert!(title.runs.iter().all(|r| r.color == RED && r.bold));

        let rate = &doc.blocks[1];
        assert_eq!(rate.plain_text(), "TJM souhaité : ----------");
        assert_eq!(rate.runs[0].color, NAVY);
        assert!(rate.runs[1].inferred);
        assert_eq!(rate.runs[1].color, ORANGE);
    }

    #[test]
    fn test_optional_groups_omitted() {
        let doc = render(&fixtures::akazi_cv());
        let headings = doc.headings();
        assert!(headings.contains(&"FORMATION & DIPLÔMES".to_string()));
        assert!(headings.contains(&"LANGUES".to_string()));
        assert!(!headings.contains(&"CERTIFICATIONS".to_string()));
    }

    #[test]
    fn test_skill_rows() {
        let doc = render(&fixtures::akazi_cv());
        let summary = &doc.blocks[3];
        assert_eq!(summary.plain_text(), "Pilotage de programmes data");
        assert!(summary.runs[0].bold);
        assert_eq!(summary.runs[0].color, NAVY);

        let details = &doc.blocks[4];
        assert_eq!(details.kind, BlockKind::BulletedList);
        assert_eq!(details.items[0].glyph, "•");
        assert_eq!(details.items[1].runs[0].color, ORANGE);
    }

    #[test]
    fn test_experience_block() {
        let doc = render(&fixtures::akazi_cv());
        let text = doc.plain_text();
        assert!(text.contains("Banque Populaire (Mars 2021 – En cours)"));
        assert!(text.contains("■ Contexte de la mission : Refonte du référentiel client."));
        assert!(text.contains("SQL Server, Azure"));

        let azure = doc.runs().find(|r| r.text == "Azure").unwrap();
        assert_eq!(azure.color, ORANGE);
        assert!(azure.bold);
        let context = doc
            .runs()
            .find(|r| r.text == "Refonte du référentiel client.")
            .unwrap();
        assert!(context.italic);
    }

    #[test]
    fn test_english_record() {
        let mut raw = fixtures::akazi_cv();
        raw["document_metadata"]["language_iso"] = json!("ENG");
        raw["experiences"][0]["period"] = json!({"start": "2019-01", "end": "2020-06"});
        let doc = render(&raw);
        assert!(doc.headings().contains(&"PROFESSIONAL EXPERIENCE".to_string()));
        assert!(doc.plain_text().contains("(January 2019 – June 2020)"));
        assert!(doc.plain_text().starts_with("J.D."));
    }
}
