//! CV generator for the MC2I house style.

use super::blocks::{BlockWriter, Emphasis};
use super::{Generator, RenderContext};
use crate::detect::DocType;
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, BlockStyle, DocumentRecord, Mc2iCvRecord, Mc2iExperience, Role, Run,
    TechEntry,
};
use crate::render::period_label;
use crate::validate::ValidatedRecord;

const LANGUAGES: usize = 0;
const EDUCATION: usize = 1;
const EXPERTISE: usize = 2;
const EXPERIENCE: usize = 3;

/// Generator for `CV-MC2I`.
///
/// Groups are separated by horizontal rules; experience headers use small
/// caps in the company and mission colors.
#[derive(Debug, Default)]
pub struct Mc2iCvGenerator;

impl Mc2iCvGenerator {
    /// Create a new MC2I CV generator.
    pub fn new() -> Self {
        Self
    }

    fn header(&self, w: &mut BlockWriter<'_>, record: &Mc2iCvRecord) {
        let vocab = w.ctx().vocabulary;
        let consultant = record.consultant.as_ref();

        let headline = consultant
            .and_then(|c| c.headline.as_deref())
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(vocab.default_headline);
        let style = BlockStyle::new(Role::Title, w.title_size())
            .with_alignment(Alignment::Center)
            .with_spacing(0.0, 6.0);
        let run = w.run(&headline.to_uppercase(), Role::Title, false, Emphasis::BOLD);
        w.heading(style, vec![run]);

        let title = consultant
            .and_then(|c| c.title.as_deref())
            .or_else(|| record.experience_summary.first().map(|s| s.title.as_str()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(vocab.default_title);
        let centered = BlockStyle::new(Role::Position, w.heading_size())
            .with_alignment(Alignment::Center)
            .with_spacing(0.0, 3.0);
        let run = w.run(title, Role::Position, false, Emphasis::BOLD);
        w.paragraph(centered.clone(), vec![run]);

        if !record.experience_summary.is_empty() {
            let months: u32 = record
                .experience_summary
                .iter()
                .map(|s| s.duration_months)
                .fold(0, u32::saturating_add);
            let run = w.run(&vocab.years_line(months / 12), Role::Position, false, Emphasis::PLAIN);
            w.paragraph(centered, vec![run]);
        }
    }

    fn introduction(&self, w: &mut BlockWriter<'_>, record: &Mc2iCvRecord) -> Result<()> {
        let intro = &record.introduction;
        let paragraphs = [
            Some(&intro.experience_summary),
            Some(&intro.technical_skills_summary),
            Some(&intro.functional_skills_summary),
            intro.conclusion.as_ref(),
        ];
        for rich in paragraphs.into_iter().flatten() {
            let runs = w.rich_runs(rich, Role::Body, Emphasis::PLAIN)?;
            w.paragraph(w.body_style(Role::Body), runs);
        }
        Ok(())
    }

    fn group(&self, w: &mut BlockWriter<'_>, slot: usize) -> Result<()> {
        w.separator();
        w.section_heading(slot, Alignment::Left)
    }

    fn tech_runs(&self, w: &BlockWriter<'_>, entries: &[TechEntry]) -> Vec<Run> {
        let mut runs = Vec::with_capacity(entries.len() * 2);
        for (i, tech) in entries.iter().enumerate() {
            if i > 0 {
                runs.push(w.run(", ", Role::Body, false, Emphasis::PLAIN));
            }
            runs.push(w.run(tech.text(), Role::Body, tech.inferred(), Emphasis::PLAIN));
        }
        runs
    }

    fn experience(&self, w: &mut BlockWriter<'_>, index: usize, exp: &Mc2iExperience) -> Result<()> {
        let vocab = w.ctx().vocabulary;

        let company = w.scalar(exp.company.as_deref());
        let run = w.run(
            &company.text.to_uppercase(),
            Role::Company,
            company.missing,
            Emphasis::BOLD_SMALL_CAPS,
        );
        let style = BlockStyle::new(Role::Company, w.heading_size()).with_spacing(12.0, 0.0);
        w.paragraph(style, vec![run]);

        let title = w.scalar(exp.title.as_deref());
        let period = w.scalar(
            exp.period
                .as_ref()
                .and_then(|p| period_label(p, vocab))
                .as_deref(),
        );
        let small_caps = Emphasis {
            small_caps: true,
            ..Emphasis::PLAIN
        };
        let runs = vec![
            w.scalar_run(&title, Role::Position, Emphasis::BOLD_SMALL_CAPS),
            w.run(" | ", Role::Period, false, small_caps),
            w.scalar_run(&period, Role::Period, small_caps),
        ];
        let style = BlockStyle::new(Role::Position, w.body_size()).with_spacing(0.0, 6.0);
        w.paragraph(style, runs);

        if let Some(context) = exp.context.as_deref().map(str::trim) {
            if !context.is_empty() {
                let run = w.run(context, Role::Body, false, Emphasis::PLAIN);
                w.paragraph(w.body_style(Role::Body), vec![run]);
            }
        }

        let label = w.run(vocab.activities_label, Role::Label, false, Emphasis::BOLD);
        w.paragraph(w.body_style(Role::Label), vec![label]);
        w.bullets(
            &exp.activities,
            &format!("professional_experiences[{}].activities", index),
            Role::Body,
            false,
        )?;

        if !exp.functional_domains.is_empty() {
            let label = w.run(vocab.domains_label, Role::Label, false, Emphasis::BOLD);
            w.paragraph(w.body_style(Role::Label), vec![label]);
            let lines = exp
                .functional_domains
                .iter()
                .map(|d| (d.domain.clone(), d.inferred))
                .collect();
            w.simple_list(lines, Role::Body);
        }

        if !exp.technical_environment.is_empty() {
            let mut runs = vec![w.run(vocab.environment_label, Role::Label, false, Emphasis::BOLD)];
            runs.push(w.run(" ", Role::Body, false, Emphasis::PLAIN));
            runs.extend(self.tech_runs(w, &exp.technical_environment));
            w.paragraph(w.body_style(Role::Body), runs);
        }
        Ok(())
    }

    fn render_record(&self, record: &Mc2iCvRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        if record.professional_experiences.is_empty() {
            return Err(Error::MissingRequiredBlock(
                "CV has no professional experience".into(),
            ));
        }

        let mut w = BlockWriter::new(ctx);
        self.header(&mut w, record);
        w.separator();
        self.introduction(&mut w, record)?;

        if !record.languages.is_empty() {
            self.group(&mut w, LANGUAGES)?;
            let lines = record
                .languages
                .iter()
                .map(|l| (format!("{} : {}", l.language, l.level), l.inferred))
                .collect();
            w.simple_list(lines, Role::Body);
        }

        if !record.education.is_empty() {
            self.group(&mut w, EDUCATION)?;
            let lines = record
                .education
                .iter()
                .map(|e| (format!("{} : {} - {}", e.year, e.degree, e.institution), false))
                .collect();
            w.simple_list(lines, Role::Body);
        }

        self.group(&mut w, EXPERTISE)?;
        w.bullets(
            &record.expertise.expertises,
            "expertise.expertises",
            Role::Body,
            false,
        )?;
        if !record.expertise.masteries.is_empty() {
            let text = record.expertise.masteries.join(", ");
            let run = w.run(&text, Role::Body, false, Emphasis::PLAIN);
            w.paragraph(w.body_style(Role::Body), vec![run]);
        }

        self.group(&mut w, EXPERIENCE)?;
        for (i, exp) in record.professional_experiences.iter().enumerate() {
            if i > 0 {
                w.separator();
            }
            self.experience(&mut w, i, exp)?;
        }
        Ok(w.finish())
    }
}

impl Generator for Mc2iCvGenerator {
    fn name(&self) -> &str {
        "mc2i_cv"
    }

    fn doc_type(&self) -> DocType {
        DocType::Mc2iCv
    }

    fn render(&self, record: &ValidatedRecord, ctx: &RenderContext<'_>) -> Result<Vec<Block>> {
        match record.record() {
            DocumentRecord::Mc2iCv(cv) => self.render_record(cv, ctx),
            other => Err(Error::Render(format!(
                "{} cannot render {}",
                self.name(),
                other.doc_type()
            ))),
        }
    }
}
