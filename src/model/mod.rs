//! Document model types.
//!
//! This module defines both sides of the rendering pipeline: the typed input
//! records (job postings and CVs) and the style-annotated intermediate
//! representation (IR) that generators produce from them.

mod color;
mod content;
mod ir;
mod record;

pub use color::Color;
pub use content::{
    BoldSpan, BulletEntry, BulletItem, Certification, Domain, Education, Formatting,
    LanguageSkill, Period, RichText, TechEntry,
};
pub use ir::{
    Alignment, Block, BlockKind, BlockStyle, ListItem, RenderedDocument, Role, Run,
};
pub use record::{
    AkaziCvRecord, AkaziExperience, AkaziHeader, Budget, Client, Consultant, Description,
    DocumentMetadata, DocumentRecord, ExperienceSummary, Expertise, Introduction,
    JobDescriptionRecord, Language, Mc2iCvRecord, Mc2iExperience, Section, SectionContent,
    SkillGroup, SkillsTable,
};
