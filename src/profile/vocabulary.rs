//! Localized vocabulary, indexed by language.
//!
//! Every user-visible literal a generator emits comes from one of these
//! tables, so a document never mixes words from two languages.

use crate::detect::DocType;
use crate::model::Language;

/// Localized strings for one language.
#[derive(Debug)]
pub struct Vocabulary {
    /// The six job posting section titles, in order
    pub job_sections: [&'static str; 6],
    /// Budget line label
    pub budget_label: &'static str,
    /// Anonymized client line; `{sector}` is substituted
    pub client_template: &'static str,

    /// Style A CV group headings: functional, technical, education,
    /// certifications, languages, experience
    pub akazi_sections: [&'static str; 6],
    /// Style A daily rate label
    pub daily_rate_label: &'static str,
    /// Style A mission context label
    pub context_label: &'static str,
    /// Style A tasks label
    pub tasks_label: &'static str,
    /// Style A technologies label
    pub technologies_label: &'static str,

    /// Style B group headings: languages, education, expertise, experience
    pub mc2i_sections: [&'static str; 4],
    /// Style B headline when the record has none
    pub default_headline: &'static str,
    /// Style B title when the record has none
    pub default_title: &'static str,
    /// Style B experience length; `{years}` is substituted
    pub years_template: &'static str,
    /// Style B activities label
    pub activities_label: &'static str,
    /// Style B domains label
    pub domains_label: &'static str,
    /// Style B technical environment label
    pub environment_label: &'static str,

    /// Month names, January first
    pub months: [&'static str; 12],
    /// Word for a period without end
    pub ongoing: &'static str,
    /// Separator between period start and end
    pub period_separator: &'static str,
}

static FRENCH: Vocabulary = Vocabulary {
    job_sections: [
        "Contexte de la mission",
        "Missions principales",
        "Livrables attendus",
        "Compétences requises",
        "Profil recherché",
        "Modalités",
    ],
    budget_label: "BUDGET",
    client_template: "Pour notre client dans le secteur {sector} basé au Rwanda",

    akazi_sections: [
        "COMPÉTENCES FONCTIONNELLES",
        "COMPÉTENCES TECHNIQUES",
        "FORMATION & DIPLÔMES",
        "CERTIFICATIONS",
        "LANGUES",
        "EXPÉRIENCE PROFESSIONNELLE",
    ],
    daily_rate_label: "TJM souhaité : ",
    context_label: "■ Contexte de la mission : ",
    tasks_label: "■ Tâches :",
    technologies_label: "■ Environnements / Outils et technologies : ",

    mc2i_sections: [
        "LANGUES",
        "FORMATION",
        "EXPERTISES, OUTILS ET TECHNOLOGIES",
        "EXPÉRIENCES PROFESSIONNELLES",
    ],
    default_headline: "CONSULTANT",
    default_title: "CONSULTANT",
    years_template: "{years} années d'expérience",
    activities_label: "Activités :",
    domains_label: "Domaines :",
    environment_label: "Environnement technique :",

    months: [
        "Janvier",
        "Février",
        "Mars",
        "Avril",
        "Mai",
        "Juin",
        "Juillet",
        "Août",
        "Septembre",
        "Octobre",
        "Novembre",
        "Décembre",
    ],
    ongoing: "En cours",
    period_separator: " – ",
};

static ENGLISH: Vocabulary = Vocabulary {
    job_sections: [
        "Mission context",
        "Main responsibilities",
        "Expected deliverables",
        "Required skills",
        "Candidate profile",
        "Terms",
    ],
    budget_label: "BUDGET",
    client_template: "For our client in the {sector} sector based in Rwanda",

    akazi_sections: [
        "FUNCTIONAL SKILLS",
        "TECHNICAL SKILLS",
        "EDUCATION & DEGREES",
        "CERTIFICATIONS",
        "LANGUAGES",
        "PROFESSIONAL EXPERIENCE",
    ],
    daily_rate_label: "Desired daily rate: ",
    context_label: "■ Mission context: ",
    tasks_label: "■ Tasks:",
    technologies_label: "■ Environments / Tools and technologies: ",

    mc2i_sections: [
        "LANGUAGES",
        "EDUCATION",
        "EXPERTISE, TOOLS AND TECHNOLOGIES",
        "PROFESSIONAL EXPERIENCE",
    ],
    default_headline: "CONSULTANT",
    default_title: "CONSULTANT",
    years_template: "{years} years of experience",
    activities_label: "Activities:",
    domains_label: "Domains:",
    environment_label: "Technical environment:",

    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    ongoing: "Present",
    period_separator: " – ",
};

/// Vocabulary table for a language.
pub fn vocabulary(lang: Language) -> &'static Vocabulary {
    match lang {
        Language::French => &FRENCH,
        Language::English => &ENGLISH,
    }
}

impl Vocabulary {
    /// Section title for a (document type, slot) pair.
    ///
    /// Returns `None` when the slot is out of range for the document type.
    pub fn section_title(&self, doc_type: DocType, slot: usize) -> Option<&'static str> {
        match doc_type {
            DocType::JobDescription => self.job_sections.get(slot).copied(),
            DocType::AkaziCv => self.akazi_sections.get(slot).copied(),
            DocType::Mc2iCv => self.mc2i_sections.get(slot).copied(),
        }
    }

    /// Number of title slots for a document type.
    pub fn section_count(&self, doc_type: DocType) -> usize {
        match doc_type {
            DocType::JobDescription => self.job_sections.len(),
            DocType::AkaziCv => self.akazi_sections.len(),
            DocType::Mc2iCv => self.mc2i_sections.len(),
        }
    }

    /// Localized month name (1-based month).
    pub fn month(&self, month: u32) -> Option<&'static str> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.months.get(index).copied()
    }

    /// Anonymized client line.
    pub fn client_line(&self, sector: &str) -> String {
        self.client_template.replace("{sector}", sector)
    }

    /// Years-of-experience line.
    pub fn years_line(&self, years: u32) -> String {
        self.years_template.replace("{years}", &years.to_string())
    }
}

/// Look up a section title by (document type, language, slot).
pub fn section_title(doc_type: DocType, lang: Language, slot: usize) -> Option<&'static str> {
    vocabulary(lang).section_title(doc_type, slot)
}
