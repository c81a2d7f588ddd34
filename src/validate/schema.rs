//! Per-document-type schemas.

use super::checker::{index, key, Checker};
use super::Constraint;
use crate::detect::DocType;
use crate::profile::vocabulary;
use serde_json::{Map, Value};

/// Number of sections every job posting carries.
const JOB_SECTION_COUNT: usize = 6;

pub(super) fn check(checker: &mut Checker, raw: &Value) {
    let Some(root) = checker.object(raw, "") else {
        return;
    };
    checker.metadata(root);

    match checker.doc_type() {
        DocType::JobDescription => job_description(checker, root),
        DocType::AkaziCv => akazi_cv(checker, root),
        DocType::Mc2iCv => mc2i_cv(checker, root),
    }
}

fn job_description(checker: &mut Checker, root: &Map<String, Value>) {
    checker.required_str(root, "mission_title", "");

    if let Some(budget) = checker.required(root, "budget", "") {
        if let Some(budget) = checker.object(budget, "budget") {
            checker.optional_str(budget, "text", "budget");
            checker.optional_bool(budget, "inferred", "budget");
        }
    }

    if let Some(client) = Checker::optional(root, "client") {
        if let Some(client) = checker.object(client, "client") {
            checker.required_str(client, "sector", "client");
        }
    }

    let Some(description) = checker.required(root, "description", "") else {
        return;
    };
    let Some(description) = checker.object(description, "description") else {
        return;
    };
    let Some(sections) = checker.required(description, "sections", "description") else {
        return;
    };
    let path = "description.sections";
    let Some(sections) = checker.array(sections, path) else {
        return;
    };
    if sections.len() != JOB_SECTION_COUNT {
        checker.push(
            path,
            Constraint::Cardinality,
            format!(
                "expected exactly {} sections, found {}",
                JOB_SECTION_COUNT,
                sections.len()
            ),
        );
    }

    for (slot, section) in sections.iter().enumerate() {
        job_section(checker, section, &index(path, slot), slot);
    }
}

fn job_section(checker: &mut Checker, value: &Value, path: &str, slot: usize) {
    let Some(section) = checker.object(value, path) else {
        return;
    };

    if let Some(title) = checker.required_str(section, "title", path) {
        // Titles can only be checked once the language is known.
        if let Some(lang) = checker.language() {
            let expected = vocabulary(lang).section_title(DocType::JobDescription, slot);
            match expected {
                Some(expected) if title.trim().to_lowercase() == expected.to_lowercase() => {}
                Some(expected) => checker.push(
                    &key(path, "title"),
                    Constraint::SectionTitle,
                    format!("expected '{}' for section {} in {}", expected, slot + 1, lang),
                ),
                None => {}
            }
        }
    }

    let formatting = Checker::optional(section, "formatting");
    let Some(content) = checker.required(section, "content", path) else {
        return;
    };
    let content_path = key(path, "content");
    match content {
        Value::String(text) => {
            if let Some(formatting) = formatting {
                checker.formatting(formatting, &key(path, "formatting"), Some(text.as_str()), false);
            }
        }
        Value::Array(_) => {
            checker.bullets(section, "content", path, 1);
            if formatting.is_some() {
                checker.push(
                    &key(path, "formatting"),
                    Constraint::Type,
                    "section formatting applies to paragraph content only; format bullets individually",
                );
            }
        }
        _ => checker.push(
            &content_path,
            Constraint::Type,
            "expected a paragraph string or a list of bullets",
        ),
    }
}

fn akazi_cv(checker: &mut Checker, root: &Map<String, Value>) {
    if let Some(header) = checker.required(root, "header", "") {
        if let Some(header) = checker.object(header, "header") {
            checker.required_str(header, "initials", "header");
            checker.required_str(header, "title", "header");
            checker.required_str(header, "years_of_experience", "header");
            checker.optional_str(header, "daily_rate", "header");
        }
    }

    if let Some(skills) = checker.required(root, "skills_table", "") {
        let path = "skills_table";
        if let Some(skills) = checker.object(skills, path) {
            for group in ["functional_skills", "technical_skills"] {
                let Some(value) = checker.required(skills, group, path) else {
                    continue;
                };
                let group_path = key(path, group);
                if let Some(obj) = checker.object(value, &group_path) {
                    if let Some(summary) = checker.required(obj, "summary", &group_path) {
                        checker.rich_text(summary, &key(&group_path, "summary"));
                    }
                    checker.bullets(obj, "details", &group_path, 0);
                }
            }
            checker.education(skills, path);
            certifications(checker, skills, path);
            checker.languages(skills, path);
        }
    }

    let Some(experiences) = checker.required_array(root, "experiences", "", 1) else {
        return;
    };
    for (i, value) in experiences.iter().enumerate() {
        let path = index("experiences", i);
        let Some(exp) = checker.object(value, &path) else {
            continue;
        };
        checker.optional_str(exp, "company", &path);
        checker.optional_str(exp, "title", &path);
        checker.optional_str(exp, "mission_context", &path);
        checker.period(exp, &path);
        checker.bullets(exp, "tasks", &path, 1);
        checker.technologies(exp, &path);
    }
}

fn certifications(checker: &mut Checker, obj: &Map<String, Value>, path: &str) {
    let Some(items) = checker.optional_array(obj, "certifications", path) else {
        return;
    };
    let path = key(path, "certifications");
    for (i, item) in items.iter().enumerate() {
        let item_path = index(&path, i);
        match item {
            Value::String(_) => {}
            Value::Object(cert) => {
                checker.required_str(cert, "text", &item_path);
                checker.optional_bool(cert, "inferred", &item_path);
            }
            _ => checker.push(&item_path, Constraint::Type, "expected a string or {text}"),
        }
    }
}

fn mc2i_cv(checker: &mut Checker, root: &Map<String, Value>) {
    if let Some(consultant) = Checker::optional(root, "consultant") {
        if let Some(consultant) = checker.object(consultant, "consultant") {
            checker.optional_str(consultant, "headline", "consultant");
            checker.optional_str(consultant, "title", "consultant");
        }
    }

    if let Some(summary) = checker.optional_array(root, "experience_summary", "") {
        for (i, item) in summary.iter().enumerate() {
            let path = index("experience_summary", i);
            if let Some(entry) = checker.object(item, &path) {
                checker.required_str(entry, "title", &path);
                checker.required_unsigned(entry, "duration_months", &path);
            }
        }
    }

    if let Some(intro) = checker.required(root, "introduction", "") {
        let path = "introduction";
        if let Some(intro) = checker.object(intro, path) {
            for field in [
                "experience_summary",
                "technical_skills_summary",
                "functional_skills_summary",
            ] {
                if let Some(value) = checker.required(intro, field, path) {
                    checker.rich_text(value, &key(path, field));
                }
            }
            if let Some(conclusion) = Checker::optional(intro, "conclusion") {
                checker.rich_text(conclusion, &key(path, "conclusion"));
            }
        }
    }

    checker.languages(root, "");
    checker.education(root, "");

    if let Some(expertise) = checker.required(root, "expertise", "") {
        let path = "expertise";
        if let Some(expertise) = checker.object(expertise, path) {
            checker.bullets(expertise, "expertises", path, 1);
            if let Some(masteries) = checker.optional_array(expertise, "masteries", path) {
                let masteries_path = key(path, "masteries");
                for (i, item) in masteries.iter().enumerate() {
                    checker.string(item, &index(&masteries_path, i));
                }
            }
        }
    }

    let Some(experiences) = checker.required_array(root, "professional_experiences", "", 1) else {
        return;
    };
    for (i, value) in experiences.iter().enumerate() {
        let path = index("professional_experiences", i);
        let Some(exp) = checker.object(value, &path) else {
            continue;
        };
        checker.optional_str(exp, "company", &path);
        checker.optional_str(exp, "title", &path);
        checker.optional_str(exp, "context", &path);
        checker.period(exp, &path);
        checker.bullets(exp, "activities", &path, 1);
        if let Some(domains) = checker.optional_array(exp, "functional_domains", &path) {
            let domains_path = key(&path, "functional_domains");
            for (j, item) in domains.iter().enumerate() {
                let item_path = index(&domains_path, j);
                if let Some(domain) = checker.object(item, &item_path) {
                    checker.required_str(domain, "domain", &item_path);
                    checker.optional_bool(domain, "inferred", &item_path);
                }
            }
        }
        checker.technologies(exp, &path);
    }
}
