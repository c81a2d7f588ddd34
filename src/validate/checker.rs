//! Path-tracking constraint checker and the rules shared by every schema.

use super::{Constraint, ValidationErrors, Violation};
use crate::detect::DocType;
use crate::model::{Color, Language};
use crate::profile::{FormatCode, Palette, FormatProfile};
use crate::render::duration_months;
use chrono::DateTime;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Compiled patterns used by the checker.
struct Patterns {
    hash: Regex,
    uuid: Regex,
    year_month: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        hash: Regex::new(r"^[0-9a-fA-F]{64}$").expect("valid hash pattern"),
        uuid: Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
        )
        .expect("valid uuid pattern"),
        year_month: Regex::new(r"^\d{4}-(0[1-9]|1[0-2])$").expect("valid month pattern"),
    })
}

/// Append an object key to a path.
pub(super) fn key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Append an array index to a path.
pub(super) fn index(path: &str, i: usize) -> String {
    format!("{}[{}]", path, i)
}

/// Collects violations while walking a raw record.
pub(super) struct Checker {
    doc_type: DocType,
    language: Option<Language>,
    palettes: Vec<Palette>,
    violations: Vec<Violation>,
}

impl Checker {
    pub(super) fn new(doc_type: DocType) -> Self {
        let palettes = FormatCode::all()
            .iter()
            .filter(|c| c.doc_type() == doc_type)
            .map(|c| FormatProfile::for_code(*c).palette)
            .collect();
        Self {
            doc_type,
            language: None,
            palettes,
            violations: Vec::new(),
        }
    }

    pub(super) fn doc_type(&self) -> DocType {
        self.doc_type
    }

    /// Language declared in the metadata, once it has been checked.
    pub(super) fn language(&self) -> Option<Language> {
        self.language
    }

    pub(super) fn finish(self) -> ValidationErrors {
        ValidationErrors {
            violations: self.violations,
        }
    }

    pub(super) fn push(&mut self, path: &str, constraint: Constraint, message: impl Into<String>) {
        self.violations.push(Violation {
            path: path.to_string(),
            constraint,
            message: message.into(),
        });
    }

    // -- primitives -------------------------------------------------------

    pub(super) fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        match value.as_object() {
            Some(obj) => Some(obj),
            None => {
                self.push(path, Constraint::Type, "expected an object");
                None
            }
        }
    }

    pub(super) fn required<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        name: &str,
        path: &str,
    ) -> Option<&'a Value> {
        match obj.get(name) {
            Some(Value::Null) | None => {
                self.push(&key(path, name), Constraint::Required, "required field is missing");
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Optional field; explicit `null` counts as absent.
    pub(super) fn optional<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
        obj.get(name).filter(|v| !v.is_null())
    }

    pub(super) fn string<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a str> {
        match value.as_str() {
            Some(s) => Some(s),
            None => {
                self.push(path, Constraint::Type, "expected a string");
                None
            }
        }
    }

    pub(super) fn required_str<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        name: &str,
        path: &str,
    ) -> Option<&'a str> {
        let value = self.required(obj, name, path)?;
        self.string(value, &key(path, name))
    }

    pub(super) fn optional_str<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        name: &str,
        path: &str,
    ) -> Option<&'a str> {
        let value = Self::optional(obj, name)?;
        self.string(value, &key(path, name))
    }

    pub(super) fn optional_bool(&mut self, obj: &Map<String, Value>, name: &str, path: &str) -> bool {
        match Self::optional(obj, name) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                self.push(&key(path, name), Constraint::Type, "expected a boolean");
                false
            }
        }
    }

    pub(super) fn array<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Vec<Value>> {
        match value.as_array() {
            Some(items) => Some(items),
            None => {
                self.push(path, Constraint::Type, "expected an array");
                None
            }
        }
    }

    /// Required array with at least `min` items.
    pub(super) fn required_array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        name: &str,
        path: &str,
        min: usize,
    ) -> Option<&'a Vec<Value>> {
        let value = self.required(obj, name, path)?;
        let path = key(path, name);
        let items = self.array(value, &path)?;
        if items.len() < min {
            self.push(
                &path,
                Constraint::Cardinality,
                format!("expected at least {} item(s), found {}", min, items.len()),
            );
        }
        Some(items)
    }

    pub(super) fn optional_array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        name: &str,
        path: &str,
    ) -> Option<&'a Vec<Value>> {
        let value = Self::optional(obj, name)?;
        self.array(value, &key(path, name))
    }

    fn unsigned(&mut self, value: &Value, path: &str) -> Option<u64> {
        match value.as_u64() {
            Some(n) => Some(n),
            None => {
                self.push(path, Constraint::Type, "expected a non-negative integer");
                None
            }
        }
    }

    pub(super) fn required_unsigned(
        &mut self,
        obj: &Map<String, Value>,
        name: &str,
        path: &str,
    ) -> Option<u64> {
        let value = self.required(obj, name, path)?;
        self.unsigned(value, &key(path, name))
    }

    // -- shared rules -----------------------------------------------------

    /// `document_metadata` block.
    pub(super) fn metadata(&mut self, root: &Map<String, Value>) {
        let path = "document_metadata";
        let Some(value) = self.required(root, path, "") else {
            return;
        };
        let Some(meta) = self.object(value, path) else {
            return;
        };

        let expected_type = self.doc_type.metadata_type();
        if let Some(found) = self.required_str(meta, "document_type", path) {
            if found != expected_type {
                self.push(
                    &key(path, "document_type"),
                    Constraint::Enum,
                    format!("expected '{}', found '{}'", expected_type, found),
                );
            }
        }

        let expected_code = self.doc_type.metadata_format_code();
        if let Some(found) = self.required_str(meta, "format_code", path) {
            if found != expected_code {
                self.push(
                    &key(path, "format_code"),
                    Constraint::Enum,
                    format!("expected '{}', found '{}'", expected_code, found),
                );
            }
        }

        if let Some(version) = self.required_str(meta, "format_version", path) {
            if semver::Version::parse(version).is_err() {
                self.push(
                    &key(path, "format_version"),
                    Constraint::Pattern,
                    format!("'{}' is not a semantic version", version),
                );
            }
        }

        if let Some(lang) = self.required_str(meta, "language_iso", path) {
            match lang.parse::<Language>() {
                Ok(lang) => self.language = Some(lang),
                Err(_) => self.push(
                    &key(path, "language_iso"),
                    Constraint::Enum,
                    format!("expected one of FRA, ENG, found '{}'", lang),
                ),
            }
        }

        if let Some(stamp) = self.required_str(meta, "generated_at", path) {
            if DateTime::parse_from_rfc3339(stamp).is_err() {
                self.push(
                    &key(path, "generated_at"),
                    Constraint::Pattern,
                    format!("'{}' is not an RFC 3339 timestamp", stamp),
                );
            }
        }

        if let Some(generator) = self.required_str(meta, "generator", path) {
            if generator.trim().is_empty() {
                self.push(&key(path, "generator"), Constraint::Required, "must not be empty");
            }
        }

        if let Some(hash) = self.optional_str(meta, "source_hash", path) {
            if !patterns().hash.is_match(hash) {
                self.push(
                    &key(path, "source_hash"),
                    Constraint::Pattern,
                    "expected 64 hexadecimal characters",
                );
            }
        }

        if let Some(id) = self.optional_str(meta, "document_id", path) {
            if !patterns().uuid.is_match(id) {
                self.push(
                    &key(path, "document_id"),
                    Constraint::Pattern,
                    format!("'{}' is not a hyphenated UUID", id),
                );
            }
        }
    }

    /// A string field, or `{text, formatting?}`.
    pub(super) fn rich_text(&mut self, value: &Value, path: &str) {
        match value {
            Value::String(_) => {}
            Value::Object(obj) => {
                let text = self.required_str(obj, "text", path);
                if let Some(formatting) = Self::optional(obj, "formatting") {
                    self.formatting(formatting, &key(path, "formatting"), text, false);
                }
            }
            _ => self.push(path, Constraint::Type, "expected a string or {text, formatting}"),
        }
    }

    /// A bullet entry at the given nesting depth (0 = top level).
    pub(super) fn bullet(&mut self, value: &Value, path: &str, depth: usize) {
        match value {
            Value::String(_) => {}
            Value::Object(obj) => {
                let text = self.required_str(obj, "text", path);
                let inferred = self.optional_bool(obj, "inferred", path);
                if let Some(formatting) = Self::optional(obj, "formatting") {
                    self.formatting(formatting, &key(path, "formatting"), text, inferred);
                }
                if let Some(subs) = self.optional_array(obj, "sub_items", path) {
                    let sub_path = key(path, "sub_items");
                    if depth >= 1 && !subs.is_empty() {
                        self.push(
                            &sub_path,
                            Constraint::Nesting,
                            "sub-items may not contain further sub-items",
                        );
                        return;
                    }
                    for (i, sub) in subs.iter().enumerate() {
                        self.bullet(sub, &index(&sub_path, i), depth + 1);
                    }
                }
            }
            _ => self.push(path, Constraint::Type, "expected a string or bullet object"),
        }
    }

    /// Array of bullet entries with a minimum length.
    pub(super) fn bullets(&mut self, obj: &Map<String, Value>, name: &str, path: &str, min: usize) {
        let items = if min > 0 {
            self.required_array(obj, name, path, min)
        } else {
            self.optional_array(obj, name, path)
        };
        let path = key(path, name);
        for (i, item) in items.into_iter().flatten().enumerate() {
            self.bullet(item, &index(&path, i), 0);
        }
    }

    /// Formatting descriptor attached to `text`.
    pub(super) fn formatting(
        &mut self,
        value: &Value,
        path: &str,
        text: Option<&str>,
        inferred: bool,
    ) {
        let Some(obj) = self.object(value, path) else {
            return;
        };

        let terms = Self::optional(obj, "bold_terms");
        let spans = Self::optional(obj, "bold_spans");
        if terms.is_some() && spans.is_some() {
            self.push(
                path,
                Constraint::ExclusiveFormatting,
                "bold_terms and bold_spans cannot be combined on one field",
            );
        }

        if let Some(terms) = terms {
            let terms_path = key(path, "bold_terms");
            if let Some(items) = self.array(terms, &terms_path) {
                for (i, term) in items.iter().enumerate() {
                    let term_path = index(&terms_path, i);
                    if let Some(term) = self.string(term, &term_path) {
                        if term.is_empty() {
                            self.push(&term_path, Constraint::Required, "term must not be empty");
                        }
                    }
                }
            }
        }

        if let Some(spans) = spans {
            self.spans(spans, &key(path, "bold_spans"), text);
        }

        if let Some(color) = Self::optional(obj, "color") {
            self.color(color, &key(path, "color"), inferred);
        }
    }

    fn spans(&mut self, value: &Value, path: &str, text: Option<&str>) {
        let Some(items) = self.array(value, path) else {
            return;
        };
        let len = text.map(|t| t.chars().count());

        let mut ranges: Vec<(u64, u64, usize)> = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let span_path = index(path, i);
            let Some(span) = self.object(item, &span_path) else {
                continue;
            };
            let start = self.required_unsigned(span, "start", &span_path);
            let end = self.required_unsigned(span, "end", &span_path);
            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };
            if start >= end {
                self.push(
                    &span_path,
                    Constraint::SpanBounds,
                    format!("start {} must be lower than end {}", start, end),
                );
                continue;
            }
            if let Some(len) = len {
                if end as usize > len {
                    self.push(
                        &span_path,
                        Constraint::SpanBounds,
                        format!("end {} exceeds text length {}", end, len),
                    );
                    continue;
                }
            }
            ranges.push((start, end, i));
        }

        ranges.sort_unstable();
        for pair in ranges.windows(2) {
            let (_, prev_end, prev_i) = pair[0];
            let (next_start, _, next_i) = pair[1];
            if next_start < prev_end {
                self.push(
                    &index(path, next_i),
                    Constraint::SpanOverlap,
                    format!("overlaps span {}", prev_i),
                );
            }
        }
    }

    fn color(&mut self, value: &Value, path: &str, inferred: bool) {
        let Some(raw) = self.string(value, path) else {
            return;
        };
        let Some(color) = Color::from_hex(raw) else {
            self.push(path, Constraint::Pattern, format!("'{}' is not a #RRGGBB color", raw));
            return;
        };
        if !self.palettes.iter().any(|p| p.contains(color)) {
            self.push(
                path,
                Constraint::Palette,
                format!("{} is not part of the {} palette", color, self.doc_type),
            );
            return;
        }
        if inferred && !self.palettes.iter().any(|p| p.inferred == color) {
            self.push(
                path,
                Constraint::Provenance,
                format!("inferred content cannot be colored {}", color),
            );
        }
    }

    /// Optional `period` object.
    pub(super) fn period(&mut self, obj: &Map<String, Value>, path: &str) {
        let Some(value) = Self::optional(obj, "period") else {
            return;
        };
        let path = key(path, "period");
        let Some(period) = self.object(value, &path) else {
            return;
        };

        let start = self.year_month(period, "start", &path);
        let end = self.year_month(period, "end", &path);
        if let (Some(start), Some(end)) = (start, end) {
            // YYYY-MM compares lexicographically
            if start > end {
                self.push(
                    &path,
                    Constraint::Range,
                    format!("start {} is after end {}", start, end),
                );
            }
        }

        self.optional_str(period, "formatted", &path);

        if let Some(duration) = self.optional_str(period, "duration", &path) {
            if duration_months(duration).is_none() {
                self.push(
                    &key(&path, "duration"),
                    Constraint::Pattern,
                    format!("'{}' is not an ISO 8601 duration like P2Y3M", duration),
                );
            }
        }
    }

    fn year_month<'a>(&mut self, obj: &'a Map<String, Value>, name: &str, path: &str) -> Option<&'a str> {
        let value = self.optional_str(obj, name, path)?;
        if patterns().year_month.is_match(value) {
            Some(value)
        } else {
            self.push(
                &key(path, name),
                Constraint::Pattern,
                format!("'{}' is not a YYYY-MM month", value),
            );
            None
        }
    }

    /// Optional array of technology entries.
    pub(super) fn technologies(&mut self, obj: &Map<String, Value>, path: &str) {
        let Some(items) = self.optional_array(obj, "technical_environment", path) else {
            return;
        };
        let path = key(path, "technical_environment");
        for (i, item) in items.iter().enumerate() {
            let item_path = index(&path, i);
            match item {
                Value::String(_) => {}
                Value::Object(tech) => {
                    self.required_str(tech, "technologies", &item_path);
                    self.optional_str(tech, "category", &item_path);
                    self.optional_bool(tech, "inferred", &item_path);
                }
                _ => self.push(
                    &item_path,
                    Constraint::Type,
                    "expected a string or {technologies}",
                ),
            }
        }
    }

    /// Optional array of `{year, degree, institution}`.
    pub(super) fn education(&mut self, obj: &Map<String, Value>, path: &str) {
        let Some(items) = self.optional_array(obj, "education", path) else {
            return;
        };
        let path = key(path, "education");
        for (i, item) in items.iter().enumerate() {
            let item_path = index(&path, i);
            if let Some(edu) = self.object(item, &item_path) {
                self.required_str(edu, "year", &item_path);
                self.required_str(edu, "degree", &item_path);
                self.required_str(edu, "institution", &item_path);
            }
        }
    }

    /// Optional array of `{language, level, inferred?}`.
    pub(super) fn languages(&mut self, obj: &Map<String, Value>, path: &str) {
        let Some(items) = self.optional_array(obj, "languages", path) else {
            return;
        };
        let path = key(path, "languages");
        for (i, item) in items.iter().enumerate() {
            let item_path = index(&path, i);
            if let Some(lang) = self.object(item, &item_path) {
                self.required_str(lang, "language", &item_path);
                self.required_str(lang, "level", &item_path);
                self.optional_bool(lang, "inferred", &item_path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_helpers() {
        assert_eq!(key("", "budget"), "budget");
        assert_eq!(key("budget", "text"), "budget.text");
        assert_eq!(index("sections", 3), "sections[3]");
    }

    #[test]
    fn test_span_length_counts_characters() {
        let mut checker = Checker::new(DocType::JobDescription);
        // 4 characters, 5 bytes
        checker.formatting(
            &json!({"bold_spans": [{"start": 0, "end": 4}]}),
            "f",
            Some("Café"),
            false,
        );
        assert!(checker.finish().is_empty());
    }

    #[test]
    fn test_span_start_equal_end() {
        let mut checker = Checker::new(DocType::JobDescription);
        checker.formatting(
            &json!({"bold_spans": [{"start": 2, "end": 2}]}),
            "f",
            Some("abcd"),
            false,
        );
        let errors = checker.finish();
        assert!(errors.has(Constraint::SpanBounds));
    }

    #[test]
    fn test_required_null_is_missing() {
        let mut checker = Checker::new(DocType::AkaziCv);
        let obj = json!({"a": null});
        let map = obj.as_object().unwrap();
        assert!(checker.required(map, "a", "root").is_none());
        assert_eq!(checker.finish().violations[0].path, "root.a");
    }

    #[test]
    fn test_duration_patterns() {
        let mut checker = Checker::new(DocType::AkaziCv);
        let ok = json!({"period": {"duration": "P1Y6M"}});
        checker.period(ok.as_object().unwrap(), "e");
        let bare = json!({"period": {"duration": "P"}});
        checker.period(bare.as_object().unwrap(), "e");
        let reversed = json!({"period": {"duration": "P3M2Y"}});
        checker.period(reversed.as_object().unwrap(), "e");
        let errors = checker.finish();
        assert_eq!(errors.len(), 2);
        assert!(errors.violations.iter().all(|v| v.path == "e.period.duration"));
    }
}
