//! Content building blocks shared by every record type.

use super::Color;
use serde::{Deserialize, Deserializer, Serialize};

/// Read an explicit `null` as the field's default, matching how the
/// validator treats `null` on optional fields.
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A half-open `[start, end)` range of characters to embolden.
///
/// Offsets count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoldSpan {
    /// First emboldened character
    pub start: usize,
    /// One past the last emboldened character
    pub end: usize,
}

impl BoldSpan {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Emphasis and color directives attached to one text field.
///
/// `bold_terms` and `bold_spans` are mutually exclusive on the same field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formatting {
    /// Exact substrings to embolden (first occurrence of each)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold_terms: Option<Vec<String>>,

    /// Explicit character ranges to embolden
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold_spans: Option<Vec<BoldSpan>>,

    /// Explicit color override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl Formatting {
    /// Formatting that emboldens the given terms.
    pub fn terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bold_terms: Some(terms.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    /// Formatting that emboldens the given spans.
    pub fn spans(spans: Vec<BoldSpan>) -> Self {
        Self {
            bold_spans: Some(spans),
            ..Default::default()
        }
    }
}

/// A bullet, given either as bare text or as a structured item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulletEntry {
    /// Plain bullet text
    Text(String),
    /// Structured bullet
    Item(BulletItem),
}

impl BulletEntry {
    /// Bullet text.
    pub fn text(&self) -> &str {
        match self {
            BulletEntry::Text(text) => text,
            BulletEntry::Item(item) => &item.text,
        }
    }

    /// Provenance flag (bare strings are explicit).
    pub fn inferred(&self) -> bool {
        match self {
            BulletEntry::Text(_) => false,
            BulletEntry::Item(item) => item.inferred,
        }
    }

    /// Formatting directives, if any.
    pub fn formatting(&self) -> Option<&Formatting> {
        match self {
            BulletEntry::Text(_) => None,
            BulletEntry::Item(item) => item.formatting.as_ref(),
        }
    }

    /// Nested items (empty for bare strings).
    pub fn sub_items(&self) -> &[BulletEntry] {
        match self {
            BulletEntry::Text(_) => &[],
            BulletEntry::Item(item) => &item.sub_items,
        }
    }
}

impl From<&str> for BulletEntry {
    fn from(text: &str) -> Self {
        BulletEntry::Text(text.to_string())
    }
}

impl From<BulletItem> for BulletEntry {
    fn from(item: BulletItem) -> Self {
        BulletEntry::Item(item)
    }
}

/// A structured bullet with optional sub-items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulletItem {
    /// Bullet text
    pub text: String,

    /// One level of nested bullets
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sub_items: Vec<BulletEntry>,

    /// Emphasis directives for `text`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting: Option<Formatting>,

    /// Whether the content was deduced rather than quoted from the source
    #[serde(default, deserialize_with = "null_as_default")]
    pub inferred: bool,
}

impl BulletItem {
    /// Create a bullet with plain text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Attach formatting.
    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = Some(formatting);
        self
    }

    /// Mark as inferred.
    pub fn inferred(mut self) -> Self {
        self.inferred = true;
        self
    }

    /// Append a sub-item.
    pub fn with_sub_item(mut self, item: impl Into<BulletEntry>) -> Self {
        self.sub_items.push(item.into());
        self
    }
}

/// Paragraph text, bare or with formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    /// Plain paragraph
    Plain(String),
    /// Paragraph with formatting
    Formatted {
        /// Paragraph text
        text: String,
        /// Emphasis directives
        #[serde(default)]
        formatting: Option<Formatting>,
    },
}

impl RichText {
    /// Paragraph text.
    pub fn text(&self) -> &str {
        match self {
            RichText::Plain(text) => text,
            RichText::Formatted { text, .. } => text,
        }
    }

    /// Formatting directives, if any.
    pub fn formatting(&self) -> Option<&Formatting> {
        match self {
            RichText::Plain(_) => None,
            RichText::Formatted { formatting, .. } => formatting.as_ref(),
        }
    }
}

/// A technology mention, bare or grouped with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TechEntry {
    /// Bare technology list
    Text(String),
    /// Grouped technologies
    Group {
        /// Optional grouping label (e.g. "Cloud")
        #[serde(default)]
        category: Option<String>,
        /// Comma-separated technologies
        technologies: String,
        /// Deduced rather than listed in the source
        #[serde(default, deserialize_with = "null_as_default")]
        inferred: bool,
    },
}

impl TechEntry {
    /// Technology text.
    pub fn text(&self) -> &str {
        match self {
            TechEntry::Text(text) => text,
            TechEntry::Group { technologies, .. } => technologies,
        }
    }

    /// Provenance flag.
    pub fn inferred(&self) -> bool {
        matches!(self, TechEntry::Group { inferred: true, .. })
    }
}

/// An employment or mission period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Start month as `YYYY-MM`
    #[serde(default)]
    pub start: Option<String>,
    /// End month as `YYYY-MM`; absent means ongoing
    #[serde(default)]
    pub end: Option<String>,
    /// Pre-formatted label that takes precedence over start/end
    #[serde(default)]
    pub formatted: Option<String>,
    /// ISO-8601 duration such as `P2Y3M`
    #[serde(default)]
    pub duration: Option<String>,
}

/// A diploma line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Education {
    /// Graduation year
    pub year: String,
    /// Degree title
    pub degree: String,
    /// Awarding institution
    pub institution: String,
}

/// A certification, bare or with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Certification {
    /// Bare certification name
    Text(String),
    /// Certification with provenance
    Item {
        /// Certification name
        text: String,
        /// Deduced rather than listed in the source
        #[serde(default, deserialize_with = "null_as_default")]
        inferred: bool,
    },
}

impl Certification {
    /// Certification text.
    pub fn text(&self) -> &str {
        match self {
            Certification::Text(text) => text,
            Certification::Item { text, .. } => text,
        }
    }

    /// Provenance flag.
    pub fn inferred(&self) -> bool {
        matches!(self, Certification::Item { inferred: true, .. })
    }
}

/// A spoken language with level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageSkill {
    /// Language name
    pub language: String,
    /// Proficiency level
    pub level: String,
    /// Deduced rather than stated in the source
    #[serde(default, deserialize_with = "null_as_default")]
    pub inferred: bool,
}

/// A functional domain covered by a mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// Domain name
    pub domain: String,
    /// Deduced rather than stated in the source
    #[serde(default, deserialize_with = "null_as_default")]
    pub inferred: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_reads_as_default() {
        let entry: BulletEntry =
            serde_json::from_value(json!({"text": "Cadrage", "inferred": null, "sub_items": null}))
                .unwrap();
        assert_eq!(entry.text(), "Cadrage");
        assert!(!entry.inferred());
        assert!(entry.sub_items().is_empty());
    }

    #[test]
    fn test_bullet_entry_untagged() {
        let entries: Vec<BulletEntry> = serde_json::from_value(json!([
            "plain",
            {"text": "structured", "inferred": true, "sub_items": ["child"]}
        ]))
        .unwrap();

        assert_eq!(entries[0].text(), "plain");
        assert!(!entries[0].inferred());
        assert_eq!(entries[1].text(), "structured");
        assert!(entries[1].inferred());
        assert_eq!(entries[1].sub_items().len(), 1);
    }

    #[test]
    fn test_formatting_presence_is_preserved() {
        let f: Formatting = serde_json::from_value(json!({
            "bold_spans": [{"start": 0, "end": 4}]
        }))
        .unwrap();
        assert!(f.bold_terms.is_none());
        assert_eq!(f.bold_spans, Some(vec![BoldSpan::new(0, 4)]));
    }

    #[test]
    fn test_tech_entry_variants() {
        let techs: Vec<TechEntry> = serde_json::from_value(json!([
            "Python, SQL",
            {"category": "Cloud", "technologies": "Azure", "inferred": true}
        ]))
        .unwrap();
        assert!(!techs[0].inferred());
        assert!(techs[1].inferred());
        assert_eq!(techs[1].text(), "Azure");
    }

    #[test]
    fn test_rich_text_variants() {
        let plain: RichText = serde_json::from_value(json!("hello")).unwrap();
        assert!(plain.formatting().is_none());

        let formatted: RichText = serde_json::from_value(json!({
            "text": "hello world",
            "formatting": {"bold_terms": ["world"]}
        }))
        .unwrap();
        assert_eq!(formatted.text(), "hello world");
        assert!(formatted.formatting().is_some());
    }
}
