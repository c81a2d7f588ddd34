//! Format profiles: the visual constants of each named output style.

mod vocabulary;

pub use vocabulary::{section_title, vocabulary, Vocabulary};

use crate::detect::DocType;
use crate::error::{Error, Result};
use crate::model::{Color, Language, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Target output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormatCode {
    /// Job posting, French vocabulary
    #[serde(rename = "JD-AKAZI-FR")]
    JdAkaziFr,
    /// Job posting, English vocabulary
    #[serde(rename = "JD-AKAZI-EN")]
    JdAkaziEn,
    /// Style A CV
    #[serde(rename = "CV-AKAZI")]
    CvAkazi,
    /// Style B CV
    #[serde(rename = "CV-MC2I")]
    CvMc2i,
}

impl FormatCode {
    /// Every format code, in registry order.
    pub fn all() -> &'static [FormatCode] {
        &[
            FormatCode::JdAkaziFr,
            FormatCode::JdAkaziEn,
            FormatCode::CvAkazi,
            FormatCode::CvMc2i,
        ]
    }

    /// Canonical code string.
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatCode::JdAkaziFr => "JD-AKAZI-FR",
            FormatCode::JdAkaziEn => "JD-AKAZI-EN",
            FormatCode::CvAkazi => "CV-AKAZI",
            FormatCode::CvMc2i => "CV-MC2I",
        }
    }

    /// Document type this format renders.
    pub fn doc_type(&self) -> DocType {
        match self {
            FormatCode::JdAkaziFr | FormatCode::JdAkaziEn => DocType::JobDescription,
            FormatCode::CvAkazi => DocType::AkaziCv,
            FormatCode::CvMc2i => DocType::Mc2iCv,
        }
    }

    /// Language imposed by the format, if any.
    ///
    /// Formats without a fixed language follow the record's declared language.
    pub fn fixed_language(&self) -> Option<Language> {
        match self {
            FormatCode::JdAkaziFr => Some(Language::French),
            FormatCode::JdAkaziEn => Some(Language::English),
            FormatCode::CvAkazi | FormatCode::CvMc2i => None,
        }
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase();
        FormatCode::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::Other(format!("Unknown format code: {}", s)))
    }
}

/// Font family and sizes in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    /// Font family
    pub name: String,
    /// Body text size
    pub body_size: f32,
    /// Section heading size
    pub heading_size: f32,
    /// Document title size
    pub title_size: f32,
}

/// Page margins in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    /// Same margin on every side.
    pub fn uniform(cm: f32) -> Self {
        Self {
            top: cm,
            right: cm,
            bottom: cm,
            left: cm,
        }
    }
}

/// Page size and margins in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Page margins
    pub margins: Margins,
}

impl PageGeometry {
    /// A4 portrait with uniform margins.
    pub fn a4(margin: f32) -> Self {
        Self {
            width: 21.0,
            height: 29.7,
            margins: Margins::uniform(margin),
        }
    }
}

/// Indentation of one bullet level, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indent {
    /// Left indent
    pub left: f32,
    /// First-line indent (negative for a hanging bullet)
    pub first_line: f32,
}

/// Bullet glyphs per nesting level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletGlyphs {
    /// Top-level glyph
    pub level1: String,
    /// Sub-item glyph
    pub level2: String,
}

/// Colors available to a format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Default running-text color
    pub body: Color,
    /// Color marking deduced content
    pub inferred: Color,
    /// Per-role colors; roles not listed fall back to `body`
    pub roles: BTreeMap<Role, Color>,
    /// Further colors accepted as explicit overrides
    #[serde(default)]
    pub accents: Vec<Color>,
}

impl Palette {
    /// Color assigned to a role.
    pub fn role(&self, role: Role) -> Option<Color> {
        self.roles.get(&role).copied()
    }

    /// Check whether a color belongs to this palette.
    pub fn contains(&self, color: Color) -> bool {
        color == self.body
            || color == self.inferred
            || self.roles.values().any(|c| *c == color)
            || self.accents.contains(&color)
    }

    /// All distinct palette colors.
    pub fn colors(&self) -> Vec<Color> {
        let mut colors = vec![self.body, self.inferred];
        colors.extend(self.roles.values().copied());
        colors.extend(self.accents.iter().copied());
        let mut seen = Vec::with_capacity(colors.len());
        for c in colors {
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }
}

/// Visual constants of one output style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatProfile {
    /// Format code
    pub code: FormatCode,
    /// Profile revision; changing it invalidates cached renders
    pub version: String,
    /// Font family and sizes
    pub font: Font,
    /// Page size and margins
    pub page: PageGeometry,
    /// Line spacing multiple
    pub line_spacing: f32,
    /// Colors
    pub palette: Palette,
    /// Indentation per bullet level (index 0 = level 1)
    pub indents: Vec<Indent>,
    /// Bullet glyphs
    pub bullets: BulletGlyphs,
}

const RED: Color = Color::rgb(0xC0, 0x00, 0x00);
const NAVY: Color = Color::rgb(0x00, 0x20, 0x60);
const ORANGE: Color = Color::rgb(0xFF, 0x8C, 0x00);
const GOLD: Color = Color::rgb(0xCC, 0x99, 0x00);
const MAGENTA: Color = Color::rgb(0xDD, 0x00, 0x61);
const TEAL: Color = Color::rgb(0x00, 0x6A, 0x9E);
const SLATE: Color = Color::rgb(0x57, 0x58, 0x56);

impl FormatProfile {
    /// Built-in profile for a format code.
    pub fn for_code(code: FormatCode) -> Self {
        match code {
            FormatCode::JdAkaziFr | FormatCode::JdAkaziEn => Self::job_description(code),
            FormatCode::CvAkazi => Self::akazi_cv(),
            FormatCode::CvMc2i => Self::mc2i_cv(),
        }
    }

    fn job_description(code: FormatCode) -> Self {
        let roles = BTreeMap::from([
            (Role::Title, Color::BLACK),
            (Role::SectionHeading, Color::BLACK),
            (Role::Budget, RED),
            (Role::Summary, NAVY),
            (Role::Label, Color::BLACK),
        ]);
        Self {
            code,
            version: "3.0.0".to_string(),
            font: Font {
                name: "Century Gothic".to_string(),
                body_size: 10.0,
                heading_size: 12.0,
                title_size: 14.0,
            },
            page: PageGeometry::a4(2.54),
            line_spacing: 1.15,
            palette: Palette {
                body: Color::BLACK,
                inferred: ORANGE,
                roles,
                accents: Vec::new(),
            },
            indents: vec![
                Indent {
                    left: 1.0,
                    first_line: -0.5,
                },
                Indent {
                    left: 1.5,
                    first_line: -0.5,
                },
            ],
            bullets: BulletGlyphs {
                level1: "*".to_string(),
                level2: "-".to_string(),
            },
        }
    }

    fn akazi_cv() -> Self {
        let roles = BTreeMap::from([
            (Role::Title, RED),
            (Role::SectionHeading, RED),
            (Role::Company, NAVY),
            (Role::Period, NAVY),
            (Role::Position, NAVY),
            (Role::Summary, NAVY),
            (Role::Label, Color::BLACK),
        ]);
        Self {
            code: FormatCode::CvAkazi,
            version: "1.0.0".to_string(),
            font: Font {
                name: "Century Gothic".to_string(),
                body_size: 9.0,
                heading_size: 11.0,
                title_size: 11.0,
            },
            page: PageGeometry::a4(1.27),
            line_spacing: 1.0,
            palette: Palette {
                body: Color::BLACK,
                inferred: ORANGE,
                roles,
                accents: vec![GOLD],
            },
            indents: vec![
                Indent {
                    left: 0.5,
                    first_line: -0.5,
                },
                Indent {
                    left: 1.5,
                    first_line: -0.5,
                },
            ],
            bullets: BulletGlyphs {
                level1: "•".to_string(),
                level2: "-".to_string(),
            },
        }
    }

    fn mc2i_cv() -> Self {
        let roles = BTreeMap::from([
            (Role::Title, MAGENTA),
            (Role::SectionHeading, SLATE),
            (Role::Company, MAGENTA),
            (Role::Position, TEAL),
            (Role::Period, TEAL),
            (Role::Label, SLATE),
            (Role::Separator, MAGENTA),
        ]);
        Self {
            code: FormatCode::CvMc2i,
            version: "1.0.0".to_string(),
            font: Font {
                name: "Lato".to_string(),
                body_size: 10.0,
                heading_size: 12.0,
                title_size: 16.0,
            },
            page: PageGeometry::a4(2.54),
            line_spacing: 1.15,
            palette: Palette {
                body: SLATE,
                inferred: ORANGE,
                roles,
                accents: Vec::new(),
            },
            indents: vec![
                Indent {
                    left: 0.63,
                    first_line: -0.63,
                },
                Indent {
                    left: 1.27,
                    first_line: -0.63,
                },
            ],
            bullets: BulletGlyphs {
                level1: "•".to_string(),
                level2: "-".to_string(),
            },
        }
    }

    /// Glyph for a bullet level (1-based); deeper levels reuse level 2.
    pub fn glyph(&self, level: u8) -> &str {
        if level <= 1 {
            &self.bullets.level1
        } else {
            &self.bullets.level2
        }
    }

    /// Deepest bullet level this profile can lay out.
    pub fn max_level(&self) -> u8 {
        self.indents.len() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_code_parse() {
        assert_eq!("cv-mc2i".parse::<FormatCode>().unwrap(), FormatCode::CvMc2i);
        assert_eq!(
            "JD-AKAZI-FR".parse::<FormatCode>().unwrap(),
            FormatCode::JdAkaziFr
        );
        assert!("CV-EUROPASS".parse::<FormatCode>().is_err());
    }

    #[test]
    fn test_format_code_serde() {
        let json = serde_json::to_string(&FormatCode::JdAkaziEn).unwrap();
        assert_eq!(json, "\"JD-AKAZI-EN\"");
    }

    #[test]
    fn test_every_profile_has_two_levels() {
        for code in FormatCode::all() {
            let profile = FormatProfile::for_code(*code);
            assert_eq!(profile.code, *code);
            assert_eq!(profile.max_level(), 2);
            assert_ne!(profile.glyph(1), "");
        }
    }

    #[test]
    fn test_palette_membership() {
        let profile = FormatProfile::for_code(FormatCode::JdAkaziFr);
        assert!(profile.palette.contains(RED));
        assert!(profile.palette.contains(ORANGE));
        assert!(!profile.palette.contains(MAGENTA));
        assert_eq!(profile.palette.role(Role::Budget), Some(RED));

        let mc2i = FormatProfile::for_code(FormatCode::CvMc2i);
        assert_eq!(mc2i.palette.body, SLATE);
        assert!(mc2i.palette.colors().contains(&TEAL));
    }
}
