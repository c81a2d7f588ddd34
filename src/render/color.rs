//! Provenance-based color policy.

use crate::error::{Error, Result};
use crate::model::{Color, Role};
use crate::profile::Palette;

/// Resolve the color of one run.
///
/// Exactly one rule applies, in this order:
/// 1. a locked role (the budget line) always takes its role color;
/// 2. an explicit color override;
/// 3. the inferred color when the content is deduced;
/// 4. the role color;
/// 5. the body color.
pub fn resolve_color(role: Role, inferred: bool, explicit: Option<Color>, palette: &Palette) -> Color {
    if role.is_locked() {
        return palette.role(role).unwrap_or(palette.body);
    }
    if let Some(color) = explicit {
        return color;
    }
    if inferred {
        return palette.inferred;
    }
    palette.role(role).unwrap_or(palette.body)
}

/// Check an explicit color override against the palette and provenance.
pub fn check_explicit(explicit: Option<Color>, inferred: bool, palette: &Palette) -> Result<()> {
    let Some(color) = explicit else {
        return Ok(());
    };
    if !palette.contains(color) {
        return Err(Error::Render(format!("color {} is not in the palette", color)));
    }
    if inferred && color != palette.inferred {
        return Err(Error::Render(format!(
            "inferred content cannot be colored {}",
            color
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{FormatCode, FormatProfile};

    fn jd_palette() -> Palette {
        FormatProfile::for_code(FormatCode::JdAkaziFr).palette
    }

    #[test]
    fn test_precedence() {
        let palette = jd_palette();
        let red = Color::rgb(0xC0, 0, 0);
        let navy = Color::rgb(0x00, 0x20, 0x60);

        assert_eq!(resolve_color(Role::Body, false, None, &palette), Color::BLACK);
        assert_eq!(resolve_color(Role::Body, true, None, &palette), palette.inferred);
        assert_eq!(resolve_color(Role::Body, true, Some(navy), &palette), navy);
        assert_eq!(resolve_color(Role::Summary, false, None, &palette), navy);
        assert_eq!(resolve_color(Role::Budget, false, None, &palette), red);
    }

    #[test]
    fn test_budget_locked() {
        let palette = jd_palette();
        let red = Color::rgb(0xC0, 0, 0);
        assert_eq!(resolve_color(Role::Budget, true, None, &palette), red);
        assert_eq!(
            resolve_color(Role::Budget, true, Some(Color::BLACK), &palette),
            red
        );
    }

    #[test]
    fn test_unlisted_role_falls_back_to_body() {
        let palette = jd_palette();
        assert_eq!(resolve_color(Role::Company, false, None, &palette), palette.body);
    }

    #[test]
    fn test_check_explicit() {
        let palette = jd_palette();
        assert!(check_explicit(None, true, &palette).is_ok());
        assert!(check_explicit(Some(palette.inferred), true, &palette).is_ok());
        assert!(check_explicit(Some(Color::BLACK), true, &palette).is_err());
        assert!(check_explicit(Some(Color::rgb(1, 2, 3)), false, &palette).is_err());
    }
}
