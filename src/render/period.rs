//! Localized period labels and durations.

use crate::model::Period;
use crate::profile::Vocabulary;
use chrono::NaiveDate;

/// Parse a `YYYY-MM` month.
fn parse_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()
}

fn month_label(value: &str, vocab: &Vocabulary) -> String {
    use chrono::Datelike;
    match parse_month(value) {
        Some(date) => match vocab.month(date.month()) {
            Some(name) => format!("{} {}", name, date.year()),
            None => value.to_string(),
        },
        None => value.to_string(),
    }
}

/// Human-readable label for a period.
///
/// A non-blank `formatted` value wins; otherwise the label is built from the
/// start and end months (a missing end means ongoing). Returns `None` when
/// the period carries nothing to display.
pub fn period_label(period: &Period, vocab: &Vocabulary) -> Option<String> {
    if let Some(formatted) = period.formatted.as_deref().map(str::trim) {
        if !formatted.is_empty() {
            return Some(formatted.to_string());
        }
    }

    match (period.start.as_deref(), period.end.as_deref()) {
        (Some(start), Some(end)) => Some(format!(
            "{}{}{}",
            month_label(start, vocab),
            vocab.period_separator,
            month_label(end, vocab)
        )),
        (Some(start), None) => Some(format!(
            "{}{}{}",
            month_label(start, vocab),
            vocab.period_separator,
            vocab.ongoing
        )),
        (None, Some(end)) => Some(month_label(end, vocab)),
        (None, None) => None,
    }
}

/// Parse an ISO 8601 `P[nY][nM]` duration into months.
///
/// Years must precede months and each unit appears at most once; `None`
/// for anything else, including a bare `P` and overflowing values.
pub fn duration_months(duration: &str) -> Option<u32> {
    let body = duration.strip_prefix('P')?;
    if body.is_empty() {
        return None;
    }
    let mut months = 0u32;
    let mut number = String::new();
    let mut seen_years = false;
    let mut seen_months = false;
    for c in body.chars() {
        match c {
            '0'..='9' if !seen_months => number.push(c),
            'Y' if !seen_years => {
                months = months.checked_add(number.parse::<u32>().ok()?.checked_mul(12)?)?;
                number.clear();
                seen_years = true;
            }
            'M' if !seen_months => {
                months = months.checked_add(number.parse::<u32>().ok()?)?;
                number.clear();
                seen_months = true;
            }
            _ => return None,
        }
    }
    number.is_empty().then_some(months)
}
