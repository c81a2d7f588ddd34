//! Bold segmentation of text by terms or explicit character spans.

use crate::error::{Error, Result};
use crate::model::{BoldSpan, Formatting};
use std::ops::Range;

/// A slice of the source text with its emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Text slice, borrowed from the source
    pub text: &'a str,
    /// Whether the slice is emboldened
    pub bold: bool,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str) -> Self {
        Self { text, bold: false }
    }

    fn bold(text: &'a str) -> Self {
        Self { text, bold: true }
    }
}

/// Embolden the first verbatim occurrence of each term.
///
/// Matching is case-sensitive and always runs against the original text, so
/// terms can overlap; overlapping or touching matches merge into a single
/// bold segment. Terms that do not occur are skipped with a warning.
///
/// # Example
/// ```
/// use housestyle::render::segment_terms;
///
/// let segments = segment_terms("Pilot the MDM strategy.", &["MDM".to_string()]);
/// assert_eq!(segments.len(), 3);
/// assert!(segments[1].bold);
/// assert_eq!(segments[1].text, "MDM");
/// ```
pub fn segment_terms<'a>(text: &'a str, terms: &[String]) -> Vec<Segment<'a>> {
    let mut ranges: Vec<Range<usize>> = Vec::with_capacity(terms.len());
    for term in terms {
        if term.is_empty() {
            continue;
        }
        match text.find(term.as_str()) {
            Some(start) => ranges.push(start..start + term.len()),
            None => log::warn!("Bold term '{}' not found in text, skipping", term),
        }
    }
    split(text, merge(ranges))
}

/// Embolden explicit `[start, end)` character ranges.
///
/// Offsets count characters. Spans outside the text, empty spans and
/// overlapping spans fail with [`Error::Render`]; nothing is clamped.
pub fn segment_spans<'a>(text: &'a str, spans: &[BoldSpan]) -> Result<Vec<Segment<'a>>> {
    // Byte offset of every character boundary, including the end of text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_len = boundaries.len() - 1;

    let mut sorted = spans.to_vec();
    sorted.sort_by_key(|s| (s.start, s.end));

    let mut ranges = Vec::with_capacity(sorted.len());
    let mut previous_end = 0;
    for span in &sorted {
        if span.start >= span.end || span.end > char_len {
            return Err(Error::Render(format!(
                "bold span [{}, {}) is invalid for text of {} characters",
                span.start, span.end, char_len
            )));
        }
        if span.start < previous_end {
            return Err(Error::Render(format!(
                "bold span [{}, {}) overlaps a previous span",
                span.start, span.end
            )));
        }
        previous_end = span.end;
        ranges.push(boundaries[span.start]..boundaries[span.end]);
    }

    Ok(split(text, merge(ranges)))
}

/// Segment text according to an optional formatting descriptor.
///
/// Without bold directives the whole text is one plain segment.
pub fn segment<'a>(text: &'a str, formatting: Option<&Formatting>) -> Result<Vec<Segment<'a>>> {
    let Some(formatting) = formatting else {
        return Ok(vec![Segment::plain(text)]);
    };
    match (&formatting.bold_terms, &formatting.bold_spans) {
        (Some(_), Some(_)) => Err(Error::Render(
            "bold_terms and bold_spans cannot be combined on one field".into(),
        )),
        (Some(terms), None) => Ok(segment_terms(text, terms)),
        (None, Some(spans)) => segment_spans(text, spans),
        (None, None) => Ok(vec![Segment::plain(text)]),
    }
}

/// Sort and merge overlapping or adjacent byte ranges.
fn merge(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| (r.start, r.end));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

/// Split text into alternating plain and bold segments.
fn split(text: &str, bold: Vec<Range<usize>>) -> Vec<Segment<'_>> {
    let mut segments = Vec::with_capacity(bold.len() * 2 + 1);
    let mut cursor = 0;
    for range in bold {
        if range.start > cursor {
            segments.push(Segment::plain(&text[cursor..range.start]));
        }
        segments.push(Segment::bold(&text[range.start..range.end]));
        cursor = range.end;
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}
