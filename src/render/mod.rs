//! Rendering primitives shared by every generator, and IR output.

mod color;
mod json;
mod options;
mod period;
mod spans;
mod text;

pub use color::{check_explicit, resolve_color};
pub use json::{from_json, to_json, JsonFormat};
pub use options::{RenderOptions, DEFAULT_PLACEHOLDER};
pub use period::{duration_months, period_label};
pub use spans::{segment, segment_spans, segment_terms, Segment};
pub use text::to_text;
