//! Brazilian-locale numeric conversion and null-marker normalization.
//!
//! Source values look like `1.234,56`: `.` is a thousands separator and `,`
//! the decimal separator. Conversion removes the thousands separators first
//! and only then substitutes the decimal comma; the reverse order would turn
//! `1.234,56` into nonsense.

/// Returns `true` when a trimmed cell equals one of the configured null
/// markers (`*`, `***`, `-`, `ND`, empty string by default).
pub fn is_null_marker(raw: &str, markers: &[String]) -> bool {
    let trimmed = raw.trim();
    markers.iter().any(|m| m == trimmed)
}

/// Parse a Brazilian-formatted numeric string into a finite `f64`.
///
/// Returns `None` for anything that does not survive the transform; a bad
/// cell never aborts the batch, it becomes absent. Non-finite parses (an
/// explicit `inf` in the source, overflow) are rejected as well so that no
/// infinity can reach the dataset.
pub fn parse_br_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = trimmed.replace('.', "").replace(',', ".");
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}
