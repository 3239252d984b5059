//! Formatting helpers shared by the TUI and text output.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Render a backend timestamp or date as `YYYY-MM-DD`.
///
/// Accepts RFC 3339, naive ISO date-times and plain dates. Anything else is returned unchanged.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    let date_fmt = format_description!("[year]-[month]-[day]");

    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return dt.date().format(&date_fmt).unwrap_or_else(|_| raw.to_string());
    }
    // Naive ISO date-times (`2026-03-04T05:06:07.123`) and plain dates share the date prefix.
    if let Some(d) = raw.get(..10).and_then(|p| Date::parse(p, &date_fmt).ok()) {
        return d.format(&date_fmt).unwrap_or_else(|_| raw.to_string());
    }
    raw.to_string()
}

/// Shorten to `max` characters, appending an ellipsis when cut.
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
