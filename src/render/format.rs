//! Shared formatting rules for every renderer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Shown for missing or unreadable dates
pub const UNKNOWN: &str = "Noma'lum";

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse the timestamp shapes the backend emits
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    // Offset-bearing timestamps keep their own wall clock
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    // HTTP-date style, as the backend's JSON encoder emits datetimes
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.naive_local());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// `dd/mm/yyyy, HH:MM`, or [`UNKNOWN`]
pub fn format_date(value: Option<&str>) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%d/%m/%Y, %H:%M").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Group thousands: 12345 → "12,345"
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Percentages come as floats; drop a zero fraction
pub fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}%", value as i64)
    } else {
        format!("{:.1}%", value)
    }
}
