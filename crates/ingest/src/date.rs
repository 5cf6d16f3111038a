use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Free-text layouts tried after the ISO and day-first shapes.
const TEXT_DATE_FORMATS: &[&str] = &[
    "%B %d, %Y", // September 21, 2025
    "%b %d, %Y", // Sep 21, 2025
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y", // 21 September 2025
    "%d %b %Y",
    "%d-%b-%Y", // 21-Sep-2025
    "%Y/%m/%d",
    "%a %b %d %Y", // Sun Sep 21 2025
];

const TEXT_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

fn iso_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date pattern"))
}

fn day_first_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("valid day-first date pattern")
    })
}

/// Normalize a spreadsheet date cell to `YYYY-MM-DD`.
///
/// - `YYYY-MM-DD` passes through unchanged.
/// - `D/M/YYYY` and `DD/MM/YYYY` are read positionally as day/month/year.
/// - Anything else is tried against a fixed list of textual layouts.
///
/// Returns `None` for blank or unrecognized input; callers keep the row.
pub fn normalize_date(input: &str) -> Option<String> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if iso_re().is_match(s) {
        return Some(s.to_string());
    }

    if let Some(caps) = day_first_re().captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        // Impossible day/month combinations are not retried as month-first.
        return NaiveDate::from_ymd_opt(year, month, day).map(format_iso);
    }

    parse_text_date(s).map(format_iso)
}

fn parse_text_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in TEXT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Every representation a date cell may have been stored under: the trimmed
/// raw text and, when different, its normalized form.
///
/// Reconciliation keys are computed once per form so that `21/09/2025` in a
/// sheet meets `2025-09-21` in the store.
pub fn date_forms(raw: &str) -> Vec<String> {
    let trimmed = raw.trim().to_string();
    let mut forms = vec![trimmed.clone()];
    if let Some(normalized) = normalize_date(&trimmed) {
        if normalized != trimmed {
            forms.push(normalized);
        }
    }
    forms
}
