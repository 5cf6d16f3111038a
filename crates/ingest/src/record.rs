//! Grid rows → testimonial records.

use std::collections::BTreeMap;

use crate::date::normalize_date;
use crate::header::{Field, HeaderMap};
use crate::model::{Source, Testimonial, DEFAULT_REVIEW_TYPE, MAX_RATING};

/// Which rows carry enough content to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    /// Keep rows with any non-empty field (display feed).
    AnyContent,
    /// Keep rows with a name or a review (bulk import).
    NameOrReview,
    /// Keep rows with a name (sheet sync, repair ground truth).
    NameRequired,
}

impl RowFilter {
    /// Reason a mapped row is dropped under this filter, if any.
    fn reject(&self, t: &Testimonial, raw_type: &str) -> Option<&'static str> {
        match self {
            Self::AnyContent => {
                let empty = t.date_raw.trim().is_empty()
                    && raw_type.is_empty()
                    && t.review.is_empty()
                    && t.name.is_empty()
                    && t.mobile.is_empty();
                empty.then_some("all_fields_empty")
            }
            Self::NameOrReview => {
                (t.name.is_empty() && t.review.is_empty()).then_some("no_name_or_review")
            }
            Self::NameRequired => t.name.is_empty().then_some("no_name"),
        }
    }
}

/// Records mapped from one grid plus what was left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedRows {
    pub records: Vec<Testimonial>,
    /// Data rows seen (header excluded).
    pub total_rows: usize,
    pub skipped: BTreeMap<String, usize>,
}

impl MappedRows {
    pub fn skipped_count(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Parse a rating cell with leading-integer semantics: `"5"`, `" 4 stars"`
/// and `"4.5"` read as 5, 4 and 4. Unparseable or out-of-range → 0.
pub fn parse_rating(text: &str) -> i64 {
    let s = text.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(n) if (0..=MAX_RATING).contains(&(sign * n)) => sign * n,
        _ => 0,
    }
}

/// Coerce one data row. Never fails: unparseable fields fall back to
/// defaults.
pub fn map_row(row: &[String], headers: &HeaderMap, source: Source) -> Testimonial {
    let date_raw = headers.cell(row, Field::Date).to_string();
    let review_type = headers.cell(row, Field::ReviewType);
    Testimonial {
        date: normalize_date(&date_raw),
        date_raw,
        review_type: if review_type.is_empty() {
            DEFAULT_REVIEW_TYPE.to_string()
        } else {
            review_type.to_string()
        },
        review: headers.cell(row, Field::Review).to_string(),
        rating: parse_rating(headers.cell(row, Field::Rating)),
        name: headers.cell(row, Field::Name).to_string(),
        mobile: headers.cell(row, Field::Mobile).to_string(),
        source,
        published: true,
    }
}

/// Map every data row (all rows after the first) of a grid.
pub fn map_rows(
    rows: &[Vec<String>],
    headers: &HeaderMap,
    source: Source,
    filter: RowFilter,
) -> MappedRows {
    let mut out = MappedRows {
        total_rows: rows.len().saturating_sub(1),
        ..Default::default()
    };

    for row in rows.iter().skip(1) {
        if row.iter().all(|f| f.is_empty()) {
            *out.skipped.entry("empty_row".into()).or_insert(0) += 1;
            continue;
        }

        let record = map_row(row, headers, source);
        if let Some(reason) = filter.reject(&record, headers.cell(row, Field::ReviewType)) {
            *out.skipped.entry(reason.into()).or_insert(0) += 1;
            continue;
        }
        out.records.push(record);
    }

    if out.skipped_count() > 0 {
        log::debug!("skipped {} of {} rows: {:?}", out.skipped_count(), out.total_rows, out.skipped);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv;

    const SHEET: &str = "\
Date,Review Type,Review,Rating,Name,Mobile Number
21/09/2025,Course Review,Clear and practical,5,Santosh,9876500000
2025-09-22,,,4,Meera,
,,,,,
23/09/2025,Course Review,Anonymous praise,5,,
24/09/2025,Course Review,,3,,
";

    fn mapped(filter: RowFilter) -> MappedRows {
        let grid = parse_csv(SHEET);
        let headers = HeaderMap::resolve(&grid[0]).unwrap();
        map_rows(&grid, &headers, Source::ImportCsv, filter)
    }

    #[test]
    fn rating_leading_integer() {
        assert_eq!(parse_rating("5"), 5);
        assert_eq!(parse_rating(" 4 stars"), 4);
        assert_eq!(parse_rating("4.5"), 4);
        assert_eq!(parse_rating("+3"), 3);
        assert_eq!(parse_rating(""), 0);
        assert_eq!(parse_rating("five"), 0);
        assert_eq!(parse_rating("9"), 0);
        assert_eq!(parse_rating("-1"), 0);
    }

    #[test]
    fn name_with_empty_review_retained() {
        let out = mapped(RowFilter::NameOrReview);
        let meera = out.records.iter().find(|r| r.name == "Meera").unwrap();
        assert_eq!(meera.review, "");
        assert_eq!(meera.review_type, DEFAULT_REVIEW_TYPE);
        assert_eq!(meera.date.as_deref(), Some("2025-09-22"));
    }

    #[test]
    fn empty_name_and_review_dropped() {
        let out = mapped(RowFilter::NameOrReview);
        assert_eq!(out.total_rows, 5);
        // Santosh, Meera, anonymous review
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.skipped.get("empty_row"), Some(&1));
        assert_eq!(out.skipped.get("no_name_or_review"), Some(&1));
    }

    #[test]
    fn name_required_drops_anonymous() {
        let out = mapped(RowFilter::NameRequired);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.skipped.get("no_name"), Some(&2));
    }

    #[test]
    fn any_content_keeps_partial_rows() {
        let out = mapped(RowFilter::AnyContent);
        assert_eq!(out.records.len(), 4);
        assert_eq!(out.skipped_count(), 1);
    }

    #[test]
    fn date_normalized_and_raw_kept() {
        let out = mapped(RowFilter::NameOrReview);
        let santosh = &out.records[0];
        assert_eq!(santosh.date.as_deref(), Some("2025-09-21"));
        assert_eq!(santosh.date_raw, "21/09/2025");
        assert_eq!(santosh.mobile, "9876500000");
        assert_eq!(santosh.source, Source::ImportCsv);
        assert!(santosh.published);
    }

    #[test]
    fn short_row_reads_missing_cells_as_empty() {
        let grid = parse_csv("Date,Review Type,Review,Rating,Name\n2025-09-21,Course,Nice\n");
        let headers = HeaderMap::resolve(&grid[0]).unwrap();
        let out = map_rows(&grid, &headers, Source::ImportCsv, RowFilter::NameOrReview);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].rating, 0);
        assert_eq!(out.records[0].name, "");
    }

    #[test]
    fn unparseable_date_keeps_row() {
        let grid = parse_csv("Date,Review Type,Review,Rating,Name\nsometime,Course,Nice,5,Asha\n");
        let headers = HeaderMap::resolve(&grid[0]).unwrap();
        let out = map_rows(&grid, &headers, Source::ImportCsv, RowFilter::NameRequired);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].date, None);
        assert_eq!(out.records[0].display_date(), "sometime");
    }
}
