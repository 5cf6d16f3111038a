//! Canonical testimonial JSON for the display widget.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::header::HeaderMap;
use crate::model::{Source, StoredRecord, TestimonialView};
use crate::parser::parse_csv;
use crate::record::{map_rows, RowFilter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub testimonials: Vec<TestimonialView>,
    pub count: usize,
    pub total_rows_parsed: usize,
    pub skipped_rows: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub skipped_reasons: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_url: Option<String>,
    pub last_updated: String,
}

/// Build the feed from sheet text. Header resolution is lenient here:
/// an unrecognised header falls back to the published sheet's layout.
pub fn build_feed(text: &str, working_url: Option<&str>, now: DateTime<Utc>) -> Feed {
    let grid = parse_csv(text);
    let mapped = match grid.first() {
        Some(header) => {
            let headers = HeaderMap::resolve_or_positional(header);
            map_rows(&grid, &headers, Source::GoogleSheetsSync, RowFilter::AnyContent)
        }
        None => Default::default(),
    };

    let testimonials: Vec<TestimonialView> = mapped.records.iter().map(TestimonialView::from).collect();
    Feed {
        count: testimonials.len(),
        total_rows_parsed: grid.len(),
        skipped_rows: mapped.skipped_count(),
        skipped_reasons: mapped.skipped,
        testimonials,
        working_url: working_url.map(String::from),
        last_updated: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Render published store records in the same shape.
pub fn feed_from_records(records: &[StoredRecord], now: DateTime<Utc>) -> Feed {
    let testimonials: Vec<TestimonialView> = records
        .iter()
        .filter(|r| r.published)
        .map(|r| TestimonialView::from(&r.to_testimonial()))
        .collect();
    Feed {
        count: testimonials.len(),
        total_rows_parsed: records.len(),
        skipped_rows: records.len() - testimonials.len(),
        skipped_reasons: BTreeMap::new(),
        testimonials,
        working_url: None,
        last_updated: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 21, 10, 0, 0).unwrap()
    }

    #[test]
    fn feed_from_sheet() {
        let text = "Date,Review Type,Review,Rating,Name,Mobile\n\
                    21/09/2025,Course,\"Good, really\",5,Santosh,\n\
                    ,,,,,\n\
                    someday,,Short,4,,123\n";
        let feed = build_feed(text, Some("https://sheet/export"), now());
        assert_eq!(feed.count, 2);
        assert_eq!(feed.total_rows_parsed, 4);
        assert_eq!(feed.skipped_rows, 1);
        assert_eq!(feed.testimonials[0].date, "2025-09-21");
        assert_eq!(feed.testimonials[0].review, "Good, really");
        assert_eq!(feed.testimonials[1].date, "someday");
        assert_eq!(feed.testimonials[1].mobile.as_deref(), Some("123"));

        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["workingUrl"], "https://sheet/export");
        assert_eq!(json["lastUpdated"], "2025-09-21T10:00:00.000Z");
        assert_eq!(json["skippedReasons"]["empty_row"], 1);
        assert_eq!(json["testimonials"][0]["reviewType"], "Course");
    }

    #[test]
    fn unknown_header_uses_positional_layout() {
        let feed = build_feed("a,b,c,d,e,f\n2025-09-21,T,Text,3,Meera,\n", None, now());
        assert_eq!(feed.count, 1);
        assert_eq!(feed.testimonials[0].name, "Meera");
        assert_eq!(feed.testimonials[0].rating, 3);
    }

    #[test]
    fn skipped_reasons_omitted_when_nothing_skipped() {
        let feed = build_feed("Date,Review Type,Review,Rating,Name\n2025-09-21,Course,Nice,5,Asha\n", None, now());
        let json = serde_json::to_value(&feed).unwrap();
        assert_eq!(json["skippedRows"], 0);
        assert!(json.get("skippedReasons").is_none());
        assert!(json.get("workingUrl").is_none());
    }

    #[test]
    fn empty_text_yields_empty_feed() {
        let feed = build_feed("", None, now());
        assert_eq!(feed.count, 0);
        assert_eq!(feed.total_rows_parsed, 0);
    }

    #[test]
    fn unpublished_records_hidden() {
        let rec = |name: &str, published| StoredRecord {
            id: name.into(),
            date: Some("2025-09-21".into()),
            review_type: "Course".into(),
            review: "Text".into(),
            rating: 5,
            name: name.into(),
            mobile: String::new(),
            source: Source::WebSubmission,
            published,
            created_at: String::new(),
        };
        let feed = feed_from_records(&[rec("A", true), rec("B", false)], now());
        assert_eq!(feed.count, 1);
        assert_eq!(feed.skipped_rows, 1);
        assert_eq!(feed.testimonials[0].name, "A");
    }
}
