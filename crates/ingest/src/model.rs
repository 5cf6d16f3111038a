use std::collections::BTreeMap;

use serde::Serialize;

use crate::date::normalize_date;

/// Review type written when a sheet row leaves the column blank.
pub const DEFAULT_REVIEW_TYPE: &str = "Demo Feedback Review";

/// Ratings outside this range are coerced to 0 ("unrated").
pub const MAX_RATING: i64 = 5;

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Submitted through the feedback form.
    WebSubmission,
    /// Bulk import of a local spreadsheet export.
    ImportCsv,
    /// Incremental sync from the published sheet.
    GoogleSheetsSync,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSubmission => "web-submission",
            Self::ImportCsv => "import-csv",
            Self::GoogleSheetsSync => "google-sheets-sync",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "web-submission" => Some(Self::WebSubmission),
            "import-csv" => Some(Self::ImportCsv),
            "google-sheets-sync" => Some(Self::GoogleSheetsSync),
            _ => None,
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A testimonial as produced by one parse pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Testimonial {
    /// Normalized `YYYY-MM-DD`, absent when the raw cell was unparseable.
    pub date: Option<String>,
    /// The date cell as written in the source.
    pub date_raw: String,
    pub review_type: String,
    pub review: String,
    pub rating: i64,
    pub name: String,
    pub mobile: String,
    pub source: Source,
    pub published: bool,
}

impl Testimonial {
    /// Date shown to readers: the normalized form, else the raw text.
    pub fn display_date(&self) -> &str {
        self.date.as_deref().unwrap_or(self.date_raw.trim())
    }

    /// Value persisted in the store's date column: the normalized date,
    /// else the raw text so later passes can still key on it.
    pub fn stored_date(&self) -> Option<String> {
        let shown = self.display_date();
        (!shown.is_empty()).then(|| shown.to_string())
    }
}

/// A testimonial as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: String,
    pub date: Option<String>,
    pub review_type: String,
    pub review: String,
    pub rating: i64,
    pub name: String,
    pub mobile: String,
    pub source: Source,
    pub published: bool,
    pub created_at: String,
}

impl StoredRecord {
    /// Reinterpret as a fresh testimonial (used by display paths).
    pub fn to_testimonial(&self) -> Testimonial {
        let date_raw = self.date.clone().unwrap_or_default();
        Testimonial {
            date: self.date.as_deref().and_then(normalize_date),
            date_raw,
            review_type: self.review_type.clone(),
            review: self.review.clone(),
            rating: self.rating,
            name: self.name.clone(),
            mobile: self.mobile.clone(),
            source: self.source,
            published: self.published,
        }
    }
}

/// Field-level update. Records are never rewritten wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub review: Option<String>,
    pub published: Option<bool>,
}

impl RecordPatch {
    pub fn review(text: impl Into<String>) -> Self {
        Self {
            review: Some(text.into()),
            published: None,
        }
    }

    pub fn published(published: bool) -> Self {
        Self {
            review: None,
            published: Some(published),
        }
    }
}

/// Selection criterion for [`crate::store::RecordStore::select`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub source: Option<Source>,
    pub published: Option<bool>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn source(source: Source) -> Self {
        Self {
            source: Some(source),
            published: None,
        }
    }

    pub fn published() -> Self {
        Self {
            source: None,
            published: Some(true),
        }
    }

    pub fn matches(&self, record: &StoredRecord) -> bool {
        self.source.map_or(true, |s| s == record.source)
            && self.published.map_or(true, |p| p == record.published)
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Canonical JSON shape consumed by the testimonial widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialView {
    pub date: String,
    pub review_type: String,
    pub review: String,
    pub rating: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&Testimonial> for TestimonialView {
    fn from(t: &Testimonial) -> Self {
        Self {
            date: t.display_date().to_string(),
            review_type: t.review_type.clone(),
            review: t.review.clone(),
            rating: t.rating,
            name: t.name.clone(),
            mobile: (!t.mobile.is_empty()).then(|| t.mobile.clone()),
            image: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Which item a persistence error refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRef {
    /// Position in the prepared batch.
    Index(usize),
    /// Store id of an existing record.
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordError {
    #[serde(flatten)]
    pub at: ErrorRef,
    pub message: String,
}

/// Outcome of an import, sync or repair pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub total_parsed: usize,
    pub total_prepared: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub skipped_reasons: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RecordError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_source: Option<String>,
}

impl IngestReport {
    /// True when at least one record failed to persist.
    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn testimonial(date: Option<&str>, raw: &str) -> Testimonial {
        Testimonial {
            date: date.map(String::from),
            date_raw: raw.into(),
            review_type: DEFAULT_REVIEW_TYPE.into(),
            review: "Loved it".into(),
            rating: 5,
            name: "Santosh".into(),
            mobile: String::new(),
            source: Source::ImportCsv,
            published: true,
        }
    }

    #[test]
    fn source_round_trips_through_str() {
        for s in [Source::WebSubmission, Source::ImportCsv, Source::GoogleSheetsSync] {
            assert_eq!(Source::parse(s.as_str()), Some(s));
        }
        assert_eq!(Source::parse("manual"), None);
    }

    #[test]
    fn display_date_falls_back_to_raw() {
        assert_eq!(testimonial(Some("2025-09-21"), "21/09/2025").display_date(), "2025-09-21");
        assert_eq!(testimonial(None, " soon ").display_date(), "soon");
    }

    #[test]
    fn view_serializes_camel_case_without_empty_mobile() {
        let view = TestimonialView::from(&testimonial(Some("2025-09-21"), ""));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["reviewType"], DEFAULT_REVIEW_TYPE);
        assert_eq!(json["rating"], 5);
        assert!(json.get("mobile").is_none());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn report_error_shape() {
        let report = IngestReport {
            errors: vec![
                RecordError { at: ErrorRef::Index(500), message: "boom".into() },
                RecordError { at: ErrorRef::Id("abc".into()), message: "gone".into() },
            ],
            ..Default::default()
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"][0]["index"], 500);
        assert_eq!(json["errors"][1]["id"], "abc");
        assert_eq!(json["totalParsed"], 0);
        assert!(json.get("skippedReasons").is_none());
    }

    #[test]
    fn filter_matches_source_and_published() {
        let rec = StoredRecord {
            id: "1".into(),
            date: None,
            review_type: String::new(),
            review: String::new(),
            rating: 0,
            name: "A".into(),
            mobile: String::new(),
            source: Source::ImportCsv,
            published: false,
            created_at: String::new(),
        };
        assert!(RecordFilter::all().matches(&rec));
        assert!(RecordFilter::source(Source::ImportCsv).matches(&rec));
        assert!(!RecordFilter::source(Source::WebSubmission).matches(&rec));
        assert!(!RecordFilter::published().matches(&rec));
    }
}
