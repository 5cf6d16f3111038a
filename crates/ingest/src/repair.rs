//! Targeted repair of imported records whose review text was lost.
//!
//! An earlier import that confused the "Review Type" and "Review" columns
//! left records with an empty review or a review equal to their own type
//! label. Repair rebuilds the review from the sheet without touching any
//! record that already carries other text.

use std::collections::HashMap;

use crate::error::IngestError;
use crate::model::{ErrorRef, RecordError, RecordFilter, RecordPatch, Source, StoredRecord, Testimonial};
use crate::reconcile::{keys_for, KeyParts, KeyShape, ReconKey};
use crate::store::RecordStore;

/// Sheet reviews keyed by `name|date|rating` under every date form.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    reviews: HashMap<ReconKey, String>,
}

impl GroundTruth {
    pub fn from_sheet(records: &[Testimonial]) -> Self {
        let mut reviews = HashMap::new();
        for record in records {
            let review = record.review.trim();
            if review.is_empty() {
                continue;
            }
            // Later rows overwrite earlier ones for the same key.
            for key in keys_for(KeyParts::from(record), KeyShape::Identity) {
                reviews.insert(key, review.to_string());
            }
        }
        Self { reviews }
    }

    pub fn lookup(&self, parts: KeyParts<'_>) -> Option<&str> {
        keys_for(parts, KeyShape::Identity)
            .iter()
            .find_map(|k| self.reviews.get(k))
            .map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

/// A stored review counts as corrupted when it is blank or just repeats
/// the record's type label.
pub fn is_corrupted(record: &StoredRecord) -> bool {
    let review = record.review.trim();
    review.is_empty() || review == record.review_type.trim()
}

/// Replacement review for `record`, if one is warranted.
pub fn proposed_fix<'a>(truth: &'a GroundTruth, record: &StoredRecord) -> Option<&'a str> {
    if !is_corrupted(record) {
        return None;
    }
    let candidate = truth.lookup(KeyParts::from(record))?;
    (candidate != record.review_type.trim() && candidate != record.review.trim()).then_some(candidate)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Records considered (source `import-csv`).
    pub examined: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RecordError>,
}

/// Patch every repairable `import-csv` record in `store`. Update failures
/// are collected per id; the pass always runs to the end.
pub fn repair_reviews<S: RecordStore + ?Sized>(
    store: &mut S,
    truth: &GroundTruth,
) -> Result<RepairOutcome, IngestError> {
    let records = store.select(&RecordFilter::source(Source::ImportCsv))?;
    let mut outcome = RepairOutcome {
        examined: records.len(),
        ..Default::default()
    };

    for record in &records {
        let Some(review) = proposed_fix(truth, record) else {
            outcome.skipped += 1;
            continue;
        };
        match store.update(&record.id, &RecordPatch::review(review)) {
            Ok(()) => {
                log::debug!("repaired review for {} ({})", record.name, record.id);
                outcome.updated += 1;
            }
            Err(e) => {
                log::warn!("update of {} failed: {e}", record.id);
                outcome.errors.push(RecordError {
                    at: ErrorRef::Id(record.id.clone()),
                    message: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "repair: {} examined, {} updated, {} skipped, {} failed",
        outcome.examined,
        outcome.updated,
        outcome.skipped,
        outcome.errors.len()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::normalize_date;

    const TYPE: &str = "Course Review";

    fn sheet(name: &str, date: &str, rating: i64, review: &str) -> Testimonial {
        Testimonial {
            date: normalize_date(date),
            date_raw: date.into(),
            review_type: TYPE.into(),
            review: review.into(),
            rating,
            name: name.into(),
            mobile: String::new(),
            source: Source::ImportCsv,
            published: true,
        }
    }

    fn stored(name: &str, date: &str, rating: i64, review: &str) -> StoredRecord {
        StoredRecord {
            id: format!("id-{name}"),
            date: Some(date.into()),
            review_type: TYPE.into(),
            review: review.into(),
            rating,
            name: name.into(),
            mobile: String::new(),
            source: Source::ImportCsv,
            published: true,
            created_at: String::new(),
        }
    }

    #[test]
    fn empty_review_repaired_across_date_formats() {
        let truth = GroundTruth::from_sheet(&[sheet("Santosh", "21/09/2025", 5, "Clear and practical")]);
        let rec = stored("santosh", "2025-09-21", 5, "");
        assert_eq!(proposed_fix(&truth, &rec), Some("Clear and practical"));
    }

    #[test]
    fn review_equal_to_type_repaired() {
        let truth = GroundTruth::from_sheet(&[sheet("A", "2025-09-21", 4, "Real words")]);
        let rec = stored("A", "2025-09-21", 4, TYPE);
        assert_eq!(proposed_fix(&truth, &rec), Some("Real words"));
    }

    #[test]
    fn genuine_review_never_overwritten() {
        let truth = GroundTruth::from_sheet(&[sheet("A", "2025-09-21", 4, "Sheet text")]);
        let rec = stored("A", "2025-09-21", 4, "Edited by hand");
        assert_eq!(proposed_fix(&truth, &rec), None);
    }

    #[test]
    fn ground_truth_equal_to_type_ignored() {
        let truth = GroundTruth::from_sheet(&[sheet("A", "2025-09-21", 4, TYPE)]);
        assert_eq!(proposed_fix(&truth, &stored("A", "2025-09-21", 4, "")), None);
    }

    #[test]
    fn blank_ground_truth_not_registered() {
        let truth = GroundTruth::from_sheet(&[sheet("A", "2025-09-21", 4, "  ")]);
        assert!(truth.is_empty());
    }

    #[test]
    fn last_sheet_row_wins_for_same_key() {
        let truth = GroundTruth::from_sheet(&[
            sheet("A", "21/09/2025", 4, "First draft"),
            sheet("A", "2025-09-21", 4, "Final words"),
        ]);
        assert_eq!(proposed_fix(&truth, &stored("A", "2025-09-21", 4, "")), Some("Final words"));
    }

    #[test]
    fn rating_mismatch_not_repaired() {
        let truth = GroundTruth::from_sheet(&[sheet("A", "2025-09-21", 4, "Words")]);
        assert_eq!(proposed_fix(&truth, &stored("A", "2025-09-21", 5, "")), None);
    }
}
