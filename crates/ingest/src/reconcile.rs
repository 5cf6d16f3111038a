//! Composite-key deduplication of incoming testimonials against known ones.
//!
//! A key is `name|date|rating[|review-prefix]` with the name lower-cased and
//! trimmed. Dates are keyed under every representation returned by
//! [`date_forms`]: known records register all of theirs, incoming records
//! probe all of theirs, so a format difference alone never causes a miss.

use std::collections::HashSet;

use crate::date::date_forms;
use crate::model::{StoredRecord, Testimonial};

/// Characters of review text folded into the key.
pub const REVIEW_PREFIX_CHARS: usize = 50;

/// Which components participate in the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    /// name + date + rating
    Identity,
    /// name + date + rating + first [`REVIEW_PREFIX_CHARS`] of the review
    WithReview,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReconKey(String);

/// The fields a key is built from, borrowed from either side.
#[derive(Debug, Clone, Copy)]
pub struct KeyParts<'a> {
    pub name: &'a str,
    pub date: &'a str,
    pub rating: i64,
    pub review: &'a str,
}

impl<'a> From<&'a Testimonial> for KeyParts<'a> {
    fn from(t: &'a Testimonial) -> Self {
        Self {
            name: &t.name,
            // The raw cell; normalized forms are derived from it.
            date: &t.date_raw,
            rating: t.rating,
            review: &t.review,
        }
    }
}

impl<'a> From<&'a StoredRecord> for KeyParts<'a> {
    fn from(r: &'a StoredRecord) -> Self {
        Self {
            name: &r.name,
            date: r.date.as_deref().unwrap_or(""),
            rating: r.rating,
            review: &r.review,
        }
    }
}

fn review_prefix(review: &str) -> String {
    let prefix: String = review.trim().chars().take(REVIEW_PREFIX_CHARS).collect();
    prefix.trim().to_string()
}

/// One key per date representation.
pub fn keys_for(parts: KeyParts<'_>, shape: KeyShape) -> Vec<ReconKey> {
    let name = parts.name.trim().to_lowercase();
    let review = match shape {
        KeyShape::Identity => None,
        KeyShape::WithReview => Some(review_prefix(parts.review)),
    };

    date_forms(parts.date)
        .into_iter()
        .map(|date| {
            let mut key = format!("{name}|{date}|{}", parts.rating);
            if let Some(ref r) = review {
                key.push('|');
                key.push_str(r);
            }
            ReconKey(key)
        })
        .collect()
}

/// Set of keys already present in the target store.
#[derive(Debug, Clone)]
pub struct KnownSet {
    shape: KeyShape,
    keys: HashSet<ReconKey>,
}

impl KnownSet {
    pub fn new(shape: KeyShape) -> Self {
        Self {
            shape,
            keys: HashSet::new(),
        }
    }

    pub fn from_records<'a, I, T>(shape: KeyShape, records: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
        &'a T: Into<KeyParts<'a>>,
    {
        let mut set = Self::new(shape);
        for r in records {
            set.insert(r.into());
        }
        set
    }

    pub fn insert(&mut self, parts: KeyParts<'_>) {
        self.keys.extend(keys_for(parts, self.shape));
    }

    /// True if any representation of `parts` is already known.
    pub fn contains(&self, parts: KeyParts<'_>) -> bool {
        keys_for(parts, self.shape)
            .iter()
            .any(|k| self.keys.contains(k))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Incoming records split into new and already-known.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutput {
    pub to_insert: Vec<Testimonial>,
    pub duplicates: Vec<Testimonial>,
}

/// Partition `incoming` against `known`. Records queued for insertion are
/// registered as they go, so repeats within one batch insert once.
pub fn reconcile(known: &mut KnownSet, incoming: Vec<Testimonial>) -> ReconcileOutput {
    let mut out = ReconcileOutput::default();
    for record in incoming {
        if known.contains(KeyParts::from(&record)) {
            log::debug!("duplicate: {} ({})", record.name, record.display_date());
            out.duplicates.push(record);
        } else {
            known.insert(KeyParts::from(&record));
            out.to_insert.push(record);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Source, DEFAULT_REVIEW_TYPE};

    fn incoming(name: &str, date: &str, rating: i64, review: &str) -> Testimonial {
        Testimonial {
            date: crate::date::normalize_date(date),
            date_raw: date.into(),
            review_type: DEFAULT_REVIEW_TYPE.into(),
            review: review.into(),
            rating,
            name: name.into(),
            mobile: String::new(),
            source: Source::GoogleSheetsSync,
            published: true,
        }
    }

    fn stored(name: &str, date: &str, rating: i64, review: &str) -> StoredRecord {
        StoredRecord {
            id: format!("id-{name}"),
            date: Some(date.into()),
            review_type: DEFAULT_REVIEW_TYPE.into(),
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
    fn day_first_sheet_date_matches_iso_store_date() {
        let existing = [stored("Santosh", "2025-09-21", 5, "")];
        let mut known = KnownSet::from_records(KeyShape::WithReview, &existing);
        let out = reconcile(&mut known, vec![incoming("Santosh", "21/09/2025", 5, "")]);
        assert!(out.to_insert.is_empty());
        assert_eq!(out.duplicates.len(), 1);
    }

    #[test]
    fn day_first_store_date_matches_iso_sheet_date() {
        let existing = [stored("Santosh", "21/09/2025", 5, "")];
        let known = KnownSet::from_records(KeyShape::Identity, &existing);
        assert!(known.contains(KeyParts::from(&incoming("Santosh", "2025-09-21", 5, ""))));
    }

    #[test]
    fn name_compared_case_insensitively() {
        let existing = [stored("santosh ", "2025-09-21", 5, "Great")];
        let mut known = KnownSet::from_records(KeyShape::WithReview, &existing);
        let out = reconcile(&mut known, vec![incoming("  SANTOSH", "2025-09-21", 5, "Great")]);
        assert_eq!(out.duplicates.len(), 1);
    }

    #[test]
    fn different_rating_is_new() {
        let existing = [stored("Santosh", "2025-09-21", 5, "")];
        let mut known = KnownSet::from_records(KeyShape::WithReview, &existing);
        let out = reconcile(&mut known, vec![incoming("Santosh", "21/09/2025", 4, "")]);
        assert_eq!(out.to_insert.len(), 1);
    }

    #[test]
    fn review_prefix_only_compares_first_fifty_chars() {
        let base = "x".repeat(REVIEW_PREFIX_CHARS);
        let existing = [stored("A", "2025-09-21", 5, &format!("{base} stored tail"))];
        let mut known = KnownSet::from_records(KeyShape::WithReview, &existing);
        let out = reconcile(&mut known, vec![incoming("A", "2025-09-21", 5, &format!("{base} edited"))]);
        assert_eq!(out.duplicates.len(), 1);
    }

    #[test]
    fn identity_shape_ignores_review() {
        let existing = [stored("A", "2025-09-21", 5, "old")];
        let known = KnownSet::from_records(KeyShape::Identity, &existing);
        let t = incoming("A", "21/09/2025", 5, "new");
        assert!(known.contains(KeyParts::from(&t)));
    }

    #[test]
    fn duplicates_within_batch_inserted_once() {
        let mut known = KnownSet::new(KeyShape::WithReview);
        let out = reconcile(
            &mut known,
            vec![
                incoming("A", "21/09/2025", 5, "Nice"),
                incoming("A", "2025-09-21", 5, "Nice"),
            ],
        );
        assert_eq!(out.to_insert.len(), 1);
        assert_eq!(out.duplicates.len(), 1);
    }

    #[test]
    fn second_run_inserts_nothing() {
        let batch = vec![
            incoming("A", "21/09/2025", 5, "Nice"),
            incoming("B", "22/09/2025", 4, ""),
            incoming("C", "not a date", 3, "Hmm"),
        ];

        let mut store: Vec<StoredRecord> = Vec::new();
        let mut known = KnownSet::from_records(KeyShape::WithReview, &store);
        let first = reconcile(&mut known, batch.clone());
        assert_eq!(first.to_insert.len(), 3);

        for t in &first.to_insert {
            let mut rec = stored(&t.name, "", t.rating, &t.review);
            rec.date = t.stored_date();
            store.push(rec);
        }

        let mut known = KnownSet::from_records(KeyShape::WithReview, &store);
        let second = reconcile(&mut known, batch);
        assert!(second.to_insert.is_empty());
        assert_eq!(second.duplicates.len(), 3);
    }
}
