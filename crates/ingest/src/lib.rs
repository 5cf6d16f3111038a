//! `feedwall-ingest`: testimonial CSV ingestion and reconciliation.
//!
//! Pure core crate: takes sheet text and a [`RecordStore`], returns reports.
//! Fetching and persistence live behind the [`TextSource`] and
//! [`RecordStore`] capabilities.

pub mod batch;
pub mod date;
pub mod engine;
pub mod error;
pub mod feed;
pub mod header;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod record;
pub mod repair;
pub mod source;
pub mod store;
pub mod submission;

pub use engine::{load_records, run_import, run_repair, run_sync};
pub use error::{IngestError, StoreError};
pub use feed::{build_feed, feed_from_records, Feed};
pub use model::{IngestReport, RecordFilter, RecordPatch, Source, StoredRecord, Testimonial};
pub use source::{looks_like_csv, probe_candidates, FileSource, Probed, TextSource};
pub use store::RecordStore;
pub use submission::{Submission, SubmissionError};
