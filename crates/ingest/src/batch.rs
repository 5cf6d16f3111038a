//! Chunked inserts with per-record failure isolation.

use crate::model::{ErrorRef, RecordError, Testimonial};
use crate::store::RecordStore;

/// Largest chunk handed to the store in one call.
pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub errors: Vec<RecordError>,
}

/// Insert `records` in chunks of `batch_size`.
///
/// A chunk the store rejects is retried one record at a time, so only the
/// records that actually fail are reported (by index into `records`) and
/// their siblings still land.
pub fn insert_chunked<S: RecordStore + ?Sized>(
    store: &mut S,
    records: &[Testimonial],
    batch_size: usize,
) -> BatchOutcome {
    let batch_size = batch_size.max(1);
    let mut outcome = BatchOutcome::default();

    for (chunk_no, chunk) in records.chunks(batch_size).enumerate() {
        let offset = chunk_no * batch_size;
        match store.insert(chunk) {
            Ok(n) => outcome.inserted += n,
            Err(e) if chunk.len() == 1 => {
                log::warn!("insert of record {offset} failed: {e}");
                outcome.errors.push(RecordError {
                    at: ErrorRef::Index(offset),
                    message: e.to_string(),
                });
            }
            Err(e) => {
                log::warn!(
                    "chunk at {offset} ({} records) rejected: {e}; retrying individually",
                    chunk.len()
                );
                for (i, record) in chunk.iter().enumerate() {
                    match store.insert(std::slice::from_ref(record)) {
                        Ok(n) => outcome.inserted += n,
                        Err(e) => outcome.errors.push(RecordError {
                            at: ErrorRef::Index(offset + i),
                            message: e.to_string(),
                        }),
                    }
                }
            }
        }
    }

    outcome
}
