use crate::error::StoreError;
use crate::model::{RecordFilter, RecordPatch, StoredRecord, Testimonial};

/// Record store capability the pipeline writes through.
///
/// Connections, retries and credentials belong to the implementation.
pub trait RecordStore {
    fn select(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, StoreError>;

    /// Insert all records or none. Returns the number written.
    fn insert(&mut self, records: &[Testimonial]) -> Result<usize, StoreError>;

    fn update(&mut self, id: &str, patch: &RecordPatch) -> Result<(), StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn select(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>, StoreError> {
        (**self).select(filter)
    }

    fn insert(&mut self, records: &[Testimonial]) -> Result<usize, StoreError> {
        (**self).insert(records)
    }

    fn update(&mut self, id: &str, patch: &RecordPatch) -> Result<(), StoreError> {
        (**self).update(id, patch)
    }
}
