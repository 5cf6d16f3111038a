use crate::batch::insert_chunked;
use crate::error::IngestError;
use crate::header::HeaderMap;
use crate::model::{IngestReport, RecordFilter, Source};
use crate::parser::{parse_csv, Grid};
use crate::reconcile::{reconcile, KeyShape, KnownSet};
use crate::record::{map_rows, MappedRows, RowFilter};
use crate::repair::{repair_reviews, GroundTruth};
use crate::store::RecordStore;

/// Parse `text` and map its data rows, rejecting datasets with no rows
/// or an unresolvable header before any record is produced.
pub fn load_records(text: &str, source: Source, filter: RowFilter) -> Result<MappedRows, IngestError> {
    let grid: Grid = parse_csv(text);
    if grid.len() <= 1 {
        return Err(IngestError::EmptyDataset(format!(
            "CSV holds {} row(s); expected a header and at least one data row",
            grid.len()
        )));
    }
    let headers = HeaderMap::resolve(&grid[0])?;
    Ok(map_rows(&grid, &headers, source, filter))
}

/// Bulk import: every row with a name or a review is inserted, no dedup.
pub fn run_import<S: RecordStore + ?Sized>(
    store: &mut S,
    text: &str,
    batch_size: usize,
) -> Result<IngestReport, IngestError> {
    let mapped = load_records(text, Source::ImportCsv, RowFilter::NameOrReview)?;
    if mapped.records.is_empty() {
        return Err(IngestError::EmptyDataset(format!(
            "none of {} row(s) carried a name or review",
            mapped.total_rows
        )));
    }

    let outcome = insert_chunked(store, &mapped.records, batch_size);
    log::info!(
        "import: {} prepared, {} inserted, {} failed",
        mapped.records.len(),
        outcome.inserted,
        outcome.errors.len()
    );

    Ok(IngestReport {
        total_parsed: mapped.total_rows,
        total_prepared: mapped.records.len(),
        inserted: outcome.inserted,
        skipped: mapped.skipped_count(),
        skipped_reasons: mapped.skipped,
        errors: outcome.errors,
        ..Default::default()
    })
}

/// Incremental sync: insert only rows not already present in the store.
/// Running it twice over the same sheet inserts nothing the second time.
pub fn run_sync<S: RecordStore + ?Sized>(
    store: &mut S,
    text: &str,
    batch_size: usize,
) -> Result<IngestReport, IngestError> {
    let mapped = load_records(text, Source::GoogleSheetsSync, RowFilter::NameRequired)?;
    let existing = store.select(&RecordFilter::all())?;
    let mut known = KnownSet::from_records(KeyShape::WithReview, &existing);
    log::debug!("{} existing record(s), {} key(s)", existing.len(), known.len());

    let total_parsed = mapped.total_rows;
    let mut skipped_reasons = mapped.skipped;
    let split = reconcile(&mut known, mapped.records);
    if !split.duplicates.is_empty() {
        skipped_reasons.insert("duplicate".into(), split.duplicates.len());
    }

    let outcome = insert_chunked(store, &split.to_insert, batch_size);
    log::info!(
        "sync: {} new, {} already present, {} inserted",
        split.to_insert.len(),
        split.duplicates.len(),
        outcome.inserted
    );

    Ok(IngestReport {
        total_parsed,
        total_prepared: split.to_insert.len(),
        inserted: outcome.inserted,
        skipped: skipped_reasons.values().sum(),
        skipped_reasons,
        errors: outcome.errors,
        ..Default::default()
    })
}

/// Repair imported records from the sheet. Only empty or type-label
/// reviews are replaced.
pub fn run_repair<S: RecordStore + ?Sized>(store: &mut S, text: &str) -> Result<IngestReport, IngestError> {
    let mapped = load_records(text, Source::ImportCsv, RowFilter::NameRequired)?;
    let truth = GroundTruth::from_sheet(&mapped.records);
    log::debug!("ground truth: {} key(s) from {} row(s)", truth.len(), mapped.records.len());

    let outcome = repair_reviews(store, &truth)?;
    Ok(IngestReport {
        total_parsed: mapped.total_rows,
        total_prepared: outcome.examined,
        updated: outcome.updated,
        skipped: outcome.skipped,
        errors: outcome.errors,
        ..Default::default()
    })
}
