//! `feedwall export | publish | unpublish`: commands over stored records.
//!
//! The export header matches the feedback sheet, so an export can be fed
//! back through `feedwall import` or `feedwall sync`. The trailing `Id`
//! column is what `publish` and `unpublish` take.

use std::io::Write;
use std::path::PathBuf;

use feedwall_ingest::{RecordFilter, RecordPatch, RecordStore, StoreError, StoredRecord};

use crate::{CliError, Context};

const HEADER: [&str; 9] = [
    "Date",
    "Review Type",
    "Review",
    "Rating",
    "Name",
    "Mobile Number",
    "Source",
    "Published",
    "Id",
];

pub fn cmd_export(ctx: &Context, out: Option<PathBuf>, all: bool) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let filter = if all { RecordFilter::all() } else { RecordFilter::published() };
    let records = store.select(&filter).map_err(CliError::store)?;

    let sink: Box<dyn Write> = match out {
        Some(ref path) => Box::new(
            std::fs::File::create(path).map_err(|e| CliError::io(format!("cannot create {}: {e}", path.display())))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    write_records(sink, &records)?;

    if !ctx.quiet {
        match out {
            Some(path) => eprintln!("wrote {} record(s) to {}", records.len(), path.display()),
            None => eprintln!("exported {} record(s)", records.len()),
        }
    }
    Ok(())
}

pub fn cmd_set_published(ctx: &Context, id: &str, published: bool) -> Result<(), CliError> {
    let mut store = ctx.open_store()?;
    store
        .update(id, &RecordPatch::published(published))
        .map_err(|e| match e {
            StoreError::NotFound(_) => {
                CliError::args(e.to_string()).with_hint("list ids with `feedwall export --all`")
            }
            other => CliError::store(other),
        })?;
    log::info!("{} {id}", if published { "published" } else { "unpublished" });
    Ok(())
}

fn write_records<W: Write>(sink: W, records: &[StoredRecord]) -> Result<(), CliError> {
    let mut wtr = csv::Writer::from_writer(sink);
    let err = |e: csv::Error| CliError::io(format!("CSV write error: {e}"));

    wtr.write_record(HEADER).map_err(err)?;
    for r in records {
        let rating = r.rating.to_string();
        wtr.write_record([
            r.date.as_deref().unwrap_or(""),
            r.review_type.as_str(),
            r.review.as_str(),
            rating.as_str(),
            r.name.as_str(),
            r.mobile.as_str(),
            r.source.as_str(),
            if r.published { "true" } else { "false" },
            r.id.as_str(),
        ])
        .map_err(err)?;
    }
    wtr.flush().map_err(|e| CliError::io(format!("CSV write error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedwall_ingest::parser::parse_csv;
    use feedwall_ingest::Source;

    #[test]
    fn export_round_trips_through_parser() {
        let record = StoredRecord {
            id: "1".into(),
            date: Some("2025-09-21".into()),
            review_type: "Course Review".into(),
            review: "Clear, practical\nand \"fun\"".into(),
            rating: 5,
            name: "Santosh".into(),
            mobile: "9876500000".into(),
            source: Source::ImportCsv,
            published: true,
            created_at: String::new(),
        };

        let mut buf = Vec::new();
        write_records(&mut buf, &[record]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let grid = parse_csv(&text);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0][0], "Date");
        assert_eq!(grid[1][2], "Clear, practical\nand \"fun\"");
        assert_eq!(grid[1][6], "import-csv");
        assert_eq!(grid[1][8], "1");
    }
}
