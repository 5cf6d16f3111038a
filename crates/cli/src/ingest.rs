//! `feedwall import | sync | repair | live | submit`: sheet-driven commands.

use std::path::PathBuf;

use feedwall_ingest::{
    build_feed, feed_from_records, looks_like_csv, probe_candidates, run_import, run_repair, run_sync,
    FileSource, IngestReport, Probed, RecordFilter, RecordStore, Submission,
};

use crate::exit_codes::EXIT_PARTIAL_FAILURE;
use crate::fetch::HttpSource;
use crate::{CliError, Context};

// ── Sources ─────────────────────────────────────────────────────────

fn probe_files(ctx: &Context, explicit: Vec<String>) -> Result<Probed, CliError> {
    let candidates = if explicit.is_empty() {
        ctx.config.sources.files.clone()
    } else {
        explicit
    };
    let source = FileSource::new(&ctx.config.sources.base_dir);
    probe_candidates(&source, &candidates, looks_like_csv).map_err(CliError::ingest)
}

fn probe_urls(ctx: &Context, explicit: Vec<String>) -> Result<Probed, CliError> {
    let candidates = if explicit.is_empty() {
        ctx.config.sources.sheet_candidates()
    } else {
        explicit
    };
    if candidates.is_empty() {
        return Err(CliError::args("no sheet URL configured")
            .with_hint("pass --url, or set sources.spreadsheet_id in feedwall.toml"));
    }
    let source = HttpSource::new(&ctx.config.http)?;
    probe_candidates(&source, &candidates, looks_like_csv).map_err(CliError::ingest)
}

// ── Output ──────────────────────────────────────────────────────────

/// Print the report JSON to stdout (and `output`), a one-line summary to
/// stderr, and fail with the partial-failure code if any record failed.
fn emit_report(ctx: &Context, label: &str, report: &IngestReport, output: Option<PathBuf>) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output {
        std::fs::write(path, &json).map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        if !ctx.quiet {
            eprintln!("wrote {}", path.display());
        }
    }
    println!("{json}");

    if !ctx.quiet {
        eprintln!(
            "{label}: {} parsed, {} prepared, {} inserted, {} updated, {} skipped, {} failed",
            report.total_parsed,
            report.total_prepared,
            report.inserted,
            report.updated,
            report.skipped,
            report.errors.len(),
        );
    }

    if report.has_failures() {
        return Err(CliError {
            code: EXIT_PARTIAL_FAILURE,
            message: format!("{} record(s) failed to persist", report.errors.len()),
            hint: Some("see the errors array in the report".into()),
        });
    }
    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────

pub fn cmd_import(ctx: &Context, files: Vec<String>, output: Option<PathBuf>) -> Result<(), CliError> {
    let probed = probe_files(ctx, files)?;
    let mut store = ctx.open_store()?;
    let mut report =
        run_import(&mut store, &probed.text, ctx.config.import.batch_size).map_err(CliError::ingest)?;
    report.working_source = Some(probed.location);
    emit_report(ctx, "import", &report, output)
}

pub fn cmd_sync(ctx: &Context, urls: Vec<String>, output: Option<PathBuf>) -> Result<(), CliError> {
    let probed = probe_urls(ctx, urls)?;
    let mut store = ctx.open_store()?;
    let mut report =
        run_sync(&mut store, &probed.text, ctx.config.import.batch_size).map_err(CliError::ingest)?;
    report.working_source = Some(probed.location);
    emit_report(ctx, "sync", &report, output)
}

pub fn cmd_repair(ctx: &Context, files: Vec<String>) -> Result<(), CliError> {
    let probed = probe_files(ctx, files)?;
    let mut store = ctx.open_store()?;
    let mut report = run_repair(&mut store, &probed.text).map_err(CliError::ingest)?;
    report.working_source = Some(probed.location);
    emit_report(ctx, "repair", &report, None)
}

pub fn cmd_live(ctx: &Context, urls: Vec<String>, from_store: bool) -> Result<(), CliError> {
    let now = chrono::Utc::now();
    let feed = if from_store {
        let store = ctx.open_store()?;
        let records = store.select(&RecordFilter::published()).map_err(CliError::store)?;
        feed_from_records(&records, now)
    } else {
        let probed = probe_urls(ctx, urls)?;
        build_feed(&probed.text, Some(&probed.location), now)
    };

    let json = serde_json::to_string_pretty(&feed)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    if !ctx.quiet {
        eprintln!("live: {} testimonial(s), {} row(s) skipped", feed.count, feed.skipped_rows);
    }
    Ok(())
}

pub fn cmd_submit(
    ctx: &Context,
    name: String,
    review: String,
    rating: i64,
    mobile: String,
    review_type: Option<String>,
) -> Result<(), CliError> {
    let submission = Submission { review, rating, name, mobile, review_type };
    let today = chrono::Local::now().date_naive();
    let testimonial = submission
        .into_testimonial(today)
        .map_err(|e| CliError::args(e.to_string()))?;

    let mut store = ctx.open_store()?;
    store
        .insert(std::slice::from_ref(&testimonial))
        .map_err(CliError::store)?;
    log::info!("recorded submission from {}", testimonial.name);

    let json = serde_json::to_string_pretty(&feedwall_ingest::model::TestimonialView::from(&testimonial))
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    println!("{json}");
    Ok(())
}
