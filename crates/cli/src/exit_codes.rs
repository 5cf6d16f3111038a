//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: cron jobs and scripts that
//! run `feedwall sync` branch on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad input)    |
//! | 60-69   | ingest           | Source, schema, store and config codes   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use feedwall_ingest::IngestError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid submission.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Ingest (60-69)
// =============================================================================

/// No candidate file or URL produced usable CSV.
pub const EXIT_SOURCE_UNAVAILABLE: u8 = 60;

/// Header row is missing one or more required columns.
pub const EXIT_SCHEMA: u8 = 61;

/// The run completed but some records failed to persist.
/// The report on stdout lists them.
pub const EXIT_PARTIAL_FAILURE: u8 = 62;

/// Record store could not be opened or queried.
pub const EXIT_STORE: u8 = 63;

/// Config file unreadable, unparseable or invalid.
pub const EXIT_CONFIG: u8 = 64;

/// Sheet holds no data rows (or none worth importing).
pub const EXIT_EMPTY_DATASET: u8 = 65;

/// Map an ingest error to its exit code.
pub fn ingest_exit_code(err: &IngestError) -> u8 {
    match err {
        IngestError::SourceUnavailable { .. } => EXIT_SOURCE_UNAVAILABLE,
        IngestError::MissingColumns { .. } => EXIT_SCHEMA,
        IngestError::EmptyDataset(_) => EXIT_EMPTY_DATASET,
        IngestError::Store(_) => EXIT_STORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_codes_are_distinct() {
        let codes = [
            EXIT_SOURCE_UNAVAILABLE,
            EXIT_SCHEMA,
            EXIT_PARTIAL_FAILURE,
            EXIT_STORE,
            EXIT_CONFIG,
            EXIT_EMPTY_DATASET,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
        assert!(codes.iter().all(|c| (60..70).contains(c)));
    }

    #[test]
    fn maps_ingest_errors() {
        assert_eq!(
            ingest_exit_code(&IngestError::MissingColumns { missing: vec!["name".into()] }),
            EXIT_SCHEMA
        );
        assert_eq!(
            ingest_exit_code(&IngestError::SourceUnavailable { tried: vec![] }),
            EXIT_SOURCE_UNAVAILABLE
        );
        assert_eq!(ingest_exit_code(&IngestError::EmptyDataset("x".into())), EXIT_EMPTY_DATASET);
    }
}
