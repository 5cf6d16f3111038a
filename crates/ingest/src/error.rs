use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    /// No candidate location yielded usable text.
    SourceUnavailable { tried: Vec<String> },
    /// One or more mandatory header columns could not be resolved.
    MissingColumns { missing: Vec<String> },
    /// The grid holds a header row but nothing else worth processing.
    EmptyDataset(String),
    /// Reading the existing records from the store failed.
    Store(StoreError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable { tried } => {
                write!(f, "no source yielded usable CSV (tried {} location(s)", tried.len())?;
                if !tried.is_empty() {
                    write!(f, ": {}", tried.join(", "))?;
                }
                write!(f, ")")
            }
            Self::MissingColumns { missing } => {
                write!(f, "CSV header missing required columns: {}", missing.join(", "))
            }
            Self::EmptyDataset(msg) => write!(f, "empty dataset: {msg}"),
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Failure reported by a record store implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend rejected the write or query.
    Backend(String),
    /// No record with the given id.
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "{msg}"),
            Self::NotFound(id) => write!(f, "record '{id}' not found"),
        }
    }
}

impl std::error::Error for StoreError {}
