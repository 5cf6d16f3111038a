//! Text sources and candidate probing.

use std::path::{Path, PathBuf};

use crate::error::IngestError;

/// Anything that can turn a location into text.
pub trait TextSource {
    fn fetch(&self, location: &str) -> Result<String, String>;
}

impl<F> TextSource for F
where
    F: Fn(&str) -> Result<String, String>,
{
    fn fetch(&self, location: &str) -> Result<String, String> {
        self(location)
    }
}

/// Text returned by a successful probe and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probed {
    pub location: String,
    pub text: String,
}

/// Try each candidate in order and return the first response `accept`
/// approves. Failures and rejections are logged and probing moves on.
pub fn probe_candidates<S, A>(
    source: &S,
    candidates: &[String],
    accept: A,
) -> Result<Probed, IngestError>
where
    S: TextSource + ?Sized,
    A: Fn(&str) -> bool,
{
    for location in candidates {
        match source.fetch(location) {
            Ok(text) if accept(&text) => {
                log::info!("using source {location} ({} bytes)", text.len());
                return Ok(Probed {
                    location: location.clone(),
                    text,
                });
            }
            Ok(_) => log::warn!("{location}: response rejected (not CSV)"),
            Err(e) => log::warn!("{location}: {e}"),
        }
    }

    Err(IngestError::SourceUnavailable {
        tried: candidates.to_vec(),
    })
}

/// Default acceptance predicate: non-empty and not an HTML page.
///
/// Published-sheet URLs answer with a login or error page instead of a
/// failure status when the sheet is private.
pub fn looks_like_csv(text: &str) -> bool {
    let head = text.trim_start_matches('\u{feff}').trim_start();
    if head.is_empty() || head.starts_with('<') {
        return false;
    }
    let lowered: String = head.chars().take(64).collect::<String>().to_lowercase();
    !(lowered.contains("<!doctype") || lowered.contains("<html"))
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Reads candidate paths relative to `base`.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    base: PathBuf,
}

impl FileSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl TextSource for FileSource {
    fn fetch(&self, location: &str) -> Result<String, String> {
        let path = self.resolve(location);
        read_file_as_utf8(&path).map_err(|e| format!("{}: {e}", path.display()))
    }
}

/// Read a file as UTF-8, falling back to Windows-1252 for Excel exports.
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    String::from_utf8(bytes).or_else(|e| {
        log::debug!("{} is not UTF-8; decoding as Windows-1252", path.display());
        let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
        Ok(decoded.into_owned())
    })
}
