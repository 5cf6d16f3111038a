// Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sheet exports answer bot user agents with a sign-in page.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "config IO error: {msg}"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Validation(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Published sheet id. Used to derive export URLs when `sheet_urls` is empty.
    pub spreadsheet_id: Option<String>,
    /// Explicit CSV URLs, probed in order.
    pub sheet_urls: Vec<String>,
    /// Local export files, probed in order, relative to `base_dir`.
    pub files: Vec<String>,
    pub base_dir: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_urls: Vec::new(),
            files: vec!["Feedback System - Sheet1.csv".into(), "Feedback.csv".into()],
            base_dir: PathBuf::from("."),
        }
    }
}

impl SourcesConfig {
    /// Candidate URLs for the published sheet.
    pub fn sheet_candidates(&self) -> Vec<String> {
        if !self.sheet_urls.is_empty() {
            return self.sheet_urls.clone();
        }
        match self.spreadsheet_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => vec![
                format!("https://docs.google.com/spreadsheets/d/{id}/export?format=csv&gid=0"),
                format!("https://docs.google.com/spreadsheets/d/e/{id}/pub?gid=0&single=true&output=csv"),
                format!("https://docs.google.com/spreadsheets/d/{id}/export?format=csv"),
            ],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_db_path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedwallConfig {
    pub sources: SourcesConfig,
    pub store: StoreConfig,
    pub import: ImportConfig,
    pub http: HttpConfig,
}

impl FeedwallConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: FeedwallConfig = toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.import.batch_size == 0 {
            return Err(ConfigError::Validation("import.batch_size must be at least 1".into()));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation("http.timeout_secs must be at least 1".into()));
        }
        if let Some(bad) = self
            .sources
            .sheet_urls
            .iter()
            .find(|u| !(u.starts_with("http://") || u.starts_with("https://")))
        {
            return Err(ConfigError::Validation(format!(
                "sources.sheet_urls: '{bad}' is not an http(s) URL"
            )));
        }
        if self.sources.files.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::Validation("sources.files contains an empty name".into()));
        }
        Ok(())
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("no config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        fs::write(path, self.to_toml()?).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

/// `<config dir>/feedwall/feedwall.toml`
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedwall")
        .join("feedwall.toml")
}

/// `<data dir>/feedwall/feedwall.db`
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedwall")
        .join("feedwall.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = FeedwallConfig::from_toml("").unwrap();
        assert_eq!(config, FeedwallConfig::default());
        assert_eq!(config.import.batch_size, 500);
        assert_eq!(config.sources.files.len(), 2);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = FeedwallConfig::from_toml(
            r#"
            [sources]
            spreadsheet_id = "abc123"

            [import]
            batch_size = 100
            "#,
        )
        .unwrap();
        assert_eq!(config.import.batch_size, 100);
        assert_eq!(config.http.timeout_secs, DEFAULT_TIMEOUT_SECS);
        let urls = config.sources.sheet_candidates();
        assert_eq!(urls.len(), 3);
        assert!(urls[0].contains("/d/abc123/export?format=csv&gid=0"));
    }

    #[test]
    fn explicit_urls_win_over_spreadsheet_id() {
        let config = FeedwallConfig::from_toml(
            r#"
            [sources]
            spreadsheet_id = "abc123"
            sheet_urls = ["https://example.com/sheet.csv"]
            "#,
        )
        .unwrap();
        assert_eq!(config.sources.sheet_candidates(), vec!["https://example.com/sheet.csv"]);
    }

    #[test]
    fn rejects_zero_batch_size() {
        let err = FeedwallConfig::from_toml("[import]\nbatch_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = FeedwallConfig::from_toml("[sources]\nsheet_urls = [\"ftp://x\"]\n").unwrap_err();
        assert!(err.to_string().contains("ftp://x"));
    }

    #[test]
    fn parse_error_reported() {
        let err = FeedwallConfig::from_toml("[import\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("feedwall.toml");
        let mut config = FeedwallConfig::default();
        config.store.path = Some(dir.path().join("t.db"));
        config.import.batch_size = 42;
        config.save(&path).unwrap();
        assert_eq!(FeedwallConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedwallConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, FeedwallConfig::default());
    }
}
