//! HTTP text source for published sheet exports.

use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL};

use feedwall_config::HttpConfig;
use feedwall_ingest::TextSource;

use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

const MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024; // 10 MB
const ACCEPT_CSV: &str = "text/csv,application/csv,*/*";

// ── HttpSource ──────────────────────────────────────────────────────

/// Blocking GET per candidate URL. Non-2xx statuses are failures so the
/// probe moves on to the next candidate.
pub struct HttpSource {
    http: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(config: &HttpConfig) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| CliError::io(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

impl TextSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, String> {
        log::debug!("GET {url}");
        let resp = self
            .http
            .get(url)
            .header(ACCEPT, ACCEPT_CSV)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let bytes = resp.bytes().map_err(|e| format!("failed to read body: {e}"))?;
        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(format!(
                "response too large ({} bytes, limit {MAX_RESPONSE_BYTES})",
                bytes.len()
            ));
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
