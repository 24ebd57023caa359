//! Environment-driven runtime configuration.
//!
//! Everything the pipeline and server consume is set here once at startup:
//! bind address, input path, parsing options, cache TTL, and what to do
//! when the startup load fails.

use std::env;

use encoding_rs::Encoding;

use crate::ingest::IngestOptions;

/// What the process does when the startup load fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadFailureMode {
    /// Exit non-zero without serving.
    FailFast,
    /// Serve anyway; every data endpoint reports the load failure.
    Degrade,
}

/// Full runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address.
    pub bind: String,
    /// Path of the delimited export file.
    pub data_path: String,
    /// Response cache TTL in seconds.
    pub cache_ttl_secs: u64,
    /// Startup behavior on ingest failure.
    pub on_load_error: LoadFailureMode,
    /// Parsing options handed to the ingestion pipeline.
    pub ingest: IngestOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            data_path: "dados_limpos_pcj.csv".to_string(),
            cache_ttl_secs: 3600,
            on_load_error: LoadFailureMode::Degrade,
            ingest: IngestOptions::default(),
        }
    }
}

/// Read configuration from the environment, falling back to defaults.
///
/// Variables: `BIND`, `DATA_PATH`, `CACHE_TTL_S`, `ON_LOAD_ERROR`
/// (`degrade`/`fail-fast`), `DELIMITER`, `SKIP_ROWS` (comma-separated
/// 0-based data-row indices), `ENCODINGS` (comma-separated WHATWG labels,
/// e.g. `utf-8,windows-1252`), `NULL_MARKERS` (comma-separated).
pub fn from_env() -> AppConfig {
    let mut c = AppConfig::default();
    if let Ok(v) = env::var("BIND") {
        c.bind = v;
    }
    if let Ok(v) = env::var("DATA_PATH") {
        c.data_path = v;
    }
    if let Ok(v) = env::var("CACHE_TTL_S") {
        c.cache_ttl_secs = v.parse().unwrap_or(c.cache_ttl_secs);
    }
    if let Ok(v) = env::var("ON_LOAD_ERROR") {
        c.on_load_error = parse_failure_mode(&v);
    }
    if let Ok(v) = env::var("DELIMITER") {
        c.ingest.delimiter = v.bytes().next().unwrap_or(c.ingest.delimiter);
    }
    if let Ok(v) = env::var("SKIP_ROWS") {
        c.ingest.skip_rows = v.split(',').filter_map(|s| s.trim().parse().ok()).collect();
    }
    if let Ok(v) = env::var("ENCODINGS") {
        if let Some(encodings) = parse_encodings(&v) {
            c.ingest.encodings = encodings;
        }
    }
    if let Ok(v) = env::var("NULL_MARKERS") {
        c.ingest.null_markers = v.split(',').map(str::to_string).collect();
    }
    c
}

fn parse_failure_mode(raw: &str) -> LoadFailureMode {
    match raw.trim().to_ascii_lowercase().as_str() {
        "fail-fast" | "fail_fast" | "failfast" => LoadFailureMode::FailFast,
        _ => LoadFailureMode::Degrade,
    }
}

/// Resolve a comma-separated list of WHATWG encoding labels; `None` if any
/// label is unknown (the default chain is kept in that case).
fn parse_encodings(raw: &str) -> Option<Vec<&'static Encoding>> {
    raw.split(',')
        .map(|label| Encoding::for_label(label.trim().as_bytes()))
        .collect()
}
