//! The ingestion pipeline.
//!
//! [`ingest_from_path`] runs once at process start and turns a raw SNIS/PCJ
//! CSV export into a cleaned, indexed [`crate::types::Dataset`]:
//!
//! 1. read the file and decode via an ordered encoding chain ([`decode`])
//! 2. split rows on the configured delimiter, header first, configured
//!    metadata rows skipped
//! 3. trim header labels and rename known spellings to canonical names
//! 4. normalize null markers to absent ([`numeric`])
//! 5. convert Brazilian-formatted numeric text ([`numeric`])
//! 6. trim categorical text
//! 7. compute derived ratios (`derive`)
//! 8. build normalized + display forms of the municipality key ([`key`])
//! 9. index records, first occurrence wins
//!
//! Failures in steps 1–3 (missing file, undecodable bytes, no header, key
//! column absent) are fatal and abort the load. Everything after that is
//! absorbed per cell or per row.

pub mod decode;
mod derive;
pub mod key;
pub mod numeric;
mod rows;

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::{debug, info};

use crate::error::{IngestError, IngestResult};
use crate::types::{ColumnSchema, Dataset};

/// Per-dataset parsing configuration.
///
/// The pipeline is configured, not self-describing: delimiter, metadata
/// rows, encodings, and null markers are fixed per deployment.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Field delimiter (`b';'` for the PCJ exports).
    pub delimiter: u8,
    /// 0-based indices of data rows (counted after the header) to skip;
    /// the exports carry unit/code rows right below the header.
    pub skip_rows: Vec<usize>,
    /// Ordered decode attempts; first clean decode wins.
    pub encodings: Vec<&'static Encoding>,
    /// Cell values treated as absent, compared exactly after trimming.
    pub null_markers: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            skip_rows: vec![0, 1],
            encodings: decode::default_encodings(),
            null_markers: ["*", "***", "-", "ND", ""].map(str::to_string).to_vec(),
        }
    }
}

/// Ingest a delimited export file into an in-memory [`Dataset`].
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &ColumnSchema,
    opts: &IngestOptions,
) -> IngestResult<Dataset> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let text = decode::decode_with_fallback(&bytes, &opts.encodings)?;
    ingest_from_str(&text, &path.display().to_string(), schema, opts)
}

/// Ingest already-decoded text. `source` only labels diagnostics.
pub fn ingest_from_str(
    text: &str,
    source: &str,
    schema: &ColumnSchema,
    opts: &IngestOptions,
) -> IngestResult<Dataset> {
    schema.validate()?;

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(opts.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyInput {
            path: source.to_string(),
        });
    }
    let header = rows::resolve_header(&headers, schema)?;

    let mut dataset = Dataset::new();
    let mut read = 0usize;
    let mut dropped_blank_key = 0usize;
    let mut shadowed = 0usize;

    for (data_idx, result) in rdr.records().enumerate() {
        let record = result?;
        if opts.skip_rows.contains(&data_idx) {
            continue;
        }
        read += 1;

        // 1-based file row for diagnostics; +2 because the header is row 1.
        let row_number = data_idx + 2;
        match rows::build_record(row_number, &record, &header, schema, opts) {
            Some((normalized, rec)) => {
                if !dataset.insert(normalized, rec) {
                    shadowed += 1;
                    debug!(row = row_number, "duplicate key, keeping first occurrence");
                }
            }
            None => {
                dropped_blank_key += 1;
                debug!(row = row_number, "row dropped: blank municipality name");
            }
        }
    }

    info!(
        source,
        rows = read,
        records = dataset.len(),
        dropped_blank_key,
        shadowed,
        "dataset loaded"
    );

    Ok(dataset)
}
