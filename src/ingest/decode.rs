//! Encoding detection with an ordered fallback chain.
//!
//! The dominant export encoding is UTF-8 (sometimes with a BOM), but legacy
//! exports arrive as Windows-1252/Latin-1. Rather than nesting retry
//! handlers, the caller configures an ordered list of encodings; the first
//! one that decodes without replacement-character corruption wins.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::warn;

use crate::error::{IngestError, IngestResult};

/// Default encoding chain: UTF-8 (BOM tolerated), then Windows-1252.
pub fn default_encodings() -> Vec<&'static Encoding> {
    vec![UTF_8, WINDOWS_1252]
}

/// Decode raw file bytes using the first encoding in `encodings` that
/// produces clean text.
///
/// A decode "fails" when the decoder reports malformed sequences or the
/// output contains U+FFFD replacement characters. If every configured
/// encoding fails, the input is considered undecodable and ingestion
/// aborts.
pub fn decode_with_fallback(bytes: &[u8], encodings: &[&'static Encoding]) -> IngestResult<String> {
    for (attempt, enc) in encodings.iter().enumerate() {
        let (text, _, had_errors) = enc.decode(bytes);
        if had_errors || text.contains('\u{FFFD}') {
            continue;
        }
        if attempt > 0 {
            warn!(encoding = enc.name(), "primary encoding failed, using fallback");
        }
        return Ok(text.into_owned());
    }

    Err(IngestError::Decode {
        tried: encodings.iter().map(|e| e.name()).collect(),
    })
}
