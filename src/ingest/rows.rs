//! Header resolution and per-row record assembly.

use std::collections::BTreeMap;

use csv::StringRecord;
use tracing::debug;

use crate::error::{IngestError, IngestResult};
use crate::types::{ColumnSchema, FieldKind, MunicipalityRecord, Value};

use super::{IngestOptions, derive, key, numeric};

/// The header row after trimming and canonical renaming.
///
/// Unknown labels are retained verbatim (kind [`FieldKind::Text`]) so the
/// columns stay available as pass-through fields.
pub(crate) struct ResolvedHeader {
    labels: Vec<String>,
    kinds: Vec<FieldKind>,
}

/// Trim every header label and map known spellings to canonical names.
///
/// Fatal if the natural-key column does not resolve under any spelling the
/// schema lists.
pub(crate) fn resolve_header(
    headers: &StringRecord,
    schema: &ColumnSchema,
) -> IngestResult<ResolvedHeader> {
    let mut labels = Vec::with_capacity(headers.len());
    let mut kinds = Vec::with_capacity(headers.len());

    for raw in headers.iter() {
        let trimmed = raw.trim();
        match schema.resolve(trimmed) {
            Some(spec) => {
                labels.push(spec.canonical.clone());
                kinds.push(spec.kind);
            }
            None => {
                labels.push(trimmed.to_string());
                kinds.push(FieldKind::Text);
            }
        }
    }

    if !labels.iter().any(|l| *l == schema.key_column) {
        return Err(IngestError::MissingKeyColumn {
            column: schema.key_column.clone(),
            headers: headers.iter().map(|h| h.trim().to_string()).collect(),
        });
    }

    Ok(ResolvedHeader { labels, kinds })
}

/// Clean one data row into a `(normalized key, record)` pair.
///
/// Returns `None` when the row's natural key is absent or blank; such rows
/// are dropped. Cell-level problems never fail the row: they become
/// [`Value::Absent`].
pub(crate) fn build_record(
    row_number: usize,
    record: &StringRecord,
    header: &ResolvedHeader,
    schema: &ColumnSchema,
    opts: &IngestOptions,
) -> Option<(String, MunicipalityRecord)> {
    let mut fields = BTreeMap::new();
    for (idx, label) in header.labels.iter().enumerate() {
        // Short rows are tolerated; missing trailing cells read as empty.
        let raw = record.get(idx).unwrap_or("");
        let value = clean_value(row_number, label, header.kinds[idx], raw, opts);
        fields.insert(label.clone(), value);
    }

    let raw_key = fields.get(&schema.key_column)?.as_text()?.to_string();
    if raw_key.trim().is_empty() {
        return None;
    }

    let normalized = key::normalize_key(&raw_key);
    let display = key::display_name(&raw_key);
    fields.insert(schema.key_column.clone(), Value::Text(display.clone()));

    derive::apply(&schema.derived, &mut fields);

    Some((
        normalized,
        MunicipalityRecord {
            name: display,
            fields,
        },
    ))
}

/// Null-marker normalization first, then kind-directed conversion.
fn clean_value(
    row_number: usize,
    label: &str,
    kind: FieldKind,
    raw: &str,
    opts: &IngestOptions,
) -> Value {
    if numeric::is_null_marker(raw, &opts.null_markers) {
        return Value::Absent;
    }

    match kind {
        FieldKind::Numeric => match numeric::parse_br_number(raw) {
            Some(v) => Value::Number(v),
            None => {
                debug!(
                    row = row_number,
                    column = label,
                    raw,
                    "numeric conversion failed, treating cell as absent"
                );
                Value::Absent
            }
        },
        FieldKind::Text | FieldKind::Categorical => Value::Text(raw.trim().to_string()),
    }
}
