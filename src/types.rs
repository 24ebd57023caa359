//! Core data model types for the PCJ dataset.
//!
//! Ingestion cleans a raw SNIS/PCJ CSV export into an in-memory [`Dataset`]
//! of [`MunicipalityRecord`]s, driven by a declarative [`ColumnSchema`]
//! (canonical field names, their observed on-disk spellings, and a field
//! kind per column).

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{IngestError, IngestResult};

/// Declared kind of a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, kept as-is after trimming.
    Text,
    /// Brazilian-locale numeric text, converted to `f64`.
    Numeric,
    /// Low-cardinality text (trimmed; storage tagging only).
    Categorical,
}

/// One known column: a canonical field name plus every raw header label it
/// has been observed under on disk.
///
/// Raw labels must list each spelling variant explicitly (accented forms,
/// mojibake renderings from encoding mismatches). Matching is exact after
/// trimming; there is no fuzzy matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Canonical field name used everywhere downstream.
    pub canonical: String,
    /// Every observed on-disk spelling of this column's header label.
    pub raw_labels: Vec<String>,
    /// Declared kind.
    pub kind: FieldKind,
}

impl ColumnSpec {
    /// Create a column spec from a canonical name, kind, and raw labels.
    pub fn new<I, S>(canonical: impl Into<String>, kind: FieldKind, raw_labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical: canonical.into(),
            raw_labels: raw_labels.into_iter().map(Into::into).collect(),
            kind,
        }
    }
}

/// A derived percentage field: `numerator / denominator * 100`.
///
/// The result is [`Value::Absent`] when the denominator is absent or zero,
/// or when the division produces a non-finite number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedSpec {
    /// Canonical name of the derived field.
    pub canonical: String,
    /// Canonical name of the numerator field.
    pub numerator: String,
    /// Canonical name of the denominator field.
    pub denominator: String,
}

impl DerivedSpec {
    /// Create a derived ratio spec.
    pub fn new(
        canonical: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        Self {
            canonical: canonical.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }
}

/// Declarative mapping from raw header labels to canonical fields.
///
/// Built once from a static configuration table, not inferred from data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    /// Known columns.
    pub columns: Vec<ColumnSpec>,
    /// Canonical name of the natural-key column (the municipality name).
    pub key_column: String,
    /// Derived ratio fields computed after conversion.
    pub derived: Vec<DerivedSpec>,
}

impl ColumnSchema {
    /// Create a schema from columns, the key column's canonical name, and
    /// derived field specs.
    pub fn new(
        columns: Vec<ColumnSpec>,
        key_column: impl Into<String>,
        derived: Vec<DerivedSpec>,
    ) -> Self {
        Self {
            columns,
            key_column: key_column.into(),
            derived,
        }
    }

    /// Validate schema invariants. Called once at startup; failures are
    /// configuration errors, not data errors.
    ///
    /// Checks:
    ///
    /// - canonical names (including derived) are unique
    /// - the key column has an entry
    /// - derived fields reference declared numeric columns
    pub fn validate(&self) -> IngestResult<()> {
        let mut seen: Vec<&str> = Vec::new();
        for name in self
            .columns
            .iter()
            .map(|c| c.canonical.as_str())
            .chain(self.derived.iter().map(|d| d.canonical.as_str()))
        {
            if seen.contains(&name) {
                return Err(IngestError::SchemaConfig {
                    message: format!("duplicate canonical field name '{name}'"),
                });
            }
            seen.push(name);
        }

        if self.spec(&self.key_column).is_none() {
            return Err(IngestError::SchemaConfig {
                message: format!("key column '{}' has no schema entry", self.key_column),
            });
        }

        for d in &self.derived {
            for input in [&d.numerator, &d.denominator] {
                match self.spec(input) {
                    Some(spec) if spec.kind == FieldKind::Numeric => {}
                    Some(_) => {
                        return Err(IngestError::SchemaConfig {
                            message: format!(
                                "derived field '{}' input '{input}' is not numeric",
                                d.canonical
                            ),
                        });
                    }
                    None => {
                        return Err(IngestError::SchemaConfig {
                            message: format!(
                                "derived field '{}' references unknown field '{input}'",
                                d.canonical
                            ),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Resolve a raw header label (already trimmed) to its column spec.
    pub fn resolve(&self, raw_label: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|c| c.raw_labels.iter().any(|l| l == raw_label))
    }

    /// Look up a column spec by canonical name.
    pub fn spec(&self, canonical: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.canonical == canonical)
    }
}

/// A single cleaned field value.
///
/// Absence is first-class and distinct from zero or empty text. Stored
/// numbers are always finite; ingestion coerces non-finite results to
/// [`Value::Absent`] before they reach a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value (null marker, failed conversion, or dropped derivation).
    Absent,
    /// Finite floating-point number.
    Number(f64),
    /// Trimmed text.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Numeric view; `None` unless this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view; `None` unless this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Absent => serializer.serialize_none(),
            Value::Number(v) => serializer.serialize_f64(*v),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One cleaned row: canonical field name → value.
///
/// `name` holds the display form of the municipality name (title-cased);
/// the same text is also present in `fields` under the schema's key column,
/// so serializing a record yields the full field map.
#[derive(Debug, Clone, PartialEq)]
pub struct MunicipalityRecord {
    /// Display form of the natural key.
    pub name: String,
    /// All fields, keyed by canonical name.
    pub fields: BTreeMap<String, Value>,
}

impl MunicipalityRecord {
    /// Finite numeric value of a field, if present.
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_number)
    }
}

impl Serialize for MunicipalityRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// The materialized, cleaned table plus its lookup index.
///
/// Built once at startup and never mutated afterwards; safe for
/// unsynchronized concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<MunicipalityRecord>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its normalized key.
    ///
    /// First occurrence wins: returns `false` and drops the record if the
    /// key is already present.
    pub fn insert(&mut self, normalized_key: String, record: MunicipalityRecord) -> bool {
        if self.index.contains_key(&normalized_key) {
            return false;
        }
        self.index.insert(normalized_key, self.records.len());
        self.records.push(record);
        true
    }

    /// Look up a record by its normalized key.
    pub fn get(&self, normalized_key: &str) -> Option<&MunicipalityRecord> {
        self.index.get(normalized_key).map(|&pos| &self.records[pos])
    }

    /// All records, in first-occurrence file order.
    pub fn records(&self) -> &[MunicipalityRecord] {
        &self.records
    }

    /// Number of distinct records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records were ingested.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of the one-time startup load, shared process-wide.
///
/// A failed build never exposes a partially built table; every query
/// operation checks this state before touching data.
#[derive(Debug)]
pub enum LoadState {
    /// Ingestion succeeded.
    Ready(Dataset),
    /// Ingestion failed with the given root cause.
    Failed(String),
}

impl LoadState {
    /// The dataset, or the stored failure message.
    pub fn dataset(&self) -> Result<&Dataset, &str> {
        match self {
            LoadState::Ready(ds) => Ok(ds),
            LoadState::Failed(msg) => Err(msg.as_str()),
        }
    }
}
