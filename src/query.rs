//! Read-only query operations over the loaded dataset.
//!
//! Every operation checks the process-wide [`LoadState`] first: after a
//! failed startup load, all of them uniformly report
//! [`QueryError::Unavailable`] instead of touching partial data.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::error::QueryError;
use crate::ingest::key;
use crate::types::{Dataset, LoadState, MunicipalityRecord};

/// Ranking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest value first.
    Ascending,
    /// Largest value first.
    Descending,
}

/// Built-in aggregations over a single numeric field, skipping absent
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// Arithmetic mean.
    Mean,
    /// Sum.
    Sum,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
}

/// One ranking row: 1-based position, display name, metric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    /// Rank among municipalities with a present value (1-based,
    /// contiguous).
    pub posicao: usize,
    /// Display form of the municipality name.
    pub municipio: String,
    /// The ranked metric value.
    pub valor: f64,
}

/// The query surface over a shared, immutable load outcome.
#[derive(Clone)]
pub struct QueryService {
    state: Arc<LoadState>,
}

impl QueryService {
    /// Wrap a shared load outcome.
    pub fn new(state: Arc<LoadState>) -> Self {
        Self { state }
    }

    fn dataset(&self) -> Result<&Dataset, QueryError> {
        self.state
            .dataset()
            .map_err(|msg| QueryError::Unavailable(msg.to_string()))
    }

    /// Point lookup by municipality name.
    ///
    /// The input is normalized exactly like the index key (trim, accent
    /// fold, case fold), so lookups are case-, whitespace-, and
    /// accent-insensitive.
    pub fn get_by_name(&self, name: &str) -> Result<MunicipalityRecord, QueryError> {
        let ds = self.dataset()?;
        ds.get(&key::normalize_key(name))
            .cloned()
            .ok_or_else(|| QueryError::NotFound(name.trim().to_string()))
    }

    /// Ranked projection of one numeric field.
    ///
    /// Records with an absent value are excluded before positions are
    /// assigned, so positions are contiguous from 1 over the remaining
    /// records. The sort is stable: ties keep file order.
    pub fn rank_by(&self, field: &str, order: SortOrder) -> Result<Vec<RankEntry>, QueryError> {
        let ds = self.dataset()?;

        if !ds.is_empty() && ds.records().iter().all(|r| !r.fields.contains_key(field)) {
            return Err(QueryError::UnknownField(field.to_string()));
        }

        let mut entries: Vec<(String, f64)> = ds
            .records()
            .iter()
            .filter_map(|r| r.number(field).map(|v| (r.name.clone(), v)))
            .collect();

        // Stored numbers are always finite, so partial_cmp only falls back
        // on the Equal arm defensively.
        match order {
            SortOrder::Ascending => {
                entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
            }
            SortOrder::Descending => {
                entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            }
        }

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(i, (municipio, valor))| RankEntry {
                posicao: i + 1,
                municipio,
                valor,
            })
            .collect())
    }

    /// Sorted, deduplicated display names.
    pub fn list_names(&self) -> Result<Vec<String>, QueryError> {
        let ds = self.dataset()?;
        let mut names: Vec<String> = ds.records().iter().map(|r| r.name.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Aggregate one numeric field over all records with a present value.
    ///
    /// Returns `Ok(None)` when no value is eligible.
    pub fn aggregate(&self, field: &str, op: AggregateOp) -> Result<Option<f64>, QueryError> {
        let ds = self.dataset()?;
        let values: Vec<f64> = ds.records().iter().filter_map(|r| r.number(field)).collect();
        if values.is_empty() {
            return Ok(None);
        }

        let sum: f64 = values.iter().sum();
        let result = match op {
            AggregateOp::Mean => sum / values.len() as f64,
            AggregateOp::Sum => sum,
            AggregateOp::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateOp::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        Ok(Some(result))
    }
}
