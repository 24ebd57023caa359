use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Fatal ingestion errors.
///
/// Any of these aborts the startup load as a whole. Per-cell problems (a
/// value that fails Brazilian-locale numeric conversion, an unknown null
/// marker) are *not* errors: they become [`crate::types::Value::Absent`]
/// and never appear here.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV-level parse error (malformed quoting the lenient reader could
    /// not recover from).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// No configured encoding produced clean text.
    #[error("undecodable input: every configured encoding produced corrupt text (tried {tried:?})")]
    Decode { tried: Vec<&'static str> },

    /// The input has no header row (empty file or all rows skipped).
    #[error("input has no header row: {path}")]
    EmptyInput { path: String },

    /// The natural-key column was not found under any spelling the schema
    /// knows about.
    #[error("key column '{column}' not found under any known spelling. headers={headers:?}")]
    MissingKeyColumn { column: String, headers: Vec<String> },

    /// The column schema itself is invalid (duplicate canonical names,
    /// derived field referencing a non-numeric input, ...).
    #[error("schema configuration error: {message}")]
    SchemaConfig { message: String },
}

/// Errors surfaced by the query service.
///
/// Messages are user-facing (the HTTP layer forwards them verbatim inside a
/// JSON error body), so they are worded in the dataset's language.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No record under the queried municipality name.
    #[error("Município '{0}' não encontrado.")]
    NotFound(String),

    /// The startup load failed; no data endpoint can answer.
    #[error("{0}")]
    Unavailable(String),

    /// The requested field is not part of the dataset.
    #[error("Campo '{0}' não encontrado nos dados.")]
    UnknownField(String),
}
