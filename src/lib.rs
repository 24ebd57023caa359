//! `saneamento-pcj` ingests the PCJ basin's municipal water-utility CSV
//! export (SNIS-style, Brazilian locale) into a cleaned in-memory
//! [`types::Dataset`] and serves it through a small read-only JSON API.
//!
//! The interesting part is the ingestion pipeline: the exports arrive with
//! unit/code rows below the header, header labels in several spellings
//! (including mojibake from encoding mismatches), `1.234,56`-style numbers,
//! and a zoo of null markers (`*`, `-`, `ND`, ...). [`ingest`] normalizes
//! all of that, driven by one declarative [`types::ColumnSchema`]
//! ([`schema::pcj_schema`] for the PCJ deployment), and builds a lookup
//! index keyed by the accent- and case-folded municipality name. The HTTP
//! layer on top is four thin read-only endpoints plus a TTL response cache.
//!
//! ## Quick example
//!
//! ```no_run
//! use saneamento_pcj::ingest::{IngestOptions, ingest_from_path};
//! use saneamento_pcj::schema::pcj_schema;
//!
//! # fn main() -> Result<(), saneamento_pcj::IngestError> {
//! let dataset = ingest_from_path(
//!     "dados_limpos_pcj.csv",
//!     &pcj_schema(),
//!     &IngestOptions::default(),
//! )?;
//! println!("municípios: {}", dataset.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: value model, column schema, dataset + lookup index
//! - [`schema`]: the static PCJ column table
//! - [`ingest`]: the cleaning pipeline (decode, rows, numeric, key, derive)
//! - [`query`]: read-only query operations over the loaded dataset
//! - [`server`]: axum router, handlers, response cache
//! - [`config`]: environment-driven runtime configuration
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod ingest;
pub mod query;
pub mod schema;
pub mod server;
pub mod types;

pub use error::{IngestError, IngestResult, QueryError};
