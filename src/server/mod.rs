//! HTTP surface: axum router and handlers for the read-only API.
//!
//! Routes:
//!
//! - `GET /`: liveness status
//! - `GET /api/municipios`: sorted display names
//! - `GET /api/municipio/:nome`: all fields for one municipality
//! - `GET /api/rankings/perdas` (alias `/api/ranking/perdas`): ascending
//!   ranking by total distribution losses
//! - `GET /api/ranking/perdas_por_ligacao`: ascending ranking by losses
//!   per connection
//! - `GET /api/resumo`: basin-wide means over the numeric fields
//!
//! Every error response is a JSON object with an `erro` message field; a
//! failed startup load yields 500 from every data endpoint, an unknown
//! municipality yields 404. Successful bodies are memoized in the
//! [`cache::ResponseCache`].

pub mod cache;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use crate::error::QueryError;
use crate::ingest::key;
use crate::query::{AggregateOp, QueryService, SortOrder};
use crate::schema::{LOSS_FIELD, LOSS_PER_CONNECTION_FIELD};

use cache::ResponseCache;

/// Fields summarized by `/api/resumo`.
const RESUMO_FIELDS: [&str; 8] = [
    "pop_total",
    "pop_urbana",
    "pct_pop_urbana",
    "perdas_totais",
    "perdas_por_ligacao",
    "consumo_per_capita",
    "atendimento_agua",
    "atendimento_esgoto",
];

/// Shared handler state: the query service plus the response cache.
#[derive(Clone)]
pub struct AppState {
    /// Query surface over the immutable load outcome.
    pub query: QueryService,
    /// Memoized successful responses.
    pub cache: Arc<ResponseCache>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/api/municipios", get(list_municipios))
        .route("/api/municipio/:nome", get(get_municipio))
        .route("/api/rankings/perdas", get(ranking_perdas))
        .route("/api/ranking/perdas", get(ranking_perdas))
        .route("/api/ranking/perdas_por_ligacao", get(ranking_perdas_por_ligacao))
        .route("/api/resumo", get(resumo))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

/// Handler-level error; everything maps to a JSON `{"erro": ...}` body.
pub enum ApiError {
    /// Expected query failures (not found, dataset unavailable).
    Query(QueryError),
    /// Anything unexpected; detail is logged, not leaked.
    Internal(String),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Query(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Query(e @ QueryError::NotFound(_)) => (StatusCode::NOT_FOUND, e.to_string()),
            ApiError::Query(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Internal(detail) => {
                error!(%detail, "unexpected handler error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro interno no servidor.".to_string(),
                )
            }
        };
        (status, Json(json!({ "erro": message }))).into_response()
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Serve from cache or produce, cache, and serve. Only successful bodies
/// reach the cache.
fn cached_json(
    state: &AppState,
    cache_key: &str,
    produce: impl FnOnce() -> Result<String, ApiError>,
) -> Result<Response, ApiError> {
    if let Some(body) = state.cache.get(cache_key) {
        return Ok(json_body(body));
    }
    let body = produce()?;
    state.cache.put(cache_key.to_string(), body.clone());
    Ok(json_body(body))
}

fn json_body(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        body,
    )
        .into_response()
}

async fn status() -> impl IntoResponse {
    Json(json!({ "status": "API online" }))
}

async fn list_municipios(State(state): State<AppState>) -> Result<Response, ApiError> {
    cached_json(&state, "/api/municipios", || {
        let names = state.query.list_names()?;
        to_body(&names)
    })
}

async fn get_municipio(
    State(state): State<AppState>,
    Path(nome): Path<String>,
) -> Result<Response, ApiError> {
    // Keyed by the normalized name so spelling variants share one entry.
    let cache_key = format!("/api/municipio/{}", key::normalize_key(&nome));
    cached_json(&state, &cache_key, || {
        let record = state.query.get_by_name(&nome)?;
        to_body(&record)
    })
}

async fn ranking_perdas(State(state): State<AppState>) -> Result<Response, ApiError> {
    ranking(&state, LOSS_FIELD, "/api/rankings/perdas")
}

async fn ranking_perdas_por_ligacao(State(state): State<AppState>) -> Result<Response, ApiError> {
    ranking(
        &state,
        LOSS_PER_CONNECTION_FIELD,
        "/api/ranking/perdas_por_ligacao",
    )
}

fn ranking(state: &AppState, field: &str, cache_key: &str) -> Result<Response, ApiError> {
    cached_json(state, cache_key, || {
        let entries = state.query.rank_by(field, SortOrder::Ascending)?;
        to_body(&entries)
    })
}

async fn resumo(State(state): State<AppState>) -> Result<Response, ApiError> {
    cached_json(&state, "/api/resumo", || {
        let mut medias = serde_json::Map::new();
        for field in RESUMO_FIELDS {
            let mean = state.query.aggregate(field, AggregateOp::Mean)?;
            medias.insert(field.to_string(), mean.map_or(json!(null), |v| json!(v)));
        }
        let municipios = state.query.list_names()?.len();
        to_body(&json!({ "municipios": municipios, "medias": medias }))
    })
}
