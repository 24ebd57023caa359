//! In-process HTTP round trips against the full router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use saneamento_pcj::ingest::{IngestOptions, ingest_from_path};
use saneamento_pcj::query::QueryService;
use saneamento_pcj::schema::pcj_schema;
use saneamento_pcj::server::{AppState, cache::ResponseCache, router};
use saneamento_pcj::types::LoadState;

fn app_from(state: LoadState) -> Router {
    router(AppState {
        query: QueryService::new(Arc::new(state)),
        cache: Arc::new(ResponseCache::new(Duration::from_secs(3600))),
    })
}

fn ready_app() -> Router {
    let ds = ingest_from_path(
        "tests/fixtures/dados_pcj.csv",
        &pcj_schema(),
        &IngestOptions::default(),
    )
    .unwrap();
    app_from(LoadState::Ready(ds))
}

fn failed_app() -> Router {
    app_from(LoadState::Failed(
        "Erro crítico na inicialização: io error: arquivo não encontrado".to_string(),
    ))
}

async fn get_request(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn status_endpoint_is_alive() {
    let (status, body) = get_request(&ready_app(), "/").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "API online");
}

#[tokio::test]
async fn municipios_are_sorted_and_accents_stay_unescaped() {
    let (status, body) = get_request(&ready_app(), "/api/municipios").await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<String> = serde_json::from_str(&body).unwrap();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 4);

    // Raw body carries the accented characters, not \u escapes.
    assert!(body.contains("São Pedro"));
    assert!(!body.contains("\\u"));
}

#[tokio::test]
async fn municipio_lookup_returns_the_full_record() {
    let (status, body) = get_request(&ready_app(), "/api/municipio/Americana").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["municipio"], "Americana");
    assert_eq!(json["uf"], "SP");
    assert_eq!(json["perdas_totais"], 37.5);
    let pct = json["pct_pop_urbana"].as_f64().unwrap();
    assert!((pct - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn municipio_lookup_is_normalized_and_absent_fields_are_null() {
    let (status, body) = get_request(&ready_app(), "/api/municipio/SAO%20PEDRO").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["municipio"], "São Pedro");
    assert!(json["perdas_por_ligacao"].is_null());
    assert!(json["atendimento_esgoto"].is_null());
}

#[tokio::test]
async fn unknown_municipio_is_404_naming_the_key() {
    let (status, body) = get_request(&ready_app(), "/api/municipio/Inexistente").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["erro"].as_str().unwrap().contains("Inexistente"));
}

#[tokio::test]
async fn loss_ranking_is_ascending_with_positions_from_one() {
    let (status, body) = get_request(&ready_app(), "/api/rankings/perdas").await;
    assert_eq!(status, StatusCode::OK);

    let entries: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["posicao"], 1);
    assert_eq!(entries[0]["municipio"], "Águas de São Pedro");

    let valores: Vec<f64> = entries.iter().map(|e| e["valor"].as_f64().unwrap()).collect();
    assert!(valores.windows(2).all(|p| p[0] <= p[1]));
}

#[tokio::test]
async fn singular_ranking_path_is_an_alias() {
    let app = ready_app();
    let (_, plural) = get_request(&app, "/api/rankings/perdas").await;
    let (status, singular) = get_request(&app, "/api/ranking/perdas").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(plural, singular);
}

#[tokio::test]
async fn per_connection_ranking_drops_absent_rows() {
    let (status, body) = get_request(&ready_app(), "/api/ranking/perdas_por_ligacao").await;
    assert_eq!(status, StatusCode::OK);

    let entries: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e["municipio"] != "São Pedro"));
}

#[tokio::test]
async fn resumo_reports_basin_means() {
    let (status, body) = get_request(&ready_app(), "/api/resumo").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["municipios"], 4);
    assert!(json["medias"]["perdas_totais"].is_number());
    // Per-connection losses are absent for one municipality; the mean
    // still exists over the others.
    assert!(json["medias"]["perdas_por_ligacao"].is_number());
}

#[tokio::test]
async fn failed_load_yields_500_from_every_data_endpoint() {
    let app = failed_app();

    for uri in [
        "/api/municipios",
        "/api/municipio/Americana",
        "/api/rankings/perdas",
        "/api/ranking/perdas",
        "/api/ranking/perdas_por_ligacao",
        "/api/resumo",
    ] {
        let (status, body) = get_request(&app, uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "uri={uri}");

        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(
            json["erro"]
                .as_str()
                .unwrap()
                .contains("Erro crítico na inicialização"),
            "uri={uri}"
        );
    }

    // Liveness stays up even when the dataset never loaded.
    let (status, _) = get_request(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
}
