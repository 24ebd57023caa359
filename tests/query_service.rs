//! End-to-end checks of the query surface over a freshly ingested fixture.

use std::sync::Arc;

use saneamento_pcj::ingest::{IngestOptions, ingest_from_path};
use saneamento_pcj::query::{AggregateOp, QueryService, SortOrder};
use saneamento_pcj::schema::{LOSS_FIELD, LOSS_PER_CONNECTION_FIELD, pcj_schema};
use saneamento_pcj::types::LoadState;

fn fixture_service() -> QueryService {
    let ds = ingest_from_path(
        "tests/fixtures/dados_pcj.csv",
        &pcj_schema(),
        &IngestOptions::default(),
    )
    .unwrap();
    QueryService::new(Arc::new(LoadState::Ready(ds)))
}

#[test]
fn loss_ranking_is_ascending_with_contiguous_positions() {
    let ranking = fixture_service()
        .rank_by(LOSS_FIELD, SortOrder::Ascending)
        .unwrap();

    assert_eq!(ranking.len(), 4);
    for (i, entry) in ranking.iter().enumerate() {
        assert_eq!(entry.posicao, i + 1);
    }
    for pair in ranking.windows(2) {
        assert!(pair[0].valor <= pair[1].valor);
    }

    assert_eq!(ranking[0].municipio, "Águas de São Pedro");
    assert_eq!(ranking[3].municipio, "São Pedro");
}

#[test]
fn per_connection_ranking_excludes_absent_values() {
    let ranking = fixture_service()
        .rank_by(LOSS_PER_CONNECTION_FIELD, SortOrder::Ascending)
        .unwrap();

    // São Pedro's value is a null marker in the fixture; it must be gone
    // and positions renumbered from 1 over the survivors.
    assert_eq!(ranking.len(), 3);
    assert!(ranking.iter().all(|e| e.municipio != "São Pedro"));
    assert_eq!(
        ranking.iter().map(|e| e.posicao).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn lookup_is_insensitive_to_case_whitespace_and_accents() {
    let svc = fixture_service();
    let by_upper = svc.get_by_name("ÁGUAS DE SÃO PEDRO").unwrap();
    let by_folded = svc.get_by_name("aguas de sao pedro").unwrap();
    let by_padded = svc.get_by_name("  Águas de São Pedro  ").unwrap();

    assert_eq!(by_upper, by_folded);
    assert_eq!(by_folded, by_padded);
}

#[test]
fn names_are_sorted_and_distinct_despite_duplicate_source_rows() {
    let names = fixture_service().list_names().unwrap();

    let mut expected = names.clone();
    expected.sort();
    expected.dedup();
    assert_eq!(names, expected);

    // The duplicated AMERICANA row collapses to one entry.
    assert_eq!(names.iter().filter(|n| *n == "Americana").count(), 1);
    assert_eq!(names.len(), 4);
}

#[test]
fn basin_mean_skips_absent_values() {
    let mean = fixture_service()
        .aggregate(LOSS_PER_CONNECTION_FIELD, AggregateOp::Mean)
        .unwrap()
        .unwrap();

    // Mean over the three present values only.
    let expected = (512.3 + 380.9 + 210.5) / 3.0;
    assert!((mean - expected).abs() < 1e-9);
}
