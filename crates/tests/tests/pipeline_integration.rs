use std::path::PathBuf;
use std::sync::Arc;

use rust_decimal::Decimal;
use ruta_agent::{FareConcierge, MemorySessionStore};
use ruta_core::{Intent, MatchConfig, TurnInput, TurnOutcome, TurnReply};
use ruta_fares::{FareTable, TableError};
use ruta_observability::AppMetrics;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn concierge() -> FareConcierge<MemorySessionStore> {
    let config = MatchConfig::default();
    let table =
        FareTable::from_csv_path(fixture("tarifas.csv"), &config).expect("fixture table loads");
    FareConcierge::new(
        table,
        config,
        Arc::new(MemorySessionStore::new()),
        AppMetrics::shared(),
    )
}

async fn turn(
    concierge: &FareConcierge<MemorySessionStore>,
    session_id: Option<String>,
    text: &str,
) -> TurnReply {
    concierge
        .handle_turn(TurnInput {
            session_id,
            text: text.to_string(),
        })
        .await
        .expect("turn handled")
}

#[test]
fn fixture_table_builds_index_once() {
    let config = MatchConfig::default();
    let table = FareTable::from_csv_path(fixture("tarifas.csv"), &config).unwrap();
    let stats = table.stats();

    assert_eq!(stats.records, 9);
    assert_eq!(stats.localities, 7);
    assert_eq!(stats.destinations, 6);
}

#[test]
fn malformed_table_is_fatal_before_any_resolution() {
    let config = MatchConfig::default();
    match FareTable::from_csv_path(fixture("tarifas_sin_destino.csv"), &config) {
        Err(TableError::MissingColumn("DESTINO")) => {}
        other => panic!("expected MissingColumn(DESTINO), got {other:?}"),
    }
}

#[tokio::test]
async fn conversation_flows_through_greeting_query_and_farewell() {
    let concierge = concierge();

    let hello = turn(&concierge, None, "¡Hola!").await;
    assert_eq!(hello.intent, Intent::Greeting);
    let session = Some(hello.session_id.clone());

    let query = turn(&concierge, session.clone(), "de Córdoba a Carlos Paz").await;
    match &query.outcome {
        TurnOutcome::Fares {
            origin,
            destination,
            rows,
        } => {
            assert_eq!(origin, "CORDOBA");
            assert_eq!(destination, "CARLOS PAZ");
            assert_eq!(rows.len(), 2);
            // Sierras group aggregates both observations
            assert_eq!(rows[0].operator, "Sierras de Calamuchita");
            assert_eq!(rows[0].fare_min, Decimal::new(1200, 0));
            assert_eq!(rows[0].fare_max, Decimal::new(1500, 0));
            // sorted ascending by fare_min
            assert!(rows[0].fare_min <= rows[1].fare_min);
        }
        other => panic!("expected fares, got {other:?}"),
    }

    let bye = turn(&concierge, session, "gracias").await;
    assert_eq!(bye.intent, Intent::Farewell);
    assert_eq!(bye.outcome, TurnOutcome::Farewell);
}

#[tokio::test]
async fn typos_and_noise_words_still_resolve() {
    let concierge = concierge();

    // CORDOVA ~ CORDOBA, fare row destination carries a TERMINAL qualifier
    let reply = turn(&concierge, None, "de Cordova a Rio Cuarto").await;
    match reply.outcome {
        TurnOutcome::Fares { rows, .. } => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].mode, "Común");
            assert_eq!(rows[1].mode, "Ejecutivo");
        }
        other => panic!("expected fares, got {other:?}"),
    }
}

#[tokio::test]
async fn destination_only_query_defaults_origin_to_home_city() {
    let concierge = concierge();

    let reply = turn(&concierge, None, "quiero ir a La Falda").await;
    match reply.outcome {
        TurnOutcome::Fares { origin, rows, .. } => {
            assert_eq!(origin, "CORDOBA");
            assert_eq!(rows[0].operator, "Fono Bus");
        }
        other => panic!("expected fares, got {other:?}"),
    }
}

#[tokio::test]
async fn confirmation_protocol_round_trip() {
    let concierge = concierge();

    let guess = turn(&concierge, None, "coskin").await;
    let candidate = match &guess.outcome {
        TurnOutcome::NeedsConfirmation { candidate } => candidate.clone(),
        other => panic!("expected confirmation request, got {other:?}"),
    };
    assert_eq!(candidate, "Cosquín");
    assert!(guess.reply_text.contains("Cosquín"));

    let confirmed = turn(&concierge, Some(guess.session_id), "si").await;
    match confirmed.outcome {
        TurnOutcome::Fares { rows, .. } => assert_eq!(rows[0].operator, "Fono Bus"),
        other => panic!("expected fares after confirmation, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_trip_reports_guidance_without_matching() {
    let concierge = concierge();

    let reply = turn(&concierge, None, "de Córdoba a Bariloche").await;
    assert_eq!(reply.outcome, TurnOutcome::NoMatchingFare);

    let metrics = concierge.metrics().snapshot();
    assert_eq!(metrics.turns_total, 1);
    assert_eq!(metrics.unmatched_total, 1);
    assert_eq!(metrics.resolved_total, 0);
}

#[tokio::test]
async fn reload_swaps_in_a_fresh_snapshot() {
    let concierge = concierge();
    let before = concierge.table_stats();

    let after = concierge
        .reload_table(fixture("tarifas.csv"))
        .expect("reload succeeds");
    assert_eq!(before.records, after.records);

    // the new snapshot still resolves
    let reply = turn(&concierge, None, "a Alta Gracia").await;
    assert!(matches!(reply.outcome, TurnOutcome::Fares { .. }));
}

#[tokio::test]
async fn turn_reply_serializes_for_frontends() {
    let concierge = concierge();
    let reply = turn(&concierge, None, "de Córdoba a Carlos Paz").await;

    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(value["outcome"]["kind"], "fares");
    assert!(value["reply_text"].as_str().unwrap().contains("Carlos Paz"));
}
