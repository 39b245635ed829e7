use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use parking_lot::RwLock;
use ruta_core::intent::is_affirmative;
use ruta_core::{
    classify_intent, compose_reply, normalize, ConversationTurn, Intent, MatchConfig,
    PendingConfirmation, Query, SessionState, TripExtractor, TurnInput, TurnOutcome, TurnReply,
};
use ruta_fares::{FareTable, Resolution, TableError, TableStats};
use ruta_observability::AppMetrics;
use tracing::{info, instrument};
use uuid::Uuid;

const MAX_TURNS_KEPT: usize = 40;

pub trait SessionRepository: Send + Sync {
    async fn load_session(&self, session_id: &str) -> Result<Option<SessionState>>;
    async fn upsert_session(&self, session: &SessionState) -> Result<()>;
}

/// In-process session store. Sessions do not outlive the process, and
/// each one is capped at the last `MAX_TURNS_KEPT` turns.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemorySessionStore {
    async fn load_session(&self, session_id: &str) -> Result<Option<SessionState>> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn upsert_session(&self, session: &SessionState) -> Result<()> {
        self.sessions
            .write()
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }
}

/// The turn-processing pipeline: normalization, intent classification,
/// trip extraction, fare resolution, and the confirmation sub-protocol,
/// threaded through explicit per-session state.
pub struct FareConcierge<S>
where
    S: SessionRepository,
{
    table: RwLock<Arc<FareTable>>,
    config: MatchConfig,
    extractor: TripExtractor,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> FareConcierge<S>
where
    S: SessionRepository,
{
    pub fn new(
        table: FareTable,
        config: MatchConfig,
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        let extractor = TripExtractor::new(&config);
        Self {
            table: RwLock::new(Arc::new(table)),
            config,
            extractor,
            store,
            metrics,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn table_stats(&self) -> TableStats {
        self.table.read().stats()
    }

    pub fn metrics(&self) -> Arc<AppMetrics> {
        self.metrics.clone()
    }

    /// Builds a fresh snapshot from the source file and swaps it in.
    /// In-flight turns keep reading the snapshot they started with.
    pub fn reload_table(&self, path: impl AsRef<Path>) -> Result<TableStats, TableError> {
        let table = FareTable::from_csv_path(path, &self.config)?;
        let stats = table.stats();
        *self.table.write() = Arc::new(table);
        Ok(stats)
    }

    #[instrument(skip(self, input))]
    pub async fn handle_turn(&self, input: TurnInput) -> Result<TurnReply> {
        let started = Instant::now();
        self.metrics.inc_turn();

        let session_id = input
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut session = self
            .store
            .load_session(&session_id)
            .await?
            .unwrap_or_else(|| SessionState {
                session_id: session_id.clone(),
                turns: Vec::new(),
                pending: None,
            });

        let normalized = normalize(&input.text);

        // a pending confirmation is consumed by the next utterance no
        // matter what the user answered
        let (intent, outcome) = match session.pending.take() {
            Some(pending) => {
                if is_affirmative(&normalized, &self.config) {
                    let home_city = self.config.home_city.clone();
                    let outcome = self.resolve_trip(
                        &home_city,
                        &pending.candidate_destination,
                        &mut session,
                    );
                    (Intent::TripQuery, outcome)
                } else {
                    (Intent::TripQuery, TurnOutcome::NoExtractableTrip)
                }
            }
            None => {
                let query = self.build_query(&input.text, &normalized);
                let outcome = match (query.intent, &query.origin_phrase, &query.destination_phrase)
                {
                    (Intent::Greeting, ..) => TurnOutcome::Greeting,
                    (Intent::Farewell, ..) => TurnOutcome::Farewell,
                    (Intent::TripQuery, Some(origin), Some(destination)) => {
                        self.resolve_trip(origin, destination, &mut session)
                    }
                    (Intent::TripQuery, ..) => TurnOutcome::NoExtractableTrip,
                };
                (query.intent, outcome)
            }
        };

        match &outcome {
            TurnOutcome::Fares { .. } => self.metrics.inc_resolved(),
            TurnOutcome::NeedsConfirmation { .. } => self.metrics.inc_confirmation(),
            TurnOutcome::NoMatchingFare | TurnOutcome::NoExtractableTrip => {
                self.metrics.inc_unmatched()
            }
            TurnOutcome::Greeting | TurnOutcome::Farewell => {}
        }

        let reply_text = compose_reply(&outcome);

        session.turns.push(ConversationTurn {
            at: Utc::now(),
            user_text: input.text.clone(),
            reply_text: reply_text.clone(),
            intent,
        });
        if session.turns.len() > MAX_TURNS_KEPT {
            let keep_from = session.turns.len() - MAX_TURNS_KEPT;
            session.turns = session.turns.split_off(keep_from);
        }
        self.store.upsert_session(&session).await?;

        self.metrics.observe_latency(started.elapsed());
        info!(
            session_id = %session_id,
            intent = ?intent,
            outcome = %outcome_label(&outcome),
            "turn handled"
        );

        Ok(TurnReply {
            session_id,
            intent,
            outcome,
            reply_text,
        })
    }

    /// Classification plus extraction, packaged as one fresh `Query`
    /// per utterance.
    fn build_query(&self, raw: &str, normalized: &str) -> Query {
        let intent = classify_intent(normalized, &self.config);
        let (origin_phrase, destination_phrase) = match intent {
            Intent::TripQuery => match self.extractor.extract(normalized) {
                Some(trip) => (Some(trip.origin), Some(trip.destination)),
                None => (None, None),
            },
            _ => (None, None),
        };

        Query {
            raw_text: raw.to_string(),
            normalized_text: normalized.to_string(),
            intent,
            origin_phrase,
            destination_phrase,
        }
    }

    fn resolve_trip(
        &self,
        origin: &str,
        destination: &str,
        session: &mut SessionState,
    ) -> TurnOutcome {
        let table = self.table.read().clone();
        match table.resolve(origin, destination, &self.config) {
            Resolution::Matched { rows } => TurnOutcome::Fares {
                origin: origin.to_string(),
                destination: destination.to_string(),
                rows,
            },
            Resolution::NeedsConfirmation { candidate } => {
                session.pending = Some(PendingConfirmation {
                    candidate_destination: candidate.clone(),
                });
                TurnOutcome::NeedsConfirmation { candidate }
            }
            Resolution::NoMatch => TurnOutcome::NoMatchingFare,
        }
    }
}

fn outcome_label(outcome: &TurnOutcome) -> &'static str {
    match outcome {
        TurnOutcome::Greeting => "greeting",
        TurnOutcome::Farewell => "farewell",
        TurnOutcome::Fares { .. } => "fares",
        TurnOutcome::NoExtractableTrip => "no_extractable_trip",
        TurnOutcome::NoMatchingFare => "no_matching_fare",
        TurnOutcome::NeedsConfirmation { .. } => "needs_confirmation",
    }
}
