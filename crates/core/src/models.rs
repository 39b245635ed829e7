use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Farewell,
    TripQuery,
}

/// One observed fare from the reference table. Immutable once loaded;
/// duplicates with differing fares are valid and feed min/max aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareRecord {
    pub operator: String,
    pub mode: String,
    pub origin: String,
    pub destination: String,
    pub fare: Decimal,
}

/// Aggregated fares for one (operator, mode) group of matching records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareSummaryRow {
    pub operator: String,
    pub mode: String,
    pub fare_min: Decimal,
    pub fare_max: Decimal,
}

/// A single classified utterance, constructed fresh per turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub raw_text: String,
    pub normalized_text: String,
    pub intent: Intent,
    pub origin_phrase: Option<String>,
    pub destination_phrase: Option<String>,
}

/// Low-confidence destination guess awaiting a yes/no reply. At most one
/// per session; consumed by the next utterance regardless of the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub candidate_destination: String,
}

/// What a processed turn means for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    Greeting,
    Farewell,
    Fares {
        origin: String,
        destination: String,
        rows: Vec<FareSummaryRow>,
    },
    NoExtractableTrip,
    NoMatchingFare,
    NeedsConfirmation {
        candidate: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub at: DateTime<Utc>,
    pub user_text: String,
    pub reply_text: String,
    pub intent: Intent,
}

/// Per-session mutable state, threaded explicitly through the turn
/// entry point. Never shared across sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    pub turns: Vec<ConversationTurn>,
    pub pending: Option<PendingConfirmation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    pub session_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    pub session_id: String,
    pub intent: Intent,
    pub outcome: TurnOutcome,
    pub reply_text: String,
}
