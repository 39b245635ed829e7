pub mod config;
pub mod extract;
pub mod intent;
pub mod models;
pub mod reply;
pub mod text;

pub use config::MatchConfig;
pub use extract::{TripExtractor, TripPhrase};
pub use intent::classify_intent;
pub use models::*;
pub use reply::compose_reply;
pub use text::normalize;
