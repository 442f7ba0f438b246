// src/services/mod.rs

pub mod loader;     // NDJSON -> records, malformed lines dropped
pub mod posts;      // post filter + enrichment
pub mod sentiment;  // pluggable polarity scorer
pub mod stats;      // summary + per-bot activity
pub mod graph;      // @-mention graph + render
pub mod layout;     // force-directed node placement
pub mod plot;       // smoothed sentiment chart
pub mod report;     // template fill + write
pub mod store;      // the ONLY SQLite writer

// Public API
pub use graph::InteractionGraph;
pub use loader::{EventRecord, LoadedLog};
pub use posts::{EnrichError, EnrichedPost};
pub use sentiment::{LexiconScorer, SentimentScorer};
pub use stats::{BotActivity, RunSummary};
pub use store::Store;
