//! Configuration and the history driver for the Hindsight journal engine.
//!
//! [`History`] turns a stream of journal lines into versioned aggregates and
//! remembers, for every folded record, the generation each aggregate reached.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration ([`HindsightConfig`])
//! - [`history`] -- ingest pipeline and point-in-time views ([`History`])

pub mod config;
pub mod history;

pub use config::{ConfigError, HindsightConfig};
pub use history::{
    CoreError, GenerationMarkers, History, HistoryEntry, HistoryReaders, IngestOutcome,
};
