//! Replays a journal file through the Hindsight history driver.
//!
//! ```text
//! hindsight-replay <journal> [config.yaml]
//! ```
//!
//! Every line goes through [`History::ingest`]. Out-of-order records are
//! logged and skipped. With `replay.follow` set, the reader keeps polling
//! the file for appends until interrupted. The final aggregate state is
//! printed to stdout as JSON.

mod error;
mod journal;
mod report;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use hindsight_core::{CoreError, HindsightConfig, History, IngestOutcome};
use hindsight_state::Catalog;
use hindsight_types::EventKind;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ReplayError;
use crate::journal::JournalReader;
use crate::report::{ReplayCounts, ReplayReport};

/// Command line arguments.
#[derive(Debug)]
struct Args {
    journal: PathBuf,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ReplayError> {
        let journal = args.next().ok_or_else(|| ReplayError::Usage {
            message: String::from("missing journal path"),
        })?;
        let config = args.next().map(PathBuf::from);
        if let Some(extra) = args.next() {
            return Err(ReplayError::Usage {
                message: format!("unexpected argument {extra}"),
            });
        }
        Ok(Self {
            journal: PathBuf::from(journal),
            config,
        })
    }
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the arguments, configuration, or journal file cannot
/// be read, or the report cannot be encoded.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => HindsightConfig::from_file(path).map_err(ReplayError::from)?,
        None => HindsightConfig::parse("").map_err(ReplayError::from)?,
    };

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        journal = %args.journal.display(),
        follow = config.replay.follow,
        dedupe_adjacent = config.history.dedupe_adjacent,
        enforce_ordering = config.history.enforce_ordering,
        "hindsight-replay starting"
    );

    let report = replay(&args, &config).await?;
    println!("{}", serde_json::to_string_pretty(&report).map_err(ReplayError::from)?);
    Ok(())
}

/// Fold every line of the journal into a fresh history.
async fn replay(args: &Args, config: &HindsightConfig) -> Result<ReplayReport, ReplayError> {
    let mut history = History::new(Arc::new(Catalog::standard()), config);
    let mut reader = JournalReader::open(
        &args.journal,
        config.replay.follow,
        Duration::from_millis(config.replay.poll_interval_ms),
    )
    .await?;
    let mut counts = ReplayCounts::default();

    loop {
        let line = tokio::select! {
            line = reader.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping replay");
                break;
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        counts.lines = counts.lines.saturating_add(1);
        tally(&mut history, &line, &mut counts);
    }

    info!(
        lines = counts.lines,
        folded = counts.folded,
        duplicates = counts.duplicates,
        rejected = counts.rejected,
        unknown = counts.unknown,
        malformed = counts.malformed,
        "replay complete"
    );
    Ok(ReplayReport::from_history(&history, counts))
}

/// Ingest one line and count what became of it.
fn tally(history: &mut History, line: &str, counts: &mut ReplayCounts) {
    match history.ingest(line) {
        Ok(IngestOutcome::Folded { index, markers }) => {
            counts.folded = counts.folded.saturating_add(1);
            match history.entry(index).map(|e| e.record.kind()) {
                Some(EventKind::Unknown) => counts.unknown = counts.unknown.saturating_add(1),
                Some(EventKind::Malformed) => {
                    counts.malformed = counts.malformed.saturating_add(1);
                }
                _ => {}
            }
            debug!(index, ?markers, "record folded");
        }
        Ok(IngestOutcome::Duplicate { of }) => {
            counts.duplicates = counts.duplicates.saturating_add(1);
            debug!(of, "duplicate record skipped");
        }
        Err(e @ CoreError::OutOfOrder { .. }) => {
            counts.rejected = counts.rejected.saturating_add(1);
            warn!(error = %e, "record skipped");
        }
        Err(e) => {
            counts.rejected = counts.rejected.saturating_add(1);
            error!(error = %e, "record could not be folded");
        }
    }
}
