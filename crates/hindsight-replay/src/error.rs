//! Error types for the replay binary.

/// Top-level error for the replay binary.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The command line was not understood.
    #[error("usage: hindsight-replay <journal> [config.yaml] ({message})")]
    Usage {
        /// What was wrong.
        message: String,
    },

    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hindsight_core::ConfigError,
    },

    /// Reading the journal failed.
    #[error("journal read error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Writing the report failed.
    #[error("report encoding error: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
