//! Configuration loading and typed config structures.
//!
//! Configuration is a small YAML document. Every field has a default, so an
//! empty document (or no file at all) is a valid configuration.

use std::path::Path;

use hindsight_events::EquivalenceRules;
use serde::Deserialize;

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "HINDSIGHT_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HindsightConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// History driver behaviour.
    #[serde(default)]
    pub history: HistoryConfig,

    /// Which document keys duplicate detection ignores.
    #[serde(default)]
    pub equivalence: EquivalenceConfig,

    /// Journal replay settings.
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl HindsightConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `HINDSIGHT_LOG` overrides `logging.level`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Apply the `HINDSIGHT_LOG` override, if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(LOG_LEVEL_ENV) {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// History driver behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HistoryConfig {
    /// Skip a record equivalent to the one before it at the same timestamp.
    #[serde(default = "default_true")]
    pub dedupe_adjacent: bool,

    /// Reject records timestamped before the last folded record.
    #[serde(default = "default_true")]
    pub enforce_ordering: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dedupe_adjacent: true,
            enforce_ordering: true,
        }
    }
}

/// Keys ignored by duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EquivalenceConfig {
    /// Keys starting with any of these are ignored.
    #[serde(default = "default_private_key_prefixes")]
    pub private_key_prefixes: Vec<String>,

    /// Keys equal to any of these are ignored.
    #[serde(default = "default_private_keys")]
    pub private_keys: Vec<String>,
}

impl EquivalenceConfig {
    /// Build the comparison rules.
    pub fn rules(&self) -> EquivalenceRules {
        EquivalenceRules::new(self.private_key_prefixes.clone(), self.private_keys.clone())
    }
}

impl Default for EquivalenceConfig {
    fn default() -> Self {
        Self {
            private_key_prefixes: default_private_key_prefixes(),
            private_keys: default_private_keys(),
        }
    }
}

/// Journal replay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ReplayConfig {
    /// Keep reading as the journal grows.
    #[serde(default)]
    pub follow: bool,

    /// Delay between checks for new lines while following.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            follow: false,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}

fn default_private_key_prefixes() -> Vec<String> {
    vec![String::from("EDD")]
}

fn default_private_keys() -> Vec<String> {
    vec![String::from("StarPosFromEDSM")]
}

const fn default_poll_interval_ms() -> u64 {
    250
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = HindsightConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.history.dedupe_adjacent);
        assert!(config.history.enforce_ordering);
        assert_eq!(config.equivalence.private_key_prefixes, vec!["EDD"]);
        assert_eq!(config.replay.poll_interval_ms, 250);
        assert!(!config.replay.follow);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
history:
  dedupe_adjacent: false
  enforce_ordering: false
equivalence:
  private_key_prefixes: ["EDD", "X_"]
  private_keys: []
replay:
  follow: true
  poll_interval_ms: 1000
"#;
        let config = HindsightConfig::parse(yaml).unwrap();
        assert!(!config.history.dedupe_adjacent);
        assert!(!config.history.enforce_ordering);
        assert!(config.equivalence.rules().is_private("X_note"));
        assert!(!config.equivalence.rules().is_private("StarPosFromEDSM"));
        assert!(config.replay.follow);
        assert_eq!(config.replay.poll_interval_ms, 1000);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = HindsightConfig::parse("replay:\n  follow: true\n").unwrap();
        assert!(config.replay.follow);
        assert_eq!(config.replay.poll_interval_ms, 250);
        assert!(config.history.dedupe_adjacent);
    }

    #[test]
    fn empty_document_is_default() {
        let config = HindsightConfig::parse("").unwrap();
        assert_eq!(config.history, HistoryConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            HindsightConfig::parse("history: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
