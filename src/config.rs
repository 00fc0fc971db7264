//! Transaction builder configuration
//!
//! Configured by the integrator (file or code), immutable once a builder
//! has been created with it.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("named_uuid_prefix '{0}' is not a valid identifier")]
    InvalidPrefix(String),
}

/// Protocol `<id>` grammar (RFC 7047 §3.1)
pub(crate) fn is_identifier(text: &str) -> bool {
    static ID: OnceLock<Regex> = OnceLock::new();
    ID.get_or_init(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern compiles"))
        .is_match(text)
}

fn default_prefix() -> String {
    "row".to_string()
}

fn default_validate_references() -> bool {
    true
}

fn default_log_level() -> Severity {
    Severity::Warn
}

/// Builder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Prefix of generated `uuid-name`s; names are `<prefix><n>`, n from 1
    #[serde(default = "default_prefix")]
    pub named_uuid_prefix: String,

    /// Reject named uuids that no insert in the batch declares
    #[serde(default = "default_validate_references")]
    pub validate_references: bool,

    /// Minimum severity installed by [`BuilderConfig::install_logging`]
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            named_uuid_prefix: default_prefix(),
            validate_references: default_validate_references(),
            log_level: default_log_level(),
        }
    }
}

impl BuilderConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: BuilderConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_json_str(&text)?;
        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", &path.display().to_string()),
                ("named_uuid_prefix", &config.named_uuid_prefix),
            ],
        );
        Ok(config)
    }

    /// The prefix must itself be an identifier so that `<prefix><n>` is one.
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_identifier(&self.named_uuid_prefix) {
            return Err(ConfigError::InvalidPrefix(self.named_uuid_prefix.clone()));
        }
        Ok(())
    }

    /// Applies `log_level` to the process-wide logger.
    pub fn install_logging(&self) {
        Logger::set_min_severity(self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BuilderConfig::default();
        assert_eq!(config.named_uuid_prefix, "row");
        assert!(config.validate_references);
        assert_eq!(config.log_level, Severity::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = BuilderConfig::from_json_str(r#"{"named_uuid_prefix": "new_bridge"}"#).unwrap();
        assert_eq!(config.named_uuid_prefix, "new_bridge");
        assert!(config.validate_references);
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let err = BuilderConfig::from_json_str(r#"{"named_uuid_prefix": "9row"}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPrefix("9row".into()));
        assert!(BuilderConfig::from_json_str(r#"{"named_uuid_prefix": "row-"}"#).is_err());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            BuilderConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            BuilderConfig::from_json_str(r#"{"log_level": "LOUD"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"validate_references": false, "log_level": "ERROR"}}"#).unwrap();

        let config = BuilderConfig::load(file.path()).unwrap();
        assert!(!config.validate_references);
        assert_eq!(config.log_level, Severity::Error);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = BuilderConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_identifier_grammar() {
        assert!(is_identifier("row1"));
        assert!(is_identifier("_x"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1row"));
        assert!(!is_identifier("a-b"));
    }
}
