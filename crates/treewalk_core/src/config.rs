//! Engine configuration.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Result<Validator, String>> = OnceLock::new();

/// Configuration for the traversal engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Report nodes the walker does not model to the diagnostics sink.
    #[serde(default = "default_report_unrecognized")]
    pub report_unrecognized: bool,

    /// Walk the children of `Unknown` nodes instead of skipping them.
    #[serde(default)]
    pub descend_into_unknown: bool,

    /// Log every dispatched event at `trace` level.
    #[serde(default)]
    pub trace_events: bool,
}

fn default_report_unrecognized() -> bool {
    true
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            report_unrecognized: default_report_unrecognized(),
            descend_into_unknown: false,
            trace_events: false,
        }
    }

    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parses configuration from a JSON string with schema validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        // Parse into Value first for validation
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ConfigError::invalid(format!("Invalid JSON: {}", e)))?;

        let schema = CONFIG_SCHEMA
            .get_or_init(|| {
                let schema_json: serde_json::Value = serde_json::from_str(SCHEMA_JSON)
                    .map_err(|e| format!("Invalid embedded config schema: {}", e))?;
                Validator::new(&schema_json)
                    .map_err(|e| format!("Invalid config schema compilation: {}", e))
            })
            .as_ref()
            .map_err(|e| ConfigError::invalid(e.clone()))?;

        if let Err(e) = schema.validate(&value) {
            return Err(ConfigError::invalid(format!(
                "Config validation failed: {} at {}",
                e,
                e.instance_path()
            )));
        }

        serde_json::from_value(value).map_err(|e| ConfigError::invalid(e.to_string()))
    }

    pub fn report_unrecognized(mut self, yes: bool) -> Self {
        self.report_unrecognized = yes;
        self
    }

    pub fn descend_into_unknown(mut self, yes: bool) -> Self {
        self.descend_into_unknown = yes;
        self
    }

    pub fn trace_events(mut self, yes: bool) -> Self {
        self.trace_events = yes;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.report_unrecognized);
        assert!(!config.descend_into_unknown);
        assert!(!config.trace_events);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "report_unrecognized": false,
            "descend_into_unknown": true
        }"#;

        let config = EngineConfig::from_json(json).unwrap();
        assert!(!config.report_unrecognized);
        assert!(config.descend_into_unknown);
        assert!(!config.trace_events);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .report_unrecognized(false)
            .descend_into_unknown(true)
            .trace_events(true);
        assert!(!config.report_unrecognized);
        assert!(config.descend_into_unknown);
        assert!(config.trace_events);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "trace_events": true }}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert!(config.trace_events);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::from_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[rstest]
    #[case::unknown_property(r#"{ "trace": true }"#, "Config validation failed")]
    #[case::type_mismatch(r#"{ "trace_events": "yes" }"#, "Config validation failed")]
    #[case::not_an_object(r#"[]"#, "Config validation failed")]
    #[case::invalid_json(r#"{ "trace_events": "#, "Invalid JSON")]
    fn test_validation_errors(#[case] json: &str, #[case] expected: &str) {
        let err = EngineConfig::from_json(json).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "unexpected error: {}",
            err
        );
    }
}
