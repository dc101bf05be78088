//! TOML configuration for ToolDB.
//!
//! Every section is optional; a missing file section falls back to the
//! in-memory backend and the stock defaults.

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Environment variable the CLI reads for the config path.
pub const CONFIG_ENV: &str = "TOOLDB_CONFIG";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// ToolDbConfig
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolDbConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl ToolDbConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.defaults.validate()?;

        if self.log.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("log.filter must not be empty".to_string()));
        }

        Ok(())
    }
}

///
/// BackendKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
}

///
/// StoreConfig
///
/// Storage collaborator selection. `path` is required for the file backend
/// and ignored by the memory backend.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    #[must_use]
    pub const fn memory() -> Self {
        Self {
            backend: BackendKind::Memory,
            path: None,
        }
    }

    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::File,
            path: Some(path.into()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.backend, &self.path) {
            (BackendKind::File, None) => Err(ConfigError::Invalid(
                "store.path is required for the file backend".to_string(),
            )),
            (BackendKind::File, Some(path)) if path.as_os_str().is_empty() => Err(
                ConfigError::Invalid("store.path must not be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

///
/// LogConfig
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// `tracing-subscriber` env-filter directive.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

///
/// DefaultsConfig
///
/// Values applied by the handler when a caller leaves a field unset.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    #[serde(default = "default_magazine_pockets")]
    pub magazine_pockets: u32,

    /// Stored on new tools; negative means "no limit".
    #[serde(default = "default_tool_max_rpm")]
    pub tool_max_rpm: f64,
}

impl DefaultsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.magazine_pockets == 0 {
            return Err(ConfigError::Invalid(
                "defaults.magazine_pockets must be at least 1".to_string(),
            ));
        }
        if !self.tool_max_rpm.is_finite() {
            return Err(ConfigError::Invalid(
                "defaults.tool_max_rpm must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            magazine_pockets: default_magazine_pockets(),
            tool_max_rpm: default_tool_max_rpm(),
        }
    }
}

const fn default_magazine_pockets() -> u32 {
    12
}

const fn default_tool_max_rpm() -> f64 {
    -1.0
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ToolDbConfig::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, ToolDbConfig::default());
        assert_eq!(config.store.backend, BackendKind::Memory);
        assert_eq!(config.defaults.magazine_pockets, 12);
        assert!((config.defaults.tool_max_rpm + 1.0).abs() < f64::EPSILON);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn file_backend_parses_path() {
        let config = ToolDbConfig::from_toml_str(
            r#"
            [store]
            backend = "file"
            path = "/var/lib/tooldb/tools.cbor"

            [log]
            filter = "tooldb_core=debug"

            [defaults]
            magazine_pockets = 24
            "#,
        )
        .expect("file config should parse");

        assert_eq!(
            config.store,
            StoreConfig::file("/var/lib/tooldb/tools.cbor")
        );
        assert_eq!(config.log.filter, "tooldb_core=debug");
        assert_eq!(config.defaults.magazine_pockets, 24);
    }

    #[test]
    fn file_backend_without_path_is_rejected() {
        let err = ToolDbConfig::from_toml_str("[store]\nbackend = \"file\"\n")
            .expect_err("file backend needs a path");

        assert!(matches!(err, ConfigError::Invalid(_)), "{err:?}");
        assert!(err.to_string().contains("store.path"));
    }

    #[test]
    fn zero_pocket_default_is_rejected() {
        let err = ToolDbConfig::from_toml_str("[defaults]\nmagazine_pockets = 0\n")
            .expect_err("zero pockets should be rejected");

        assert!(err.to_string().contains("magazine_pockets"));
    }

    #[test]
    fn unknown_fields_are_parse_errors() {
        let err = ToolDbConfig::from_toml_str("[store]\nengine = \"sqlite\"\n")
            .expect_err("unknown keys should be rejected");

        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.toml");
        let err = ToolDbConfig::load(&path).expect_err("missing file should fail");

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }
}
