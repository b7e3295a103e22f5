//! Router configuration.
//!
//! Configuration is plain serde data, loaded from TOML:
//!
//! ```toml
//! [router]
//! strip_trailing_slash = true
//! default_success_status = 200
//!
//! [logging]
//! level = "info,httprpc=debug"
//! format = "json"
//! ```
//!
//! Unknown keys are rejected and every section is optional.

use http::StatusCode;
use httprpc_telemetry::{LogConfig, TelemetryResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration file: {path}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML was malformed or contained unknown keys.
    #[error("failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value was out of range.
    #[error("invalid configuration value for {field}: {message}")]
    InvalidValue {
        /// Dotted path of the field.
        field: String,
        /// Why the value is invalid.
        message: String,
    },
}

impl ConfigError {
    fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Serve-phase and registration defaults of a router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Look up `/users/` as `/users`, and register `/users/` as `/users`.
    /// The root path is never changed.
    pub strip_trailing_slash: bool,

    /// Success status for endpoints registered without their own codec.
    pub default_success_status: Option<u16>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strip_trailing_slash: true,
            default_success_status: None,
        }
    }
}

impl RouterConfig {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `default_success_status` is
    /// not a 2xx code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.success_status().map(|_| ())
    }

    /// The configured default success status, validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the code is not 2xx.
    pub fn success_status(&self) -> Result<Option<StatusCode>, ConfigError> {
        let Some(code) = self.default_success_status else {
            return Ok(None);
        };
        let status = StatusCode::from_u16(code).map_err(|e| {
            ConfigError::invalid_value("router.default_success_status", e.to_string())
        })?;
        if !status.is_success() {
            return Err(ConfigError::invalid_value(
                "router.default_success_status",
                format!("{code} is not a 2xx status"),
            ));
        }
        Ok(Some(status))
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpRpcConfig {
    /// Router settings.
    pub router: RouterConfig,

    /// Logging settings.
    pub logging: LogConfig,
}

impl HttpRpcConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input and
    /// [`ConfigError::InvalidValue`] for out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Installs the global tracing subscriber described by the `logging`
    /// section and registers the dispatch metric descriptions.
    ///
    /// # Errors
    ///
    /// Fails if a subscriber is already installed.
    pub fn init_telemetry(&self) -> TelemetryResult<()> {
        httprpc_telemetry::init_logging(&self.logging)?;
        httprpc_telemetry::describe_metrics();
        Ok(())
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.router.validate()?;
        self.logging
            .validate()
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httprpc_telemetry::LogFormat;

    #[test]
    fn test_defaults() {
        let config = HttpRpcConfig::default();
        assert!(config.router.strip_trailing_slash);
        assert_eq!(config.router.default_success_status, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(HttpRpcConfig::from_toml_str("").unwrap(), HttpRpcConfig::default());
    }

    #[test]
    fn test_toml_sections() {
        let config = HttpRpcConfig::from_toml_str(
            r#"
            [router]
            strip_trailing_slash = false
            default_success_status = 202

            [logging]
            level = "debug"
            format = "pretty"
            "#,
        )
        .unwrap();

        assert!(!config.router.strip_trailing_slash);
        assert_eq!(config.router.success_status().unwrap(), Some(StatusCode::ACCEPTED));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = HttpRpcConfig::from_toml_str("[router]\nstrict = true\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_non_success_status_rejected() {
        let result = HttpRpcConfig::from_toml_str("[router]\ndefault_success_status = 404\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));

        let result = HttpRpcConfig::from_toml_str("[router]\ndefault_success_status = 1000\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = HttpRpcConfig::from_toml_str("[logging]\nlevel = \"httprpc=loud\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let mut config = HttpRpcConfig::default();
        config.logging.enabled = false;
        assert!(config.init_telemetry().is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("httprpc.toml");
        std::fs::write(&path, "[router]\nstrip_trailing_slash = false\n").unwrap();

        let config = HttpRpcConfig::from_file(&path).unwrap();
        assert!(!config.router.strip_trailing_slash);

        let missing = HttpRpcConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
