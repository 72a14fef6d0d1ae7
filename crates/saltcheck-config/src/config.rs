// crates/saltcheck-config/src/config.rs
// ============================================================================
// Module: Saltcheck Configuration
// Description: Configuration loading and validation for saltcheck runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: saltcheck-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Unknown keys and invalid values fail closed. When no path is given and the
//! default file does not exist, built-in defaults are used.
//!
//! The loaded configuration doubles as the engine's [`ConfigSource`]: the
//! test location and default environment are served under the keys the
//! runtime asks for.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use saltcheck_core::AuditSink;
use saltcheck_core::ConfigSource;
use saltcheck_core::DEFAULT_TEST_LOCATION;
use saltcheck_core::FileAuditSink;
use saltcheck_core::NoopAuditSink;
use saltcheck_core::StderrAuditSink;
use saltcheck_core::runtime::DEFAULT_SALTENV;
use saltcheck_core::runtime::SALTENV_KEY;
use saltcheck_core::runtime::TEST_LOCATION_KEY;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "saltcheck.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SALTCHECK_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of an environment name.
pub(crate) const MAX_SALTENV_LENGTH: usize = 128;
/// Default state tree root for the default environment.
const DEFAULT_FILE_ROOT: &str = "/srv/salt";

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Saltcheck configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SaltcheckConfig {
    /// Test discovery settings.
    #[serde(default)]
    pub tests: TestsConfig,
    /// State tree roots per environment.
    #[serde(default = "default_file_roots")]
    pub file_roots: BTreeMap<String, Vec<PathBuf>>,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for SaltcheckConfig {
    fn default() -> Self {
        Self {
            tests: TestsConfig::default(),
            file_roots: default_file_roots(),
            audit: AuditConfig::default(),
        }
    }
}

impl SaltcheckConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path comes from `path`, then `SALTCHECK_CONFIG`, then
    /// `saltcheck.toml` in the working directory. Only the last may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.tests.validate()?;
        self.audit.validate()?;
        for (saltenv, roots) in &self.file_roots {
            validate_saltenv("file_roots", saltenv)?;
            for root in roots {
                validate_path_string(
                    &format!("file_roots.{saltenv}"),
                    &root.to_string_lossy(),
                )?;
            }
        }
        if self.file_roots(&self.tests.saltenv).is_empty() {
            return Err(ConfigError::Invalid(format!(
                "file_roots.{} must list at least one root",
                self.tests.saltenv
            )));
        }
        Ok(())
    }

    /// Returns the state tree roots for an environment.
    #[must_use]
    pub fn file_roots(&self, saltenv: &str) -> &[PathBuf] {
        self.file_roots.get(saltenv).map(Vec::as_slice).unwrap_or_default()
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Box<dyn AuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::Stderr => Ok(Box::new(StderrAuditSink)),
            AuditSinkKind::None => Ok(Box::new(NoopAuditSink)),
            AuditSinkKind::File => {
                let path = self
                    .audit
                    .path
                    .as_deref()
                    .ok_or_else(|| ConfigError::Invalid("audit.path is required".to_string()))?;
                let sink = FileAuditSink::new(Path::new(path))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Box::new(sink))
            }
        }
    }
}

impl ConfigSource for SaltcheckConfig {
    fn get_config(&self, key: &str, default: Value) -> Value {
        match key {
            TEST_LOCATION_KEY => Value::String(self.tests.location.clone()),
            SALTENV_KEY => Value::String(self.tests.saltenv.clone()),
            _ => default,
        }
    }
}

/// Test discovery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TestsConfig {
    /// Test directory name relative to each state directory.
    #[serde(default = "default_test_location")]
    pub location: String,
    /// Environment used when a run names none.
    #[serde(default = "default_saltenv")]
    pub saltenv: String,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            location: default_test_location(),
            saltenv: default_saltenv(),
        }
    }
}

impl TestsConfig {
    /// Validates the test location and default environment.
    fn validate(&mut self) -> Result<(), ConfigError> {
        let location = self.location.trim().trim_matches('/').to_string();
        validate_path_string("tests.location", &location)?;
        for component in Path::new(&location).components() {
            if !matches!(component, Component::Normal(_)) {
                return Err(ConfigError::Invalid(
                    "tests.location must be a relative path without '..'".to_string(),
                ));
            }
        }
        self.location = location;
        validate_saltenv("tests.saltenv", &self.saltenv)
    }
}

/// Audit sink kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
    /// Events are discarded.
    None,
}

/// Audit logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path (JSON lines), required for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(path)) => validate_path_string("audit.path", path),
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default test directory name.
fn default_test_location() -> String {
    DEFAULT_TEST_LOCATION.to_string()
}

/// Default environment name.
fn default_saltenv() -> String {
    DEFAULT_SALTENV.to_string()
}

/// Default state tree roots.
fn default_file_roots() -> BTreeMap<String, Vec<PathBuf>> {
    BTreeMap::from([(DEFAULT_SALTENV.to_string(), vec![PathBuf::from(DEFAULT_FILE_ROOT)])])
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// The flag is true when the path was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an environment name.
fn validate_saltenv(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.len() > MAX_SALTENV_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} must be 1-{MAX_SALTENV_LENGTH} chars")));
    }
    if value.chars().any(|ch| ch == '/' || ch == '\\' || ch.is_whitespace()) {
        return Err(ConfigError::Invalid(format!("{field} contains invalid characters")));
    }
    Ok(())
}
