// crates/saltcheck-config/tests/load_validation.rs
// ============================================================================
// Module: Config Load Validation Tests
// Description: Parsing, defaults, and fail-closed validation of saltcheck.toml.
// Purpose: Ensure configuration is strict and serves the runtime lookups.
// Dependencies: saltcheck-config, saltcheck-core, serde_json, tempfile
// ============================================================================
//! ## Overview
//! Loads configuration from temporary files and inline TOML, covering
//! defaults, limits, invalid values, config lookups, and audit sink wiring.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;
use std::path::PathBuf;

use saltcheck_config::AuditSinkKind;
use saltcheck_config::ConfigError;
use saltcheck_config::MAX_CONFIG_FILE_SIZE;
use saltcheck_config::SaltcheckConfig;
use saltcheck_core::ConfigSource;
use saltcheck_core::audit::TestResultAuditEvent;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Asserts that inline TOML is rejected as invalid with a message fragment.
fn assert_invalid(content: &str, fragment: &str) {
    match SaltcheckConfig::from_toml_str(content) {
        Err(ConfigError::Invalid(message)) => {
            assert!(message.contains(fragment), "unexpected message: {message}");
        }
        other => panic!("expected invalid config, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Verifies a full configuration file loads.
#[test]
fn load_full_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saltcheck.toml");
    fs::write(
        &path,
        r#"
[tests]
location = "/checks/"
saltenv = "prod"

[file_roots]
prod = ["/srv/prod"]
base = ["/srv/salt", "/srv/extra"]

[audit]
sink = "none"
"#,
    )
    .unwrap();
    let config = SaltcheckConfig::load(Some(&path)).unwrap();
    assert_eq!(config.tests.location, "checks");
    assert_eq!(config.tests.saltenv, "prod");
    assert_eq!(config.file_roots("prod"), &[PathBuf::from("/srv/prod")]);
    assert_eq!(config.file_roots("base").len(), 2);
    assert!(config.file_roots("dev").is_empty());
    assert_eq!(config.audit.sink, AuditSinkKind::None);
}

/// Verifies an empty document yields defaults.
#[test]
fn empty_document_uses_defaults() {
    let config = SaltcheckConfig::from_toml_str("").unwrap();
    assert_eq!(config, SaltcheckConfig::default());
    assert_eq!(config.tests.location, "saltcheck-tests");
    assert_eq!(config.tests.saltenv, "base");
    assert_eq!(config.file_roots("base"), &[PathBuf::from("/srv/salt")]);
    assert_eq!(config.audit.sink, AuditSinkKind::Stderr);
}

/// Verifies an explicitly named missing file is an I/O error.
#[test]
fn explicit_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(SaltcheckConfig::load(Some(&path)), Err(ConfigError::Io(_))));
}

/// Verifies oversized files are rejected before parsing.
#[test]
fn oversized_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.toml");
    fs::write(&path, "#".repeat(MAX_CONFIG_FILE_SIZE + 1)).unwrap();
    let error = SaltcheckConfig::load(Some(&path)).unwrap_err();
    assert_eq!(error.to_string(), "invalid config: config file exceeds size limit");
}

/// Verifies non-UTF-8 files are rejected.
#[test]
fn non_utf8_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("binary.toml");
    fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
    assert!(matches!(SaltcheckConfig::load(Some(&path)), Err(ConfigError::Invalid(_))));
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Verifies unknown keys fail closed.
#[test]
fn unknown_keys_are_rejected() {
    for content in ["[tests]\nlocaton = \"x\"\n", "[server]\nport = 1\n"] {
        assert!(matches!(SaltcheckConfig::from_toml_str(content), Err(ConfigError::Parse(_))));
    }
}

/// Verifies the test location must be a plain relative path.
#[test]
fn test_location_must_be_relative() {
    assert_invalid("[tests]\nlocation = \"/\"\n", "tests.location must be non-empty");
    assert_invalid("[tests]\nlocation = \"../escape\"\n", "without '..'");
    assert_invalid("[tests]\nlocation = \"./checks\"\n", "without '..'");
}

/// Verifies environment names are checked.
#[test]
fn saltenv_names_are_checked() {
    assert_invalid("[tests]\nsaltenv = \"\"\n", "tests.saltenv");
    assert_invalid("[tests]\nsaltenv = \"a b\"\n", "invalid characters");
}

/// Verifies the default environment needs a state tree root.
#[test]
fn default_saltenv_requires_roots() {
    assert_invalid(
        "[tests]\nsaltenv = \"dev\"\n[file_roots]\nbase = [\"/srv/salt\"]\n",
        "file_roots.dev must list at least one root",
    );
    assert_invalid("[file_roots]\nbase = [\"\"]\n", "file_roots.base must be non-empty");
}

/// Verifies the file sink requires a path.
#[test]
fn file_sink_requires_path() {
    assert_invalid("[audit]\nsink = \"file\"\n", "audit.path is required");
}

// ============================================================================
// SECTION: Lookups
// ============================================================================

/// Verifies the runtime config keys are served from the model.
#[test]
fn config_source_serves_runtime_keys() {
    let config =
        SaltcheckConfig::from_toml_str("[tests]\nlocation = \"checks\"\nsaltenv = \"base\"\n")
            .unwrap();
    assert_eq!(config.get_config("saltcheck_test_location", Value::Null), json!("checks"));
    assert_eq!(config.get_config("saltenv", Value::Null), json!("base"));
    assert_eq!(config.get_config("other", json!(7)), json!(7));
}

// ============================================================================
// SECTION: Audit Sinks
// ============================================================================

/// Verifies the file sink appends JSON lines to the configured path.
#[test]
fn file_audit_sink_appends_json_lines() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("audit.jsonl");
    let content = format!("[audit]\nsink = \"file\"\npath = {:?}\n", log.to_string_lossy());
    let config = SaltcheckConfig::from_toml_str(&content).unwrap();
    let sink = config.audit_sink().unwrap();
    sink.record_result(&TestResultAuditEvent::new("apache", "echo", "Pass", 0.01));
    sink.record_result(&TestResultAuditEvent::new("apache", "later", "Skip", 0.0));
    let written = fs::read_to_string(&log).unwrap();
    let lines: Vec<Value> =
        written.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], json!("test_result"));
    assert_eq!(lines[1]["test"], json!("later"));
}
