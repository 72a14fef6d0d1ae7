// crates/saltcheck-core/src/audit.rs
// ============================================================================
// Module: Saltcheck Audit Logging
// Description: Structured audit events for validation, resolution, and runs.
// Purpose: Emit JSON-line diagnostics without a hard logging dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Runtime components report diagnostics as typed audit events. Sinks decide
//! where events go: stderr, an append-only file, or nowhere. Sinks never fail
//! the caller; serialization or write errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Emitted when a test definition fails validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Test name.
    pub test: String,
    /// Points awarded.
    pub score: u32,
    /// Points required.
    pub required: u32,
    /// Reasons for each missing point.
    pub reasons: Vec<String>,
}

/// Emitted when an expected value cannot be cast to the returned type.
#[derive(Debug, Clone, Serialize)]
pub struct CoercionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Expected value as written.
    pub expected: Value,
    /// Returned value.
    pub returned: Value,
    /// Type label of the returned value.
    pub target_type: &'static str,
}

/// Fallback level at which a test directory lookup happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionLevel {
    /// `<state-path>/<test-location>`.
    State,
    /// `<parent-of-state-path>/<test-location>`.
    Parent,
    /// `<top-level-namespace>/<test-location>`.
    Top,
}

/// Emitted for each candidate test directory considered during resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// State name being resolved.
    pub state: String,
    /// Remote directory that was considered.
    pub remote_path: String,
    /// Fallback level of the candidate.
    pub level: ResolutionLevel,
    /// Whether caching was skipped because the identifier was already seen.
    pub already_processed: bool,
    /// Number of files returned by the cache.
    pub cached_files: usize,
}

/// Emitted when a plan entry is not a mapping.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntryAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// State name being resolved.
    pub state: String,
    /// Offending plan entry.
    pub entry: Value,
}

/// Emitted after each test completes.
#[derive(Debug, Clone, Serialize)]
pub struct TestResultAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// State the test belongs to.
    pub state: String,
    /// Test name.
    pub test: String,
    /// Rendered status.
    pub status: String,
    /// Duration in seconds.
    pub duration: f64,
}

/// Returns the current time in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl ValidationAuditEvent {
    /// Creates a validation failure event.
    #[must_use]
    pub fn new(test: impl Into<String>, score: u32, required: u32, reasons: Vec<String>) -> Self {
        Self {
            event: "test_validation",
            timestamp_ms: now_ms(),
            test: test.into(),
            score,
            required,
            reasons,
        }
    }
}

impl CoercionAuditEvent {
    /// Creates a coercion failure event.
    #[must_use]
    pub fn new(expected: Value, returned: Value, target_type: &'static str) -> Self {
        Self {
            event: "coercion_failed",
            timestamp_ms: now_ms(),
            expected,
            returned,
            target_type,
        }
    }
}

impl ResolutionAuditEvent {
    /// Creates a resolution lookup event.
    #[must_use]
    pub fn new(
        state: impl Into<String>,
        remote_path: impl Into<String>,
        level: ResolutionLevel,
        already_processed: bool,
        cached_files: usize,
    ) -> Self {
        Self {
            event: "test_file_resolution",
            timestamp_ms: now_ms(),
            state: state.into(),
            remote_path: remote_path.into(),
            level,
            already_processed,
            cached_files,
        }
    }
}

impl PlanEntryAuditEvent {
    /// Creates a malformed plan entry event.
    #[must_use]
    pub fn new(state: impl Into<String>, entry: Value) -> Self {
        Self {
            event: "malformed_plan_entry",
            timestamp_ms: now_ms(),
            state: state.into(),
            entry,
        }
    }
}

impl TestResultAuditEvent {
    /// Creates a test result event.
    #[must_use]
    pub fn new(
        state: impl Into<String>,
        test: impl Into<String>,
        status: impl Into<String>,
        duration: f64,
    ) -> Self {
        Self {
            event: "test_result",
            timestamp_ms: now_ms(),
            state: state.into(),
            test: test.into(),
            status: status.into(),
            duration,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for saltcheck events.
pub trait AuditSink {
    /// Record a validation failure.
    fn record_validation(&self, _event: &ValidationAuditEvent) {}

    /// Record a coercion failure.
    fn record_coercion(&self, _event: &CoercionAuditEvent) {}

    /// Record a test directory lookup.
    fn record_resolution(&self, _event: &ResolutionAuditEvent) {}

    /// Record a malformed plan entry.
    fn record_plan_entry(&self, _event: &PlanEntryAuditEvent) {}

    /// Record a completed test.
    fn record_result(&self, _event: &TestResultAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one serialized event line to stderr.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl AuditSink for StderrAuditSink {
    fn record_validation(&self, event: &ValidationAuditEvent) {
        Self::emit(event);
    }

    fn record_coercion(&self, event: &CoercionAuditEvent) {
        Self::emit(event);
    }

    fn record_resolution(&self, event: &ResolutionAuditEvent) {
        Self::emit(event);
    }

    fn record_plan_entry(&self, event: &PlanEntryAuditEvent) {
        Self::emit(event);
    }

    fn record_result(&self, event: &TestResultAuditEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event line to the file.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_validation(&self, event: &ValidationAuditEvent) {
        self.emit(event);
    }

    fn record_coercion(&self, event: &CoercionAuditEvent) {
        self.emit(event);
    }

    fn record_resolution(&self, event: &ResolutionAuditEvent) {
        self.emit(event);
    }

    fn record_plan_entry(&self, event: &PlanEntryAuditEvent) {
        self.emit(event);
    }

    fn record_result(&self, event: &TestResultAuditEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {}
