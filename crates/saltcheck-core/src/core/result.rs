// crates/saltcheck-core/src/core/result.rs
// ============================================================================
// Module: Saltcheck Result Records
// Description: Per-test status and timed result record.
// Purpose: Carry the outcome of one test run in a report-ready form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ResultRecord`] is produced for every test that reaches the runner. It
//! serializes with the report keys consumers already parse
//! (`duration`, `module.function [args]`, `saltcheck assertion`, `status`).
//! Skipped and invalid tests carry only `status` and `duration`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Report key for the invocation description.
pub const INVOCATION_KEY: &str = "module.function [args]";
/// Report key suffix appended when a section path was used.
pub const SECTION_KEY_SUFFIX: &str = " => section";
/// Report key for the assertion description.
pub const ASSERTION_KEY: &str = "saltcheck assertion";

// ============================================================================
// SECTION: Status
// ============================================================================

/// Outcome of a single test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestStatus {
    /// Assertion held.
    Pass,
    /// Assertion did not hold; carries the failure message.
    Fail(String),
    /// Test was skipped.
    Skip,
    /// Test definition failed validation.
    Invalid,
}

impl TestStatus {
    /// Returns true for passing outcomes.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Returns true for any failing outcome, including invalid tests.
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_) | Self::Invalid)
    }

    /// Returns true for skipped tests.
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("Pass"),
            Self::Fail(message) => write!(f, "Fail: {message}"),
            Self::Skip => f.write_str("Skip"),
            Self::Invalid => f.write_str("Fail - invalid test"),
        }
    }
}

impl Serialize for TestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SECTION: Result Record
// ============================================================================

/// Human-readable description of the dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationDescription {
    /// `<operation> <args>` rendering, with ` => <section>` when used.
    pub text: String,
    /// Whether a section path was applied to the return.
    pub sectioned: bool,
}

/// Timed outcome of one test.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Wall-clock duration in seconds, rounded to four decimals.
    pub duration: f64,
    /// Operation and argument description, absent for skipped/invalid tests.
    pub invocation: Option<InvocationDescription>,
    /// Assertion description, absent for skipped/invalid tests.
    pub assertion: Option<String>,
    /// Final status.
    pub status: TestStatus,
}

impl ResultRecord {
    /// Builds a record for a skipped test (duration is always zero).
    #[must_use]
    pub const fn skipped() -> Self {
        Self {
            duration: 0.0,
            invocation: None,
            assertion: None,
            status: TestStatus::Skip,
        }
    }

    /// Builds a record for a test that failed validation.
    #[must_use]
    pub fn invalid(elapsed: Duration) -> Self {
        Self {
            duration: round_duration(elapsed),
            invocation: None,
            assertion: None,
            status: TestStatus::Invalid,
        }
    }
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("duration", &self.duration)?;
        if let Some(invocation) = &self.invocation {
            if invocation.sectioned {
                let key = format!("{INVOCATION_KEY}{SECTION_KEY_SUFFIX}");
                map.serialize_entry(&key, &invocation.text)?;
            } else {
                map.serialize_entry(INVOCATION_KEY, &invocation.text)?;
            }
        }
        if let Some(assertion) = &self.assertion {
            map.serialize_entry(ASSERTION_KEY, assertion)?;
        }
        map.serialize_entry("status", &self.status)?;
        map.end()
    }
}

/// Rounds a duration to four decimal places of seconds.
#[must_use]
pub fn round_duration(elapsed: Duration) -> f64 {
    round4(elapsed.as_secs_f64())
}

/// Rounds seconds to four decimal places.
#[must_use]
pub fn round4(seconds: f64) -> f64 {
    (seconds * 10_000.0).round() / 10_000.0
}
