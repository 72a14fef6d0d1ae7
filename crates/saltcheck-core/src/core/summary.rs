// crates/saltcheck-core/src/core/summary.rs
// ============================================================================
// Module: Saltcheck Run Summary
// Description: Aggregation of per-state result groups into a run report.
// Purpose: Count outcomes, total execution time, and derive the exit signal.
// Dependencies: indexmap, serde
// ============================================================================

//! ## Overview
//! The aggregator collects one result group per state name. A state whose
//! group is empty had no matching tests and counts as missing. The report
//! lists groups sorted by state name followed by a `TEST RESULTS` summary, and
//! carries a non-zero return code whenever any test failed, was skipped, or a
//! state was missing tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use indexmap::IndexMap;
use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;

use crate::core::result::ResultRecord;
use crate::core::result::round4;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Ordered test results for one state, keyed by test name.
pub type StateResults = IndexMap<String, ResultRecord>;

/// Outcome counters for a full run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RunSummary {
    /// Sum of test durations in seconds, rounded to four decimals.
    #[serde(rename = "Execution Time")]
    pub execution_time: f64,
    /// Number of passing tests.
    #[serde(rename = "Passed")]
    pub passed: usize,
    /// Number of failing tests.
    #[serde(rename = "Failed")]
    pub failed: usize,
    /// Number of skipped tests.
    #[serde(rename = "Skipped")]
    pub skipped: usize,
    /// Number of states with no tests.
    #[serde(rename = "Missing Tests")]
    pub missing_tests: usize,
}

impl RunSummary {
    /// Returns 1 when any test failed or was skipped, or any state lacked tests.
    #[must_use]
    pub fn retcode(&self) -> i32 {
        i32::from(self.failed + self.skipped + self.missing_tests > 0)
    }
}

/// Aggregated report for a batch of states.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Result groups sorted by state name.
    pub states: Vec<(String, StateResults)>,
    /// Outcome counters.
    pub summary: RunSummary,
}

impl RunReport {
    /// Returns the process return code signal.
    #[must_use]
    pub fn retcode(&self) -> i32 {
        self.summary.retcode()
    }

    /// Returns the result group for a state.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&StateResults> {
        self.states.iter().find(|(state, _)| state == name).map(|(_, results)| results)
    }
}

impl Serialize for RunReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        /// Single-entry mapping wrapper used for list elements.
        struct Entry<'a, T: Serialize>(&'a str, &'a T);

        impl<T: Serialize> Serialize for Entry<'_, T> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(self.0, self.1)?;
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.states.len() + 1))?;
        for (state, results) in &self.states {
            seq.serialize_element(&Entry(state, results))?;
        }
        seq.serialize_element(&Entry("TEST RESULTS", &self.summary))?;
        seq.end()
    }
}

// ============================================================================
// SECTION: Aggregator
// ============================================================================

/// Collects per-state results and produces a [`RunReport`].
///
/// # Invariants
/// - Recording the same state twice keeps the later group.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    /// Result groups keyed by state name, in arrival order.
    groups: IndexMap<String, StateResults>,
}

impl ResultAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the result group for a state.
    pub fn record_state(&mut self, state: impl Into<String>, results: StateResults) {
        self.groups.insert(state.into(), results);
    }

    /// Builds the final report.
    #[must_use]
    pub fn finish(self) -> RunReport {
        let mut summary = RunSummary::default();
        let mut total_time = 0.0;
        for results in self.groups.values() {
            if results.is_empty() {
                summary.missing_tests += 1;
                continue;
            }
            for record in results.values() {
                if record.status.is_pass() {
                    summary.passed += 1;
                } else if record.status.is_fail() {
                    summary.failed += 1;
                } else if record.status.is_skip() {
                    summary.skipped += 1;
                }
                total_time += record.duration;
            }
        }
        summary.execution_time = round4(total_time);
        let mut states: Vec<(String, StateResults)> = self.groups.into_iter().collect();
        states.sort_by(|left, right| left.0.cmp(&right.0));
        RunReport {
            states,
            summary,
        }
    }
}
