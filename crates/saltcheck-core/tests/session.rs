// crates/saltcheck-core/tests/session.rs
// ============================================================================
// Module: Saltcheck Session Tests
// Description: Batch, highstate, and ad-hoc runs through all stages.
// Purpose: Verify aggregation, missing-test accounting, and return codes.
// Dependencies: saltcheck-core, serde_json
// ============================================================================
//! ## Overview
//! Wires every fake collaborator into a session and checks the aggregated
//! report for batch and highstate runs, plus the single-test entry point.

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

mod common;

use common::FakeCache;
use common::FakeConfig;
use common::FakeInvoker;
use common::FakeModules;
use common::FakeRenderer;
use common::FakeStates;
use common::Harness;
use common::cached;
use common::low;
use saltcheck_core::Saltcheck;
use saltcheck_core::SessionError;
use saltcheck_core::TestStatus;
use serde_json::json;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Harness with an `apache` state holding one passing and one failing test.
fn apache_harness() -> Harness {
    let mut harness = Harness::new();
    harness.invoker = FakeInvoker::new()
        .returning("test.echo", json!("hello"))
        .returning("pkg.upgrade_available", json!(true));
    harness.modules = FakeModules::with(&["test.echo", "pkg.upgrade_available"]);
    harness.states = FakeStates::new()
        .state("apache", vec![low("apache", "pkg")])
        .top("base", &["apache", "ghost"]);
    harness.cache = FakeCache::new().directory("salt://apache/saltcheck-tests", &["init.tst"]);
    harness.renderer = FakeRenderer::new().file(
        cached("apache/saltcheck-tests/init.tst"),
        json!({
            "echo": {
                "module_and_function": "test.echo",
                "args": ["hello"],
                "assertion": "assertEqual",
                "expected-return": "hello"
            },
            "upgrade": {
                "module_and_function": "pkg.upgrade_available",
                "args": ["apache2"],
                "assertion": "assertFalse"
            },
            "later": {"skip": true}
        }),
    );
    harness
}

// ============================================================================
// SECTION: Batch Runs
// ============================================================================

/// Verifies counts, ordering, and the return code of a batch run.
#[test]
fn batch_run_aggregates_results() {
    let harness = apache_harness();
    let session = Saltcheck::new(harness.collaborators());
    let report = session.run_state_tests("apache", None, false).unwrap();
    let apache = report.state("apache").unwrap();
    assert_eq!(apache["echo"].status, TestStatus::Pass);
    assert_eq!(apache["upgrade"].status.to_string(), "Fail: True not False");
    assert_eq!(apache["later"].status, TestStatus::Skip);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.missing_tests, 0);
    assert_eq!(report.retcode(), 1);
    assert_eq!(harness.audit.count("test_result"), 3);
}

/// Verifies a state without tests counts as missing and fails the run.
#[test]
fn scenario_missing_state_counts_as_missing_tests() {
    let harness = apache_harness();
    let session = Saltcheck::new(harness.collaborators());
    let report = session.run_state_tests("ghost", None, false).unwrap();
    assert!(report.state("ghost").unwrap().is_empty());
    assert_eq!(report.summary.missing_tests, 1);
    assert_eq!(report.summary.passed + report.summary.failed + report.summary.skipped, 0);
    assert_ne!(report.retcode(), 0);
}

/// Verifies comma lists are trimmed and groups are sorted by state name.
#[test]
fn state_list_is_split_and_sorted() {
    let harness = apache_harness();
    let session = Saltcheck::new(harness.collaborators());
    let report = session.run_state_tests(" ghost , apache,,", None, false).unwrap();
    let names: Vec<&str> = report.states.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["apache", "ghost"]);
}

/// Verifies the report serializes as groups followed by the summary.
#[test]
fn report_serializes_with_summary_last() {
    let harness = apache_harness();
    let session = Saltcheck::new(harness.collaborators());
    let report = session.run_state_tests("apache,ghost", None, false).unwrap();
    let value = serde_json::to_value(&report).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1], json!({"ghost": {}}));
    let summary = &entries[2]["TEST RESULTS"];
    assert_eq!(summary["Passed"], json!(1));
    assert_eq!(summary["Failed"], json!(1));
    assert_eq!(summary["Skipped"], json!(1));
    assert_eq!(summary["Missing Tests"], json!(1));
    assert!(summary["Execution Time"].is_f64());
}

/// Verifies an all-passing run returns zero.
#[test]
fn passing_run_returns_zero() {
    let mut harness = apache_harness();
    harness.renderer = FakeRenderer::new().file(
        cached("apache/saltcheck-tests/init.tst"),
        json!({"echo": {
            "module_and_function": "test.echo",
            "args": ["hello"],
            "assertion": "assertEqual",
            "expected-return": "hello"
        }}),
    );
    let session = Saltcheck::new(harness.collaborators());
    assert_eq!(session.run_state_tests("apache", None, false).unwrap().retcode(), 0);
}

// ============================================================================
// SECTION: Environments
// ============================================================================

/// Verifies explicit, configured, and default environments.
#[test]
fn saltenv_resolution_order() {
    let mut harness = Harness::new();
    {
        let session = Saltcheck::new(harness.collaborators());
        assert_eq!(session.saltenv(None), "base");
        assert_eq!(session.saltenv(Some("dev")), "dev");
    }
    harness.config = FakeConfig::new().set("saltenv", json!("prod"));
    let session = Saltcheck::new(harness.collaborators());
    assert_eq!(session.saltenv(None), "prod");
    assert_eq!(session.saltenv(Some("")), "prod");
}

/// Verifies highstate runs every top-file state.
#[test]
fn highstate_runs_top_states() {
    let harness = apache_harness();
    let session = Saltcheck::new(harness.collaborators());
    let report = session.run_highstate_tests(None).unwrap();
    assert_eq!(report.states.len(), 2);
    assert_eq!(report.summary.missing_tests, 1);
    assert!(harness.states.saltenvs.borrow().iter().all(|env| env == "base"));
}

/// Verifies an unknown top environment is an error.
#[test]
fn highstate_unknown_environment_fails() {
    let harness = apache_harness();
    let session = Saltcheck::new(harness.collaborators());
    assert!(matches!(session.run_highstate_tests(Some("qa")), Err(SessionError::Catalog(_))));
}

// ============================================================================
// SECTION: Single Tests
// ============================================================================

/// Verifies ad-hoc tests run and non-mappings are rejected.
#[test]
fn run_test_accepts_only_mappings() {
    let harness = apache_harness();
    let session = Saltcheck::new(harness.collaborators());
    let record = session
        .run_test(&json!({
            "module_and_function": "test.echo",
            "args": ["hello"],
            "assertion": "assertEqual",
            "expected-return": "hello"
        }))
        .unwrap();
    assert_eq!(record.status, TestStatus::Pass);
    for bad in [json!("test.echo"), json!({}), json!(null)] {
        let error = session.run_test(&bad).unwrap_err();
        assert_eq!(error.to_string(), "Test argument must be a dictionary");
    }
}

/// Verifies dispatch failures abort a batch run.
#[test]
fn dispatch_failure_aborts_batch() {
    let mut harness = apache_harness();
    harness.invoker = FakeInvoker::new()
        .returning("test.echo", json!("hello"))
        .failing("pkg.upgrade_available", "boom");
    let session = Saltcheck::new(harness.collaborators());
    assert!(matches!(
        session.run_state_tests("apache", None, false),
        Err(SessionError::Invoke(_))
    ));
}
