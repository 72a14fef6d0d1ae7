// crates/saltcheck-core/tests/loader.rs
// ============================================================================
// Module: Test Suite Loader Tests
// Description: Rendering and last-wins merging of test files.
// Purpose: Ensure suites merge deterministically and never leak files.
// Dependencies: saltcheck-core, serde_json
// ============================================================================
//! ## Overview
//! Loads suites through a fake renderer and checks merge order, empty files,
//! malformed files, and that the working set is drained after each load.

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

use std::path::PathBuf;

use common::FakeRenderer;
use saltcheck_core::LoadError;
use saltcheck_core::TestSuiteLoader;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Builds a test entry echoing `text`.
fn echo(text: &str) -> Value {
    json!({
        "module_and_function": "test.echo",
        "args": [text],
        "assertion": "assertEqual",
        "expected-return": text
    })
}

// ============================================================================
// SECTION: Merging
// ============================================================================

/// Verifies the later file wins for a shared test name.
#[test]
fn later_file_overwrites_same_test_name() {
    let first = PathBuf::from("/tests/a.tst");
    let second = PathBuf::from("/tests/b.tst");
    let renderer = FakeRenderer::new()
        .file(first.clone(), json!({"t1": echo("first"), "t0": echo("zero")}))
        .file(second.clone(), json!({"t1": echo("second")}));
    let mut loader = TestSuiteLoader::new(&renderer);
    loader.add_files([second, first]);
    let suite = loader.load().unwrap();
    assert_eq!(suite.len(), 2);
    assert_eq!(suite["t1"].expected, Some(json!("second")));
    assert_eq!(suite["t1"].name, "t1");
    let names: Vec<&str> = suite.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["t1", "t0"]);
}

/// Verifies empty files contribute nothing.
#[test]
fn empty_file_contributes_nothing() {
    let path = PathBuf::from("/tests/empty.tst");
    let renderer = FakeRenderer::new().file(path.clone(), Value::Null);
    let mut loader = TestSuiteLoader::new(&renderer);
    loader.add_files([path]);
    assert!(loader.load().unwrap().is_empty());
}

// ============================================================================
// SECTION: Working Set
// ============================================================================

/// Verifies each load drains the queued files.
#[test]
fn load_drains_working_set() {
    let path = PathBuf::from("/tests/a.tst");
    let renderer = FakeRenderer::new().file(path.clone(), json!({"t1": echo("x")}));
    let mut loader = TestSuiteLoader::new(&renderer);
    loader.add_files([path]);
    assert_eq!(loader.load().unwrap().len(), 1);
    assert!(loader.pending().is_empty());
    assert!(loader.load().unwrap().is_empty());
    assert_eq!(renderer.rendered.borrow().len(), 1);
}

/// Verifies failures still drain the working set.
#[test]
fn failed_load_still_drains_working_set() {
    let path = PathBuf::from("/tests/list.tst");
    let renderer = FakeRenderer::new().file(path.clone(), json!(["not", "a", "mapping"]));
    let mut loader = TestSuiteLoader::new(&renderer);
    loader.add_files([path, PathBuf::from("/tests/missing.tst")]);
    let error = loader.load().unwrap_err();
    assert!(matches!(error, LoadError::NotAMapping { .. }));
    assert!(loader.pending().is_empty());
}

/// Verifies render errors propagate.
#[test]
fn render_error_propagates() {
    let renderer = FakeRenderer::new();
    let mut loader = TestSuiteLoader::new(&renderer);
    loader.add_files([PathBuf::from("/tests/missing.tst")]);
    assert!(matches!(loader.load(), Err(LoadError::Render(_))));
}
