// crates/saltcheck-providers/tests/file_cache.rs
// ============================================================================
// Module: File Root Cache Tests
// Description: Remote path mapping and pattern-filtered directory listings.
// Purpose: Ensure cached listings are deterministic and confined to roots.
// Dependencies: saltcheck-providers, saltcheck-core, tempfile
// ============================================================================
//! ## Overview
//! Checks `salt://` path handling, single-wildcard matching, first-root
//! precedence, and empty results for missing directories.

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

use std::collections::BTreeMap;

use common::StateTree;
use saltcheck_core::CacheError;
use saltcheck_core::FileCache;
use saltcheck_providers::FileRootCache;

// ============================================================================
// SECTION: Listings
// ============================================================================

/// Verifies pattern filtering and recursive, sorted listings.
#[test]
fn lists_matching_files_recursively() {
    let tree = StateTree::new()
        .file("apache/saltcheck-tests/init.tst", "")
        .file("apache/saltcheck-tests/config.tst", "")
        .file("apache/saltcheck-tests/README.md", "")
        .file("apache/saltcheck-tests/mods/ssl.tst", "");
    let cache = FileRootCache::new(tree.roots());
    let files = cache.cache_directory("salt://apache/saltcheck-tests", "base", "*.tst").unwrap();
    assert_eq!(files, vec![
        tree.path("apache/saltcheck-tests/config.tst"),
        tree.path("apache/saltcheck-tests/init.tst"),
        tree.path("apache/saltcheck-tests/mods/ssl.tst"),
    ]);
    let exact = cache.cache_directory("salt://apache/saltcheck-tests/", "base", "init.tst").unwrap();
    assert_eq!(exact, vec![tree.path("apache/saltcheck-tests/init.tst")]);
}

/// Verifies the first root providing a relative path wins.
#[test]
fn first_root_wins_for_shared_paths() {
    let first = StateTree::new().file("tests/a.tst", "first");
    let second = StateTree::new().file("tests/a.tst", "second").file("tests/b.tst", "second");
    let roots = BTreeMap::from([(
        "base".to_string(),
        vec![first.root().to_path_buf(), second.root().to_path_buf()],
    )]);
    let cache = FileRootCache::new(roots);
    let files = cache.cache_directory("salt://tests", "base", "*.tst").unwrap();
    assert_eq!(files, vec![first.path("tests/a.tst"), second.path("tests/b.tst")]);
}

/// Verifies missing directories and environments yield nothing.
#[test]
fn missing_directories_are_empty() {
    let tree = StateTree::new().file("apache/init.sls", "");
    let cache = FileRootCache::new(tree.roots());
    assert!(cache.cache_directory("salt://apache/saltcheck-tests", "base", "*.tst").unwrap().is_empty());
    assert!(cache.cache_directory("salt://apache", "prod", "*.tst").unwrap().is_empty());
}

// ============================================================================
// SECTION: Path Validation
// ============================================================================

/// Verifies non-remote and escaping paths are rejected.
#[test]
fn rejects_invalid_remote_paths() {
    let tree = StateTree::new();
    let cache = FileRootCache::new(tree.roots());
    for path in ["apache/tests", "salt://../etc", "salt://a/../../b", "file:///etc"] {
        let result = cache.cache_directory(path, "base", "*.tst");
        assert!(matches!(result, Err(CacheError::InvalidPath(_))), "{path}");
    }
}
