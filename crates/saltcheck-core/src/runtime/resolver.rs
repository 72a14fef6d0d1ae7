// crates/saltcheck-core/src/runtime/resolver.rs
// ============================================================================
// Module: Saltcheck Test File Resolver
// Description: Maps state names to test files through a three-level fallback.
// Purpose: Discover, cache, and select the test files for one state.
// Dependencies: crate::core, crate::interfaces, crate::audit, thiserror
// ============================================================================

//! ## Overview
//! A state's execution plan names every nested state responsible for its low
//! data. For each nested state the resolver asks the file cache for a test
//! directory at three candidate locations, most specific first:
//!
//! 1. `salt://<state/path>/<location>`
//! 2. `salt://<parent/path>/<location>`
//! 3. `salt://<top>/<location>`
//!
//! The first non-empty result wins. Cached files are then matched against the
//! naming conventions `<state/path>/<location>/init.tst` and
//! `<parent/path>/<location>/<leaf>.tst`. When the directory came from the
//! top-level namespace and neither convention matched, that directory's
//! `init.tst` is taken instead. A deeper parent directory holds the parent
//! state's own tests and contributes nothing beyond the conventions.
//!
//! Invariants:
//! - All working state (processed identifiers, the cached-file pool) lives in
//!   a per-call pass; the resolver itself is immutable and reusable.
//! - Each suffix claims at most one file, the first in pool order, and a
//!   claimed file leaves the pool.
//! - Output is a sorted set, so iteration order is deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::PlanEntryAuditEvent;
use crate::audit::ResolutionAuditEvent;
use crate::audit::ResolutionLevel;
use crate::core::DEFAULT_TEST_LOCATION;
use crate::core::TEST_FILE_EXTENSION;
use crate::interfaces::CacheError;
use crate::interfaces::CatalogError;
use crate::interfaces::ConfigSource;
use crate::interfaces::FileCache;
use crate::interfaces::StateCatalog;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Configuration key naming the test directory.
pub const TEST_LOCATION_KEY: &str = "saltcheck_test_location";
/// Plan entry key naming the responsible nested state.
pub const SLS_KEY: &str = "__sls__";
/// Remote path scheme served by the file cache.
pub const REMOTE_SCHEME: &str = "salt://";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Test file resolution errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// State enumeration or plan compilation failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Test directory caching failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves state names to local test file paths.
pub struct TestFileResolver<'a> {
    /// State enumeration and plan compilation.
    catalog: &'a dyn StateCatalog,
    /// Remote directory cache.
    cache: &'a dyn FileCache,
    /// Diagnostic sink.
    audit: &'a dyn AuditSink,
    /// Environment used for caching and plan lookups.
    saltenv: String,
    /// Test directory name relative to a state directory.
    test_location: String,
}

impl<'a> TestFileResolver<'a> {
    /// Creates a resolver, reading the test location from configuration.
    #[must_use]
    pub fn new(
        catalog: &'a dyn StateCatalog,
        cache: &'a dyn FileCache,
        audit: &'a dyn AuditSink,
        config: &dyn ConfigSource,
        saltenv: impl Into<String>,
    ) -> Self {
        let default = Value::String(DEFAULT_TEST_LOCATION.to_string());
        let test_location = match config.get_config(TEST_LOCATION_KEY, default) {
            Value::String(location) if !location.trim_matches('/').is_empty() => {
                location.trim_matches('/').to_string()
            }
            _ => DEFAULT_TEST_LOCATION.to_string(),
        };
        Self {
            catalog,
            cache,
            audit,
            saltenv: saltenv.into(),
            test_location,
        }
    }

    /// Returns the configured test directory name.
    #[must_use]
    pub fn test_location(&self) -> &str {
        &self.test_location
    }

    /// Resolves the test files for a state.
    ///
    /// A name that is not a known state is treated as a bare test group.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the catalog or cache fails.
    pub fn resolve(&self, state: &str, check_all: bool) -> Result<BTreeSet<PathBuf>, ResolveError> {
        let known = self.catalog.list_known_states(&self.saltenv)?;
        let plan = if known.iter().any(|candidate| candidate == state) {
            self.catalog.show_low_sls(state, &self.saltenv)?
        } else {
            let mut entry = Map::new();
            entry.insert(SLS_KEY.to_string(), Value::String(state.to_string()));
            vec![Value::Object(entry)]
        };

        let mut pass = ResolutionPass::default();
        for entry in plan {
            let Value::Object(fields) = &entry else {
                self.audit.record_plan_entry(&PlanEntryAuditEvent::new(state, entry.clone()));
                return Ok(pass.files);
            };
            let Some(sls) = fields.get(SLS_KEY).and_then(Value::as_str) else {
                continue;
            };
            self.resolve_entry(state, sls, check_all, &mut pass)?;
        }
        Ok(pass.files)
    }

    /// Caches and selects test files for one nested state identifier.
    fn resolve_entry(
        &self,
        state: &str,
        sls: &str,
        check_all: bool,
        pass: &mut ResolutionPass,
    ) -> Result<(), ResolveError> {
        let segments: Vec<&str> = sls.split('.').collect();
        let (leaf, parents) = segments.split_last().unwrap_or((&"", &[]));
        let top = segments.first().copied().unwrap_or_default();
        let candidates = [
            (ResolutionLevel::State, segments.join("/")),
            (ResolutionLevel::Parent, parents.join("/")),
            (ResolutionLevel::Top, top.to_string()),
        ];

        let mut copy_states = true;
        let mut found: Option<(ResolutionLevel, Vec<PathBuf>)> = None;
        for (level, directory) in candidates {
            if !pass.processed.insert(directory.clone()) {
                copy_states = false;
            }
            let remote_path = self.remote_path(&directory);
            if !copy_states {
                self.audit.record_resolution(&ResolutionAuditEvent::new(
                    state,
                    remote_path,
                    level,
                    true,
                    0,
                ));
                continue;
            }
            let cached = self.cache.cache_directory(
                &remote_path,
                &self.saltenv,
                &format!("*.{TEST_FILE_EXTENSION}"),
            )?;
            self.audit.record_resolution(&ResolutionAuditEvent::new(
                state,
                remote_path,
                level,
                false,
                cached.len(),
            ));
            if !cached.is_empty() {
                found = Some((level, cached));
                break;
            }
        }

        let suffixes = [
            self.test_path(&segments.join("/"), "init"),
            self.test_path(&parents.join("/"), leaf),
        ];
        let Some((level, cached)) = found else {
            pass.claim(&suffixes);
            return Ok(());
        };
        pass.pool.extend(cached.iter().cloned());
        if check_all {
            pass.files.extend(cached.into_iter().filter(|path| has_test_extension(path)));
        }
        let claimed = pass.claim(&suffixes);
        let directory = match level {
            ResolutionLevel::State => segments.join("/"),
            ResolutionLevel::Parent => parents.join("/"),
            ResolutionLevel::Top => top.to_string(),
        };
        if claimed == 0 && level != ResolutionLevel::State && directory == top {
            pass.claim(&[self.test_path(top, "init")]);
        }
        Ok(())
    }

    /// Builds the remote test directory path under a state directory.
    fn remote_path(&self, directory: &str) -> String {
        if directory.is_empty() {
            format!("{REMOTE_SCHEME}{}", self.test_location)
        } else {
            format!("{REMOTE_SCHEME}{directory}/{}", self.test_location)
        }
    }

    /// Builds the relative test file path `<directory>/<location>/<stem>.tst`.
    fn test_path(&self, directory: &str, stem: &str) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in directory.split('/').filter(|segment| !segment.is_empty()) {
            path.push(segment);
        }
        for segment in self.test_location.split('/').filter(|segment| !segment.is_empty()) {
            path.push(segment);
        }
        path.push(format!("{stem}.{TEST_FILE_EXTENSION}"));
        path
    }
}

/// Returns true when the path carries the test file extension.
fn has_test_extension(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == TEST_FILE_EXTENSION)
}

// ============================================================================
// SECTION: Resolution Pass
// ============================================================================

/// Working state for one call to [`TestFileResolver::resolve`].
#[derive(Debug, Default)]
struct ResolutionPass {
    /// Directories already requested from the cache.
    processed: HashSet<String>,
    /// Cached files not yet claimed by a naming convention.
    pool: Vec<PathBuf>,
    /// Selected test files.
    files: BTreeSet<PathBuf>,
}

impl ResolutionPass {
    /// Moves the first pool file matching each suffix into the selection and
    /// returns how many files were claimed.
    fn claim(&mut self, suffixes: &[PathBuf]) -> usize {
        let mut claimed = 0;
        for suffix in suffixes {
            if let Some(index) = self.pool.iter().position(|path| path.ends_with(suffix)) {
                let path = self.pool.remove(index);
                self.files.insert(path);
                claimed += 1;
            }
        }
        claimed
    }
}
