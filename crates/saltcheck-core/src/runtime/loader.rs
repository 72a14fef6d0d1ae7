// crates/saltcheck-core/src/runtime/loader.rs
// ============================================================================
// Module: Saltcheck Test Suite Loader
// Description: Renders test files and merges their definitions.
// Purpose: Produce one ordered test-name to definition mapping per state.
// Dependencies: crate::core, crate::interfaces, indexmap, thiserror
// ============================================================================

//! ## Overview
//! The loader accumulates resolved files, renders each one, and merges the
//! named definitions into an insertion-ordered mapping. A later file replaces
//! an earlier file's definition of the same name. The working file set is
//! drained on every load, whether or not the load succeeds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::mem;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::core::TestDefinition;
use crate::interfaces::RenderError;
use crate::interfaces::Renderer;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Test suite loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A test file could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// A rendered test file was not a mapping of test names.
    #[error("test file {path} did not render to a mapping")]
    NotAMapping {
        /// Offending file.
        path: String,
    },
}

// ============================================================================
// SECTION: Loader
// ============================================================================

/// Ordered test definitions keyed by test name.
pub type TestSuite = IndexMap<String, TestDefinition>;

/// Loads test definitions from resolved test files.
pub struct TestSuiteLoader<'a> {
    /// Test file renderer.
    renderer: &'a dyn Renderer,
    /// Files queued for the next load.
    test_files: BTreeSet<PathBuf>,
}

impl<'a> TestSuiteLoader<'a> {
    /// Creates an empty loader.
    #[must_use]
    pub fn new(renderer: &'a dyn Renderer) -> Self {
        Self {
            renderer,
            test_files: BTreeSet::new(),
        }
    }

    /// Queues files for the next load.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = PathBuf>) {
        self.test_files.extend(files);
    }

    /// Returns the files queued for the next load.
    #[must_use]
    pub const fn pending(&self) -> &BTreeSet<PathBuf> {
        &self.test_files
    }

    /// Renders every queued file and merges their definitions.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when a file fails to render or is not a mapping.
    pub fn load(&mut self) -> Result<TestSuite, LoadError> {
        let files = mem::take(&mut self.test_files);
        let mut suite = TestSuite::new();
        for path in files {
            match self.renderer.render(&path)? {
                Value::Null => {}
                Value::Object(tests) => {
                    for (name, entry) in tests {
                        let definition = TestDefinition::from_value(name.clone(), &entry);
                        suite.insert(name, definition);
                    }
                }
                _ => {
                    return Err(LoadError::NotAMapping {
                        path: path.display().to_string(),
                    });
                }
            }
        }
        Ok(suite)
    }
}
