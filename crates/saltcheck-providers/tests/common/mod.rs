// crates/saltcheck-providers/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Temporary state trees for provider tests.
// Purpose: Build file roots on disk with a compact builder.
// Dependencies: tempfile
// ============================================================================

//! ## Overview
//! [`StateTree`] owns a temporary directory and writes files relative to it.
//! The tree is removed when the fixture is dropped.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

// ============================================================================
// SECTION: State Tree
// ============================================================================

/// Temporary file root.
pub struct StateTree {
    /// Backing directory.
    dir: TempDir,
}

impl StateTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Writes a file relative to the root, creating parent directories.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    /// Returns the root path.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Returns an absolute path under the root.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Returns file roots mapping `base` to this tree.
    pub fn roots(&self) -> BTreeMap<String, Vec<PathBuf>> {
        BTreeMap::from([("base".to_string(), vec![self.root().to_path_buf()])])
    }
}
