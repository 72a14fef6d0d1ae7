// crates/saltcheck-providers/src/render.rs
// ============================================================================
// Module: YAML Test Renderer
// Description: Parses test files into insertion-ordered structures.
// Purpose: Implement test file rendering with size limits.
// Dependencies: saltcheck-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! Test files are plain YAML. Rendering preserves key order so that merged
//! suites run in the order tests were written. No templating is applied.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use saltcheck_core::RenderError;
use saltcheck_core::Renderer;
use serde_json::Value;

use crate::source::DEFAULT_MAX_FILE_BYTES;
use crate::source::read_yaml;

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// YAML renderer for test files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YamlTestRenderer {
    /// Maximum test file size, in bytes.
    max_bytes: usize,
}

impl Default for YamlTestRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_BYTES)
    }
}

impl YamlTestRenderer {
    /// Creates a renderer with a size limit.
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
        }
    }
}

impl Renderer for YamlTestRenderer {
    fn render(&self, path: &Path) -> Result<Value, RenderError> {
        Ok(read_yaml(path, self.max_bytes)?)
    }
}
