// crates/saltcheck-providers/src/modules/file.rs
// ============================================================================
// Module: File Execution Module
// Description: Read-only filesystem checks.
// Purpose: Provide `file.file_exists`, `file.directory_exists`, `file.read`,
//          and `file.contains`.
// Dependencies: saltcheck-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Filesystem verbs never modify the system. Reads are bounded by
//! [`FileModuleConfig::max_bytes`] and must be valid UTF-8.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use saltcheck_core::Invocation;
use serde::Deserialize;
use serde_json::Value;

use crate::modules::string_argument;
use crate::registry::ExecutionModule;
use crate::registry::ModuleError;
use crate::source::DEFAULT_MAX_FILE_BYTES;
use crate::source::read_file_limited;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the file module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileModuleConfig {
    /// Maximum file size read by `read` and `contains`, in bytes.
    pub max_bytes: usize,
}

impl Default for FileModuleConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Module
// ============================================================================

/// Verbs implemented by [`FileModule`].
const FUNCTIONS: &[&str] = &["contains", "directory_exists", "file_exists", "read"];

/// Read-only filesystem verbs.
pub struct FileModule {
    /// Module configuration, including read limits.
    config: FileModuleConfig,
}

impl FileModule {
    /// Creates a file module with the given configuration.
    #[must_use]
    pub const fn new(config: FileModuleConfig) -> Self {
        Self {
            config,
        }
    }

    /// Reads a file as UTF-8 text within the configured limit.
    fn read_text(&self, path: &str) -> Result<String, ModuleError> {
        let bytes = read_file_limited(Path::new(path), self.config.max_bytes)
            .map_err(|err| ModuleError::Execution(err.to_string()))?;
        String::from_utf8(bytes)
            .map_err(|_| ModuleError::Execution(format!("{path} is not valid utf-8")))
    }
}

impl ExecutionModule for FileModule {
    fn functions(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn call(&self, verb: &str, call: &Invocation) -> Result<Value, ModuleError> {
        let path = string_argument(call, 0, "path")?;
        match verb {
            "file_exists" => Ok(Value::Bool(Path::new(path).is_file())),
            "directory_exists" => Ok(Value::Bool(Path::new(path).is_dir())),
            "read" => Ok(Value::String(self.read_text(path)?)),
            "contains" => {
                let text = string_argument(call, 1, "text")?;
                Ok(Value::Bool(self.read_text(path)?.contains(text)))
            }
            other => Err(ModuleError::UnknownFunction(other.to_string())),
        }
    }
}
