// crates/saltcheck-providers/src/source.rs
// ============================================================================
// Module: State Tree Sources
// Description: Size-limited reads and YAML parsing of state tree files.
// Purpose: Share the bounded file access used by every provider.
// Dependencies: saltcheck-core, serde_json, serde_yaml, thiserror
// ============================================================================

//! ## Overview
//! State files, top files, and test files all come from disk. Reads are
//! capped at a byte limit before parsing so a single oversized file cannot
//! exhaust memory. YAML is parsed into an insertion-ordered JSON value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use saltcheck_core::CatalogError;
use saltcheck_core::RenderError;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum size of a single state tree file.
pub const DEFAULT_MAX_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Source read and parse errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be opened or read.
    #[error("unable to read {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// The file exceeds the byte limit.
    #[error("{path} exceeds size limit of {limit} bytes")]
    TooLarge {
        /// File path.
        path: String,
        /// Byte limit.
        limit: usize,
    },
    /// The file is not valid YAML.
    #[error("invalid yaml in {path}: {message}")]
    Yaml {
        /// File path.
        path: String,
        /// Parser error text.
        message: String,
    },
}

impl From<SourceError> for CatalogError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Yaml { .. } => Self::Parse(err.to_string()),
            SourceError::Io { .. } | SourceError::TooLarge { .. } => Self::Io(err.to_string()),
        }
    }
}

impl From<SourceError> for RenderError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Yaml { .. } => Self::Parse(err.to_string()),
            SourceError::Io { .. } | SourceError::TooLarge { .. } => Self::Io(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a file while enforcing a maximum byte limit.
pub(crate) fn read_file_limited(path: &Path, max_bytes: usize) -> Result<Vec<u8>, SourceError> {
    let io_error = |err: std::io::Error| SourceError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    };
    let file = File::open(path).map_err(io_error)?;
    let limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut buf = Vec::new();
    file.take(limit).read_to_end(&mut buf).map_err(io_error)?;
    if buf.len() > max_bytes {
        return Err(SourceError::TooLarge {
            path: path.display().to_string(),
            limit: max_bytes,
        });
    }
    Ok(buf)
}

/// Reads and parses a YAML file; empty documents yield `Value::Null`.
pub(crate) fn read_yaml(path: &Path, max_bytes: usize) -> Result<Value, SourceError> {
    let bytes = read_file_limited(path, max_bytes)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_yaml::from_slice(&bytes).map_err(|err| SourceError::Yaml {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}
