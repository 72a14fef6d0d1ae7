// crates/saltcheck-core/src/interfaces/mod.rs
// ============================================================================
// Module: Saltcheck Interfaces
// Description: Collaborator contracts for invocation, rendering, and caching.
// Purpose: Define the seams the runtime uses to reach the managed system.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The runtime never talks to the managed system directly. Operation
//! dispatch, namespace introspection, test file rendering, remote file
//! caching, state plan enumeration, and configuration lookup all go through
//! the traits below, passed explicitly into each runtime component.
//!
//! Empty results from caching and enumeration are valid and never errors.
//! Errors returned from [`OperationInvoker::invoke`] are fatal to the test
//! being run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Operation Invocation
// ============================================================================

/// Argument shape of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    /// No positional or keyword arguments.
    Bare,
    /// Positional arguments only.
    Positional,
    /// Keyword arguments only.
    Keyword,
    /// Both positional and keyword arguments.
    Mixed,
}

/// A fully prepared operation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Dotted operation identifier.
    pub operation: String,
    /// Positional arguments.
    pub args: Vec<Value>,
    /// Keyword arguments.
    pub kwargs: Map<String, Value>,
}

impl Invocation {
    /// Creates an invocation, treating absent argument lists as empty.
    #[must_use]
    pub fn new(
        operation: impl Into<String>,
        args: Option<Vec<Value>>,
        kwargs: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            operation: operation.into(),
            args: args.unwrap_or_default(),
            kwargs: kwargs.unwrap_or_default(),
        }
    }

    /// Returns the argument shape of this call.
    #[must_use]
    pub fn shape(&self) -> CallShape {
        match (self.args.is_empty(), self.kwargs.is_empty()) {
            (true, true) => CallShape::Bare,
            (false, true) => CallShape::Positional,
            (true, false) => CallShape::Keyword,
            (false, false) => CallShape::Mixed,
        }
    }

    /// Returns a positional argument by index.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Returns a keyword argument by name.
    #[must_use]
    pub fn kwarg(&self, name: &str) -> Option<&Value> {
        self.kwargs.get(name)
    }
}

/// Operation invocation errors.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The operation is not registered.
    #[error("'{0}' is not available")]
    Unknown(String),
    /// The operation raised while executing.
    #[error("{operation} failed: {message}")]
    Failed {
        /// Operation identifier.
        operation: String,
        /// Failure detail.
        message: String,
    },
}

/// Executes named operations on the managed system.
pub trait OperationInvoker {
    /// Invokes an operation and returns its result.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when the invocation layer fails.
    fn invoke(&self, call: &Invocation) -> Result<Value, InvokeError>;
}

/// Namespace and verb introspection used for validation scoring.
pub trait ModuleCatalog {
    /// Lists the available namespaces.
    fn list_modules(&self) -> BTreeSet<String>;

    /// Lists the `namespace.verb` identifiers for a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when the namespace cannot be inspected.
    fn list_functions(&self, module: &str) -> Result<Vec<String>, InvokeError>;
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Test file rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The file could not be read.
    #[error("render io error: {0}")]
    Io(String),
    /// The file contents could not be parsed.
    #[error("render parse error: {0}")]
    Parse(String),
}

/// Turns a test file into structured data.
pub trait Renderer {
    /// Renders a file into an ordered mapping (or null when empty).
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the file cannot be read or parsed.
    fn render(&self, path: &Path) -> Result<Value, RenderError>;
}

// ============================================================================
// SECTION: File Caching
// ============================================================================

/// File cache errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem failure while caching.
    #[error("cache io error: {0}")]
    Io(String),
    /// The remote path is malformed.
    #[error("invalid cache path: {0}")]
    InvalidPath(String),
}

/// Fetches remote directories into local storage.
pub trait FileCache {
    /// Caches files under `remote_path` matching `include_pattern` and returns
    /// their local paths. A missing directory yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the cache cannot be populated.
    fn cache_directory(
        &self,
        remote_path: &str,
        saltenv: &str,
        include_pattern: &str,
    ) -> Result<Vec<PathBuf>, CacheError>;
}

// ============================================================================
// SECTION: State Catalog
// ============================================================================

/// State catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Filesystem failure while reading state sources.
    #[error("state catalog io error: {0}")]
    Io(String),
    /// A state source could not be parsed.
    #[error("state catalog parse error: {0}")]
    Parse(String),
    /// The requested environment or state is unknown.
    #[error("state catalog lookup failed: {0}")]
    NotFound(String),
}

/// Enumerates states and their low-level execution plans.
pub trait StateCatalog {
    /// Lists every state name known in the environment.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when state sources cannot be enumerated.
    fn list_known_states(&self, saltenv: &str) -> Result<Vec<String>, CatalogError>;

    /// Returns the execution plan entries for a state.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the state cannot be compiled.
    fn show_low_sls(&self, state: &str, saltenv: &str) -> Result<Vec<Value>, CatalogError>;

    /// Returns the states assigned through the top file for an environment.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the top file cannot be read.
    fn show_top(&self, saltenv: &str) -> Result<Vec<String>, CatalogError>;
}

// ============================================================================
// SECTION: Configuration Lookup
// ============================================================================

/// Key/value configuration lookup.
pub trait ConfigSource {
    /// Returns the configured value for `key`, or `default` when unset.
    fn get_config(&self, key: &str, default: Value) -> Value;
}
