// crates/saltcheck-core/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: In-memory collaborators for saltcheck runtime tests.
// Purpose: Substitute the managed system with deterministic fakes.
// Dependencies: saltcheck-core, serde_json
// ============================================================================

//! ## Overview
//! Every collaborator trait has a recording fake here. Fakes are configured
//! with builder-style methods and record what the runtime asked of them so
//! tests can assert on call sequences as well as results.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use saltcheck_core::AuditSink;
use saltcheck_core::CacheError;
use saltcheck_core::CatalogError;
use saltcheck_core::Collaborators;
use saltcheck_core::ConfigSource;
use saltcheck_core::FileCache;
use saltcheck_core::Invocation;
use saltcheck_core::InvokeError;
use saltcheck_core::ModuleCatalog;
use saltcheck_core::OperationInvoker;
use saltcheck_core::RenderError;
use saltcheck_core::Renderer;
use saltcheck_core::StateCatalog;
use saltcheck_core::audit::CoercionAuditEvent;
use saltcheck_core::audit::PlanEntryAuditEvent;
use saltcheck_core::audit::ResolutionAuditEvent;
use saltcheck_core::audit::TestResultAuditEvent;
use saltcheck_core::audit::ValidationAuditEvent;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Invoker
// ============================================================================

/// Invoker returning canned values per operation.
#[derive(Default)]
pub struct FakeInvoker {
    /// Canned return per operation.
    responses: HashMap<String, Value>,
    /// Operations that fail when invoked.
    failures: HashMap<String, String>,
    /// Every call received.
    pub calls: RefCell<Vec<Invocation>>,
}

impl FakeInvoker {
    /// Creates an invoker with no registered operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a canned return value.
    pub fn returning(mut self, operation: &str, value: Value) -> Self {
        self.responses.insert(operation.to_string(), value);
        self
    }

    /// Registers an operation that raises.
    pub fn failing(mut self, operation: &str, message: &str) -> Self {
        self.failures.insert(operation.to_string(), message.to_string());
        self
    }

    /// Returns the number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Returns the most recent call.
    pub fn last_call(&self) -> Option<Invocation> {
        self.calls.borrow().last().cloned()
    }
}

impl OperationInvoker for FakeInvoker {
    fn invoke(&self, call: &Invocation) -> Result<Value, InvokeError> {
        self.calls.borrow_mut().push(call.clone());
        if let Some(message) = self.failures.get(&call.operation) {
            return Err(InvokeError::Failed {
                operation: call.operation.clone(),
                message: message.clone(),
            });
        }
        self.responses
            .get(&call.operation)
            .cloned()
            .ok_or_else(|| InvokeError::Unknown(call.operation.clone()))
    }
}

// ============================================================================
// SECTION: Module Catalog
// ============================================================================

/// Catalog listing a fixed set of `namespace.verb` operations.
#[derive(Default)]
pub struct FakeModules {
    /// Verbs per namespace.
    verbs: HashMap<String, Vec<String>>,
    /// Namespaces whose verb lookup fails.
    broken: BTreeSet<String>,
    /// Number of `list_modules` calls.
    pub module_lookups: Cell<usize>,
    /// Number of `list_functions` calls.
    pub function_lookups: Cell<usize>,
}

impl FakeModules {
    /// Builds a catalog from dotted operation identifiers.
    pub fn with(operations: &[&str]) -> Self {
        let mut catalog = Self::default();
        for operation in operations {
            let (namespace, _) = operation.split_once('.').unwrap();
            catalog
                .verbs
                .entry(namespace.to_string())
                .or_default()
                .push((*operation).to_string());
        }
        catalog
    }

    /// Marks a namespace whose verb lookup raises.
    pub fn broken(mut self, namespace: &str) -> Self {
        self.verbs.entry(namespace.to_string()).or_default();
        self.broken.insert(namespace.to_string());
        self
    }
}

impl ModuleCatalog for FakeModules {
    fn list_modules(&self) -> BTreeSet<String> {
        self.module_lookups.set(self.module_lookups.get() + 1);
        self.verbs.keys().cloned().collect()
    }

    fn list_functions(&self, module: &str) -> Result<Vec<String>, InvokeError> {
        self.function_lookups.set(self.function_lookups.get() + 1);
        if self.broken.contains(module) {
            return Err(InvokeError::Failed {
                operation: "sys.list_functions".to_string(),
                message: format!("cannot inspect {module}"),
            });
        }
        Ok(self.verbs.get(module).cloned().unwrap_or_default())
    }
}

// ============================================================================
// SECTION: State Catalog
// ============================================================================

/// State catalog with canned plans and top file.
#[derive(Default)]
pub struct FakeStates {
    /// Known state names.
    known: Vec<String>,
    /// Plan entries per state.
    plans: HashMap<String, Vec<Value>>,
    /// Top-file states per environment.
    top: HashMap<String, Vec<String>>,
    /// Environments requested through `list_known_states`.
    pub saltenvs: RefCell<Vec<String>>,
}

impl FakeStates {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a known state with its plan.
    pub fn state(mut self, name: &str, plan: Vec<Value>) -> Self {
        self.known.push(name.to_string());
        self.plans.insert(name.to_string(), plan);
        self
    }

    /// Registers the top-file states for an environment.
    pub fn top(mut self, saltenv: &str, states: &[&str]) -> Self {
        self.top.insert(
            saltenv.to_string(),
            states.iter().map(|state| (*state).to_string()).collect(),
        );
        self
    }
}

impl StateCatalog for FakeStates {
    fn list_known_states(&self, saltenv: &str) -> Result<Vec<String>, CatalogError> {
        self.saltenvs.borrow_mut().push(saltenv.to_string());
        Ok(self.known.clone())
    }

    fn show_low_sls(&self, state: &str, _saltenv: &str) -> Result<Vec<Value>, CatalogError> {
        self.plans.get(state).cloned().ok_or_else(|| CatalogError::NotFound(state.to_string()))
    }

    fn show_top(&self, saltenv: &str) -> Result<Vec<String>, CatalogError> {
        self.top.get(saltenv).cloned().ok_or_else(|| CatalogError::NotFound(saltenv.to_string()))
    }
}

/// Builds a plan entry for a nested state.
pub fn low(sls: &str, id: &str) -> Value {
    serde_json::json!({"__sls__": sls, "__id__": id, "state": "test", "fun": "nop"})
}

// ============================================================================
// SECTION: File Cache
// ============================================================================

/// Cache serving canned directory listings keyed by remote path.
#[derive(Default)]
pub struct FakeCache {
    /// Files per remote directory.
    directories: HashMap<String, Vec<PathBuf>>,
    /// Remote paths requested, in order.
    pub requests: RefCell<Vec<String>>,
}

impl FakeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers files for a remote directory, stored under `/cache`.
    pub fn directory(mut self, remote_path: &str, files: &[&str]) -> Self {
        let relative = remote_path.trim_start_matches("salt://");
        let paths = files
            .iter()
            .map(|file| Path::new("/cache/files/base").join(relative).join(file))
            .collect();
        self.directories.insert(remote_path.to_string(), paths);
        self
    }
}

impl FileCache for FakeCache {
    fn cache_directory(
        &self,
        remote_path: &str,
        _saltenv: &str,
        _include_pattern: &str,
    ) -> Result<Vec<PathBuf>, CacheError> {
        self.requests.borrow_mut().push(remote_path.to_string());
        Ok(self.directories.get(remote_path).cloned().unwrap_or_default())
    }
}

/// Returns the cached local path for a remote file.
pub fn cached(remote_file: &str) -> PathBuf {
    Path::new("/cache/files/base").join(remote_file)
}

// ============================================================================
// SECTION: Renderer
// ============================================================================

/// Renderer returning canned structures per path.
#[derive(Default)]
pub struct FakeRenderer {
    /// Rendered value per path.
    files: HashMap<PathBuf, Value>,
    /// Paths rendered, in order.
    pub rendered: RefCell<Vec<PathBuf>>,
}

impl FakeRenderer {
    /// Creates an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the rendered value for a path.
    pub fn file(mut self, path: PathBuf, value: Value) -> Self {
        self.files.insert(path, value);
        self
    }
}

impl Renderer for FakeRenderer {
    fn render(&self, path: &Path) -> Result<Value, RenderError> {
        self.rendered.borrow_mut().push(path.to_path_buf());
        self.files.get(path).cloned().ok_or_else(|| RenderError::Io(path.display().to_string()))
    }
}

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration backed by a JSON object.
#[derive(Default)]
pub struct FakeConfig {
    /// Configured values.
    values: Map<String, Value>,
}

impl FakeConfig {
    /// Creates a configuration with no keys set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a key.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }
}

impl ConfigSource for FakeConfig {
    fn get_config(&self, key: &str, default: Value) -> Value {
        self.values.get(key).cloned().unwrap_or(default)
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event label and payload.
#[derive(Default)]
pub struct RecordingAudit {
    /// Event labels in arrival order.
    pub events: RefCell<Vec<&'static str>>,
    /// Validation events.
    pub validations: RefCell<Vec<ValidationAuditEvent>>,
    /// Resolution events.
    pub resolutions: RefCell<Vec<ResolutionAuditEvent>>,
    /// Test result events.
    pub results: RefCell<Vec<TestResultAuditEvent>>,
}

impl RecordingAudit {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts events with a label.
    pub fn count(&self, label: &str) -> usize {
        self.events.borrow().iter().filter(|event| **event == label).count()
    }
}

impl AuditSink for RecordingAudit {
    fn record_validation(&self, event: &ValidationAuditEvent) {
        self.events.borrow_mut().push(event.event);
        self.validations.borrow_mut().push(event.clone());
    }

    fn record_coercion(&self, event: &CoercionAuditEvent) {
        self.events.borrow_mut().push(event.event);
    }

    fn record_resolution(&self, event: &ResolutionAuditEvent) {
        self.events.borrow_mut().push(event.event);
        self.resolutions.borrow_mut().push(event.clone());
    }

    fn record_plan_entry(&self, event: &PlanEntryAuditEvent) {
        self.events.borrow_mut().push(event.event);
    }

    fn record_result(&self, event: &TestResultAuditEvent) {
        self.events.borrow_mut().push(event.event);
        self.results.borrow_mut().push(event.clone());
    }
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Owns one of every fake and lends them out as [`Collaborators`].
pub struct Harness {
    /// Operation invoker.
    pub invoker: FakeInvoker,
    /// Module catalog.
    pub modules: FakeModules,
    /// State catalog.
    pub states: FakeStates,
    /// File cache.
    pub cache: FakeCache,
    /// Renderer.
    pub renderer: FakeRenderer,
    /// Configuration.
    pub config: FakeConfig,
    /// Audit sink.
    pub audit: RecordingAudit,
}

impl Harness {
    /// Creates a harness with empty fakes.
    pub fn new() -> Self {
        Self {
            invoker: FakeInvoker::new(),
            modules: FakeModules::default(),
            states: FakeStates::new(),
            cache: FakeCache::new(),
            renderer: FakeRenderer::new(),
            config: FakeConfig::new(),
            audit: RecordingAudit::new(),
        }
    }

    /// Borrows the fakes as session collaborators.
    pub fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            invoker: &self.invoker,
            modules: &self.modules,
            states: &self.states,
            cache: &self.cache,
            renderer: &self.renderer,
            config: &self.config,
            audit: &self.audit,
        }
    }
}
