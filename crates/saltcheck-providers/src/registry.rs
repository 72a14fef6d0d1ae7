// crates/saltcheck-providers/src/registry.rs
// ============================================================================
// Module: Execution Module Registry
// Description: Registry for built-in and custom execution modules.
// Purpose: Route `namespace.verb` invocations and answer introspection.
// Dependencies: saltcheck-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The module registry resolves operations by namespace and dispatches them to
//! the registered [`ExecutionModule`]. It implements both
//! [`OperationInvoker`] and [`ModuleCatalog`], so the runner and the validator
//! see the same set of operations.
//!
//! Invariants:
//! - A namespace is registered at most once.
//! - An operation is dispatched only when its verb is listed by the module.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use saltcheck_core::Invocation;
use saltcheck_core::InvokeError;
use saltcheck_core::ModuleCatalog;
use saltcheck_core::OperationInvoker;
use saltcheck_core::split_operation;
use serde_json::Value;
use thiserror::Error;

use crate::EnvironModule;
use crate::EnvironModuleConfig;
use crate::FileModule;
use crate::FileModuleConfig;
use crate::SlsStateCatalog;
use crate::StateApplyModule;
use crate::TestModule;

// ============================================================================
// SECTION: Module Contract
// ============================================================================

/// Errors raised by an execution module while running a verb.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A required argument is missing.
    #[error("missing required argument '{0}'")]
    MissingArgument(&'static str),
    /// An argument has the wrong type.
    #[error("argument '{name}' must be {expected}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Expected type description.
        expected: &'static str,
    },
    /// The verb is not implemented by this module.
    #[error("function '{0}' is not implemented")]
    UnknownFunction(String),
    /// The verb failed while touching the system.
    #[error("{0}")]
    Execution(String),
}

/// A namespace of callable verbs.
pub trait ExecutionModule {
    /// Lists the verbs this module implements.
    fn functions(&self) -> &'static [&'static str];

    /// Runs one verb.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError`] when arguments are invalid or the verb fails.
    fn call(&self, verb: &str, call: &Invocation) -> Result<Value, ModuleError>;
}

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Module registration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The namespace is already registered.
    #[error("module namespace already registered: {0}")]
    Duplicate(String),
    /// The namespace is empty or contains a separator.
    #[error("invalid module namespace: {0:?}")]
    InvalidNamespace(String),
}

// ============================================================================
// SECTION: Module Registry
// ============================================================================

/// Execution module registry keyed by namespace.
#[derive(Default)]
pub struct ModuleRegistry {
    /// Module implementations keyed by namespace.
    modules: BTreeMap<String, Box<dyn ExecutionModule>>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in modules registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a built-in namespace collides.
    pub fn with_builtin_modules(
        states: SlsStateCatalog,
        saltenv: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_builtin_modules(states, saltenv)?;
        Ok(registry)
    }

    /// Registers a module under a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the namespace is invalid or taken.
    pub fn register_module(
        &mut self,
        namespace: impl Into<String>,
        module: impl ExecutionModule + 'static,
    ) -> Result<(), RegistryError> {
        let namespace = namespace.into();
        if namespace.is_empty() || namespace.contains('.') {
            return Err(RegistryError::InvalidNamespace(namespace));
        }
        if self.modules.contains_key(&namespace) {
            return Err(RegistryError::Duplicate(namespace));
        }
        self.modules.insert(namespace, Box::new(module));
        Ok(())
    }

    /// Registers the `test`, `file`, `environ`, and `saltcheck` modules.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when a built-in namespace collides.
    pub fn register_builtin_modules(
        &mut self,
        states: SlsStateCatalog,
        saltenv: impl Into<String>,
    ) -> Result<(), RegistryError> {
        self.register_module("test", TestModule)?;
        self.register_module("file", FileModule::new(FileModuleConfig::default()))?;
        self.register_module("environ", EnvironModule::new(EnvironModuleConfig::default()))?;
        self.register_module("saltcheck", StateApplyModule::new(states, saltenv))?;
        Ok(())
    }

    /// Returns true when the namespace is registered.
    #[must_use]
    pub fn contains(&self, namespace: &str) -> bool {
        self.modules.contains_key(namespace)
    }
}

impl OperationInvoker for ModuleRegistry {
    fn invoke(&self, call: &Invocation) -> Result<Value, InvokeError> {
        let unknown = || InvokeError::Unknown(call.operation.clone());
        let (namespace, verb) = split_operation(&call.operation).ok_or_else(unknown)?;
        let module = self.modules.get(namespace).ok_or_else(unknown)?;
        if !module.functions().iter().any(|name| *name == verb) {
            return Err(unknown());
        }
        module.call(verb, call).map_err(|err| InvokeError::Failed {
            operation: call.operation.clone(),
            message: err.to_string(),
        })
    }
}

impl ModuleCatalog for ModuleRegistry {
    fn list_modules(&self) -> BTreeSet<String> {
        self.modules.keys().cloned().collect()
    }

    fn list_functions(&self, module: &str) -> Result<Vec<String>, InvokeError> {
        let Some(registered) = self.modules.get(module) else {
            return Err(InvokeError::Unknown(module.to_string()));
        };
        Ok(registered.functions().iter().map(|verb| format!("{module}.{verb}")).collect())
    }
}
