// crates/saltcheck-providers/src/modules/environ.rs
// ============================================================================
// Module: Environ Execution Module
// Description: Environment variable lookups.
// Purpose: Provide `environ.get` and `environ.has_value`.
// Dependencies: saltcheck-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Values come from the process environment unless an override map is
//! configured, in which case only the overrides are consulted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use saltcheck_core::Invocation;
use serde::Deserialize;
use serde_json::Value;

use crate::modules::optional_string_argument;
use crate::modules::string_argument;
use crate::registry::ExecutionModule;
use crate::registry::ModuleError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the environ module.
///
/// # Invariants
/// - `overrides` take precedence over process environment reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EnvironModuleConfig {
    /// Optional override map used for deterministic lookups.
    pub overrides: Option<BTreeMap<String, String>>,
}

// ============================================================================
// SECTION: Module
// ============================================================================

/// Verbs implemented by [`EnvironModule`].
const FUNCTIONS: &[&str] = &["get", "has_value"];

/// Environment variable verbs.
pub struct EnvironModule {
    /// Module configuration.
    config: EnvironModuleConfig,
}

impl EnvironModule {
    /// Creates an environ module with the given configuration.
    #[must_use]
    pub const fn new(config: EnvironModuleConfig) -> Self {
        Self {
            config,
        }
    }

    /// Looks up a variable.
    fn lookup(&self, key: &str) -> Option<String> {
        match &self.config.overrides {
            Some(overrides) => overrides.get(key).cloned(),
            None => std::env::var(key).ok(),
        }
    }
}

impl ExecutionModule for EnvironModule {
    fn functions(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn call(&self, verb: &str, call: &Invocation) -> Result<Value, ModuleError> {
        let key = string_argument(call, 0, "key")?;
        match verb {
            "get" => {
                let default = optional_string_argument(call, 1, "default")?.unwrap_or_default();
                Ok(Value::String(self.lookup(key).unwrap_or_else(|| default.to_string())))
            }
            "has_value" => {
                let current = self.lookup(key);
                let matched = match optional_string_argument(call, 1, "value")? {
                    Some(expected) => current.as_deref() == Some(expected),
                    None => current.is_some_and(|value| !value.is_empty()),
                };
                Ok(Value::Bool(matched))
            }
            other => Err(ModuleError::UnknownFunction(other.to_string())),
        }
    }
}
