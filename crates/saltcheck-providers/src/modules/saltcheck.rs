// crates/saltcheck-providers/src/modules/saltcheck.rs
// ============================================================================
// Module: Saltcheck Execution Module
// Description: The `saltcheck.state_apply` setup alias.
// Purpose: Dry-run a state so tests can assert it would apply cleanly.
// Dependencies: saltcheck-core, serde_json
// ============================================================================

//! ## Overview
//! `state_apply` compiles the named state through the state catalog and
//! reports one entry per declaration, keyed the way state runs key their
//! results (`<module>_|-<id>_|-<name>_|-<function>`). Nothing is changed on
//! the system: every entry carries `result: null` and empty `changes`.
//! An unknown state yields an empty mapping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use saltcheck_core::Invocation;
use saltcheck_core::StateCatalog;
use serde_json::Map;
use serde_json::Value;

use crate::SlsStateCatalog;
use crate::modules::optional_string_argument;
use crate::modules::string_argument;
use crate::registry::ExecutionModule;
use crate::registry::ModuleError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Verbs implemented by [`StateApplyModule`].
const FUNCTIONS: &[&str] = &["state_apply"];
/// Comment attached to every dry-run entry.
const DRY_RUN_COMMENT: &str = "State would be applied (dry run)";

// ============================================================================
// SECTION: Module
// ============================================================================

/// Dry-run state application.
pub struct StateApplyModule {
    /// Catalog used to compile states.
    states: SlsStateCatalog,
    /// Environment used when the call names none.
    saltenv: String,
}

impl StateApplyModule {
    /// Creates the module over a state catalog.
    #[must_use]
    pub fn new(states: SlsStateCatalog, saltenv: impl Into<String>) -> Self {
        Self {
            states,
            saltenv: saltenv.into(),
        }
    }

    /// Compiles a state into a dry-run result mapping.
    fn apply(&self, state: &str, saltenv: &str) -> Result<Value, ModuleError> {
        let mut results = Map::new();
        if self.states.locate(state, saltenv).is_none() {
            return Ok(Value::Object(results));
        }
        let plan = self
            .states
            .show_low_sls(state, saltenv)
            .map_err(|err| ModuleError::Execution(err.to_string()))?;
        let mut errors = Vec::new();
        for entry in plan {
            let fields = match entry {
                Value::Object(fields) => fields,
                Value::String(error) => {
                    errors.push(error);
                    continue;
                }
                other => {
                    errors.push(other.to_string());
                    continue;
                }
            };
            let field = |key: &str| text_field(&fields, key);
            let key = format!(
                "{}_|-{}_|-{}_|-{}",
                field("state"),
                field("__id__"),
                field("name"),
                field("fun")
            );
            let mut result = Map::new();
            result.insert("__id__".to_string(), Value::String(field("__id__").to_string()));
            result.insert("__sls__".to_string(), Value::String(field("__sls__").to_string()));
            result.insert("name".to_string(), Value::String(field("name").to_string()));
            result.insert("result".to_string(), Value::Null);
            result.insert("changes".to_string(), Value::Object(Map::new()));
            result.insert("comment".to_string(), Value::String(DRY_RUN_COMMENT.to_string()));
            results.insert(key, Value::Object(result));
        }
        if !errors.is_empty() {
            return Err(ModuleError::Execution(errors.join("; ")));
        }
        Ok(Value::Object(results))
    }
}

/// Returns a string field of a plan entry, or an empty string.
fn text_field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    fields.get(key).and_then(Value::as_str).unwrap_or_default()
}

impl ExecutionModule for StateApplyModule {
    fn functions(&self) -> &'static [&'static str] {
        FUNCTIONS
    }

    fn call(&self, verb: &str, call: &Invocation) -> Result<Value, ModuleError> {
        if verb != "state_apply" {
            return Err(ModuleError::UnknownFunction(verb.to_string()));
        }
        let state = string_argument(call, 0, "state_name")?;
        let saltenv = optional_string_argument(call, 1, "saltenv")?.unwrap_or(&self.saltenv);
        self.apply(state, saltenv)
    }
}
