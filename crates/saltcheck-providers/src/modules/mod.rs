// crates/saltcheck-providers/src/modules/mod.rs
// ============================================================================
// Module: Built-in Execution Modules
// Description: Local implementations of the `test`, `file`, `environ`, and
//              `saltcheck` namespaces.
// Purpose: Give the registry a useful operation set without a remote system.
// Dependencies: saltcheck-core, serde_json
// ============================================================================

//! ## Overview
//! Each module reads its arguments positionally first and by keyword second,
//! matching how test definitions supply `args` and `kwargs`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use saltcheck_core::Invocation;
use serde_json::Value;

use crate::registry::ModuleError;

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod environ;
pub mod file;
pub mod saltcheck;

// ============================================================================
// SECTION: Argument Helpers
// ============================================================================

/// Returns an argument by position, falling back to its keyword name.
pub(crate) fn argument<'a>(call: &'a Invocation, index: usize, name: &str) -> Option<&'a Value> {
    call.arg(index).or_else(|| call.kwarg(name))
}

/// Returns a required string argument.
pub(crate) fn string_argument<'a>(
    call: &'a Invocation,
    index: usize,
    name: &'static str,
) -> Result<&'a str, ModuleError> {
    match argument(call, index, name) {
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(ModuleError::InvalidArgument {
            name,
            expected: "a string",
        }),
        None => Err(ModuleError::MissingArgument(name)),
    }
}

/// Returns an optional string argument.
pub(crate) fn optional_string_argument<'a>(
    call: &'a Invocation,
    index: usize,
    name: &'static str,
) -> Result<Option<&'a str>, ModuleError> {
    match argument(call, index, name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => Err(ModuleError::InvalidArgument {
            name,
            expected: "a string",
        }),
    }
}
