// crates/saltcheck-core/src/runtime/coercion.rs
// ============================================================================
// Module: Saltcheck Value Coercion
// Description: Casts expected values into the runtime type of returned values.
// Purpose: Let test files write `"1"` or `"True"` for typed returns.
// Dependencies: crate::core, crate::audit, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Test files are frequently hand-written YAML, so an expected value often
//! arrives as text while the operation returns a number, boolean, or
//! container. Coercion rebuilds the expected value in the returned value's
//! type before comparison. A failed cast is not an error for the test: the
//! original expected value is kept, the failure is audited, and the assertion
//! decides the outcome.
//!
//! Invariants:
//! - A null actual value leaves `expected` untouched.
//! - Coercion is idempotent: casting an already-cast value is a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::CoercionAuditEvent;
use crate::core::ValueKind;
use crate::core::value::is_truthy;
use crate::core::value::render;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A value could not be rebuilt in the target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot cast {found} value to {target}")]
pub struct CoercionError {
    /// Type label of the value being cast.
    pub found: &'static str,
    /// Type label of the requested type.
    pub target: &'static str,
}

// ============================================================================
// SECTION: Coercion
// ============================================================================

/// Coerces `expected` into the runtime type of `actual`, auditing failures.
///
/// Returns `expected` unchanged when `actual` is null or the cast fails.
#[must_use]
pub fn coerce(expected: &Value, actual: &Value, audit: &dyn AuditSink) -> Value {
    let kind = ValueKind::of(actual);
    if kind == ValueKind::None {
        return expected.clone();
    }
    if kind == ValueKind::Bool && matches!(expected, Value::String(text) if text == "False") {
        return Value::Bool(false);
    }
    match cast(expected, kind) {
        Ok(value) => value,
        Err(_) => {
            audit.record_coercion(&CoercionAuditEvent::new(
                expected.clone(),
                actual.clone(),
                kind.as_str(),
            ));
            expected.clone()
        }
    }
}

/// Builds a value of type `target` from `value`.
///
/// # Errors
///
/// Returns [`CoercionError`] when `value` has no representation in `target`.
pub fn cast(value: &Value, target: ValueKind) -> Result<Value, CoercionError> {
    let error = || CoercionError {
        found: ValueKind::of(value).as_str(),
        target: target.as_str(),
    };
    match target {
        ValueKind::None => Ok(value.clone()),
        ValueKind::Bool => Ok(Value::Bool(is_truthy(value))),
        ValueKind::Int => to_int(value).map(Value::from).ok_or_else(error),
        ValueKind::Float => {
            to_float(value).and_then(Number::from_f64).map(Value::Number).ok_or_else(error)
        }
        ValueKind::Str => Ok(Value::String(render(value))),
        ValueKind::List => to_list(value).map(Value::Array).ok_or_else(error),
        ValueKind::Dict => to_dict(value).map(Value::Object).ok_or_else(error),
    }
}

/// Integer view: booleans map to 0/1, floats truncate, text must parse.
fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().and_then(truncate)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Truncates a float toward zero when it fits in an `i64`.
fn truncate(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if !truncated.is_finite() {
        return None;
    }
    format!("{truncated:.0}").parse().ok()
}

/// Float view: numbers widen, booleans map to 0/1, text must parse.
fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Bool(flag) => Some(f64::from(u8::from(*flag))),
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// List view: text splits into characters, mappings yield their keys.
fn to_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::String(text) => Some(text.chars().map(|ch| Value::String(ch.to_string())).collect()),
        Value::Object(map) => Some(map.keys().cloned().map(Value::String).collect()),
        _ => None,
    }
}

/// Mapping view: mappings copy, lists must hold two-element key/value pairs.
fn to_dict(value: &Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::Array(items) => {
            let mut map = Map::new();
            for item in items {
                let Value::Array(pair) = item else {
                    return None;
                };
                let [key, entry] = pair.as_slice() else {
                    return None;
                };
                if matches!(key, Value::Array(_) | Value::Object(_)) {
                    return None;
                }
                map.insert(render(key), entry.clone());
            }
            Some(map)
        }
        _ => None,
    }
}
