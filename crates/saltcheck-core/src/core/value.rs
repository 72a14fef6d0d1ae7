// crates/saltcheck-core/src/core/value.rs
// ============================================================================
// Module: Saltcheck Value Semantics
// Description: Loose typing, rendering, and comparison rules for test values.
// Purpose: Give expected and returned values one consistent dynamic model.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Operation returns and expected values are carried as [`serde_json::Value`].
//! Execution modules report results with loose typing: booleans compare with
//! integers, integers compare with floats, and strings are rendered bare at
//! the top level but quoted inside containers. This module centralizes those
//! rules so the assertion library, coercion, and report rendering agree.
//!
//! Invariants:
//! - Comparisons never panic; incomparable pairs yield `None` or an error
//!   message, never a guess.
//! - Rendering is deterministic for a given value (mapping order is preserved).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt::Write;

use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Value Kinds
// ============================================================================

/// Runtime type of a dynamic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Null / absent value.
    None,
    /// Boolean value.
    Bool,
    /// Integer number.
    Int,
    /// Floating point number.
    Float,
    /// Text value.
    Str,
    /// Ordered sequence.
    List,
    /// String-keyed mapping.
    Dict,
}

impl ValueKind {
    /// Classifies a value by its runtime type.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(_) => Self::Bool,
            Value::Number(number) => {
                if number.is_f64() {
                    Self::Float
                } else {
                    Self::Int
                }
            }
            Value::String(_) => Self::Str,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Dict,
        }
    }

    /// Returns the type label used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::List => "list",
            Self::Dict => "dict",
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a value the way it appears in status messages.
///
/// Strings render bare; everything else renders as [`repr`].
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => repr(other),
    }
}

/// Renders a value in quoted form, used for nested values and argument lists.
#[must_use]
pub fn repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(&mut out, value);
    out
}

/// Appends the quoted rendering of `value` to `out`.
fn write_repr(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(number) => {
            let _ = write!(out, "{number}");
        }
        Value::String(text) => write_quoted(out, text),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_repr(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (index, (key, item)) in map.iter().enumerate() {
                if index > 0 {
                    out.push_str(", ");
                }
                write_quoted(out, key);
                out.push_str(": ");
                write_repr(out, item);
            }
            out.push('}');
        }
    }
}

/// Appends a quoted string, preferring single quotes.
fn write_quoted(out: &mut String, text: &str) {
    let quote = if text.contains('\'') && !text.contains('"') { '"' } else { '\'' };
    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

// ============================================================================
// SECTION: Truthiness
// ============================================================================

/// Returns true when the value is considered non-empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(_) => numeric(value).is_some_and(|number| !number.is_zero()),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// ============================================================================
// SECTION: Equality and Ordering
// ============================================================================

/// Numeric view of a value used for cross-type comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    /// Exact integer (booleans map to 0/1).
    Int(i128),
    /// Floating point value.
    Float(f64),
}

impl Numeric {
    /// Returns true when the number is zero.
    fn is_zero(self) -> bool {
        match self {
            Self::Int(value) => value == 0,
            Self::Float(value) => value == 0.0,
        }
    }

    /// Returns the floating point approximation.
    #[allow(clippy::cast_precision_loss, reason = "Mixed int/float comparisons are approximate.")]
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Orders two numbers; NaN is unordered.
    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => Some(left.cmp(&right)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// Extracts a numeric view from numbers and booleans.
fn numeric(value: &Value) -> Option<Numeric> {
    match value {
        Value::Bool(flag) => Some(Numeric::Int(i128::from(*flag))),
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Some(Numeric::Int(i128::from(value)))
            } else if let Some(value) = number.as_u64() {
                Some(Numeric::Int(i128::from(value)))
            } else {
                number.as_f64().map(Numeric::Float)
            }
        }
        _ => None,
    }
}

/// Loose equality: numbers and booleans compare by numeric value, containers
/// compare element-wise with the same rule.
#[must_use]
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    if let (Some(left), Some(right)) = (numeric(left), numeric(right)) {
        return left.compare(right) == Some(Ordering::Equal);
    }
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len() && left.iter().zip(right).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Object(left), Value::Object(right)) => maps_eq(left, right),
        _ => false,
    }
}

/// Compares two mappings key-by-key, ignoring insertion order.
fn maps_eq(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left.iter().all(|(key, value)| right.get(key).is_some_and(|other| loose_eq(value, other)))
}

/// Orders two values, returning `None` when the types are not orderable.
///
/// Numbers (and booleans) order numerically, strings order by code point, and
/// lists order lexicographically by their first unequal element.
#[must_use]
pub fn loose_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(left), Some(right)) = (numeric(left), numeric(right)) {
        return left.compare(right);
    }
    match (left, right) {
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        (Value::Array(left), Value::Array(right)) => {
            for (l, r) in left.iter().zip(right) {
                if !loose_eq(l, r) {
                    return loose_cmp(l, r);
                }
            }
            Some(left.len().cmp(&right.len()))
        }
        _ => None,
    }
}

/// Membership test for `item` inside `container`.
///
/// # Errors
///
/// Returns a message when the container does not support membership or the
/// item type cannot be searched for.
pub fn contains(container: &Value, item: &Value) -> Result<bool, String> {
    match container {
        Value::String(haystack) => match item {
            Value::String(needle) => Ok(haystack.contains(needle.as_str())),
            other => Err(format!(
                "'in <string>' requires string as left operand, not {}",
                ValueKind::of(other).as_str()
            )),
        },
        Value::Array(items) => Ok(items.iter().any(|candidate| loose_eq(candidate, item))),
        Value::Object(map) => match item {
            Value::Array(_) | Value::Object(_) => {
                Err(format!("unhashable type: '{}'", ValueKind::of(item).as_str()))
            }
            Value::String(key) => Ok(map.contains_key(key)),
            _ => Ok(false),
        },
        other => {
            Err(format!("argument of type '{}' is not iterable", ValueKind::of(other).as_str()))
        }
    }
}
