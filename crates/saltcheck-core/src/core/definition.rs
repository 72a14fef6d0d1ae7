// crates/saltcheck-core/src/core/definition.rs
// ============================================================================
// Module: Saltcheck Test Definitions
// Description: Test definition model, assertion enumeration, and field keys.
// Purpose: Parse rendered test entries into a typed, lenient definition.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A test definition names an operation to invoke, its arguments, and how the
//! return value is asserted. Definitions arrive as untrusted rendered data, so
//! parsing is lenient: a field with the wrong shape is treated as absent and
//! left for the validator to score, rather than aborting the whole suite.
//!
//! The `expected-return` key keeps a three-way distinction (absent, present
//! but null, present with a value) because validation awards separate points
//! for key presence and value presence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::value::is_truthy;
use crate::core::value::render;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Operation alias that applies a state as test setup or teardown.
pub const STATE_APPLY_OPERATION: &str = "saltcheck.state_apply";
/// Default delimiter for `assertion_section` paths.
pub const DEFAULT_SECTION_DELIMITER: &str = ":";
/// Default test directory name relative to a state directory.
pub const DEFAULT_TEST_LOCATION: &str = "saltcheck-tests";
/// File extension carried by test definition files.
pub const TEST_FILE_EXTENSION: &str = "tst";

/// Field keys recognized in a rendered test entry.
pub mod keys {
    /// Dotted operation identifier.
    pub const OPERATION: &str = "module_and_function";
    /// Positional arguments.
    pub const ARGS: &str = "args";
    /// Keyword arguments.
    pub const KWARGS: &str = "kwargs";
    /// Assertion name.
    pub const ASSERTION: &str = "assertion";
    /// Expected return value.
    pub const EXPECTED: &str = "expected-return";
    /// Section path into a structured return.
    pub const ASSERTION_SECTION: &str = "assertion_section";
    /// Delimiter for the section path.
    pub const ASSERTION_SECTION_DELIMITER: &str = "assertion_section_delimiter";
    /// Verbose failure message toggle.
    pub const PRINT_RESULT: &str = "print_result";
    /// Pillar data injected as the `pillar` keyword.
    pub const PILLAR_DATA: &str = "pillar-data";
    /// Skip flag.
    pub const SKIP: &str = "skip";
    /// Keyword under which pillar data is passed to the operation.
    pub const PILLAR_KWARG: &str = "pillar";
}

// ============================================================================
// SECTION: Assertions
// ============================================================================

/// Supported assertion kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Assertion {
    /// `expected == actual`.
    #[serde(rename = "assertEqual")]
    Equal,
    /// `expected != actual`.
    #[serde(rename = "assertNotEqual")]
    NotEqual,
    /// `actual` is boolean true.
    #[serde(rename = "assertTrue")]
    True,
    /// `actual` is boolean false.
    #[serde(rename = "assertFalse")]
    False,
    /// `expected` is contained in `actual`.
    #[serde(rename = "assertIn")]
    In,
    /// `expected` is not contained in `actual`.
    #[serde(rename = "assertNotIn")]
    NotIn,
    /// `expected > actual`.
    #[serde(rename = "assertGreater")]
    Greater,
    /// `expected >= actual`.
    #[serde(rename = "assertGreaterEqual")]
    GreaterEqual,
    /// `expected < actual`.
    #[serde(rename = "assertLess")]
    Less,
    /// `expected <= actual`.
    #[serde(rename = "assertLessEqual")]
    LessEqual,
    /// `actual` is empty or falsy.
    #[serde(rename = "assertEmpty")]
    Empty,
    /// `actual` is non-empty or truthy.
    #[serde(rename = "assertNotEmpty")]
    NotEmpty,
}

impl Assertion {
    /// All assertions in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Equal,
        Self::NotEqual,
        Self::True,
        Self::False,
        Self::In,
        Self::NotIn,
        Self::Greater,
        Self::GreaterEqual,
        Self::Less,
        Self::LessEqual,
        Self::Empty,
        Self::NotEmpty,
    ];

    /// Returns the canonical assertion name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "assertEqual",
            Self::NotEqual => "assertNotEqual",
            Self::True => "assertTrue",
            Self::False => "assertFalse",
            Self::In => "assertIn",
            Self::NotIn => "assertNotIn",
            Self::Greater => "assertGreater",
            Self::GreaterEqual => "assertGreaterEqual",
            Self::Less => "assertLess",
            Self::LessEqual => "assertLessEqual",
            Self::Empty => "assertEmpty",
            Self::NotEmpty => "assertNotEmpty",
        }
    }

    /// Returns true when the assertion inspects only the actual value.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::True | Self::False | Self::Empty | Self::NotEmpty)
    }

    /// Returns true when the expected value is cast to the actual value's type
    /// before evaluation.
    #[must_use]
    pub const fn coerces_expected(self) -> bool {
        !matches!(
            self,
            Self::In | Self::NotIn | Self::Empty | Self::NotEmpty | Self::True | Self::False
        )
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an assertion name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is not in the assertions list")]
pub struct UnknownAssertion(pub String);

impl FromStr for Assertion {
    type Err = UnknownAssertion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|assertion| assertion.as_str() == value)
            .ok_or_else(|| UnknownAssertion(value.to_string()))
    }
}

// ============================================================================
// SECTION: Test Definition
// ============================================================================

/// A single named test definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDefinition {
    /// Unique test name.
    pub name: String,
    /// Dotted `<namespace>.<verb>` operation identifier.
    pub operation: Option<String>,
    /// Positional arguments.
    pub args: Option<Vec<Value>>,
    /// Keyword arguments.
    pub kwargs: Option<Map<String, Value>>,
    /// Raw assertion name as written.
    pub assertion: Option<String>,
    /// Expected return; `None` when the key is absent, `Some(Value::Null)`
    /// when the key is present without a value.
    pub expected: Option<Value>,
    /// Optional section path into a structured return.
    pub assertion_section: Option<String>,
    /// Delimiter used to split `assertion_section`.
    pub assertion_section_delimiter: String,
    /// Whether equality and membership failures include the values.
    pub print_result: bool,
    /// Pillar data injected under the `pillar` keyword argument.
    pub pillar_data: Option<Map<String, Value>>,
    /// Skip flag.
    pub skip: bool,
}

impl TestDefinition {
    /// Creates a definition with only a name and operation set.
    #[must_use]
    pub fn new(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: Some(operation.into()),
            args: None,
            kwargs: None,
            assertion: None,
            expected: None,
            assertion_section: None,
            assertion_section_delimiter: DEFAULT_SECTION_DELIMITER.to_string(),
            print_result: true,
            pillar_data: None,
            skip: false,
        }
    }

    /// Builds a definition from a rendered entry.
    ///
    /// Non-mapping entries produce a definition with every field absent, which
    /// never passes validation unless it is skipped.
    #[must_use]
    pub fn from_value(name: impl Into<String>, value: &Value) -> Self {
        let empty = Map::new();
        let fields = value.as_object().unwrap_or(&empty);
        let text = |key: &str| match fields.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => Some(render(other)),
        };
        let flag = |key: &str, default: bool| fields.get(key).map_or(default, is_truthy);
        let args = match fields.get(keys::ARGS) {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(items.clone()),
            Some(single) => Some(vec![single.clone()]),
        };
        Self {
            name: name.into(),
            operation: match fields.get(keys::OPERATION) {
                Some(Value::String(operation)) => Some(operation.clone()),
                _ => None,
            },
            args,
            kwargs: fields.get(keys::KWARGS).and_then(Value::as_object).cloned(),
            assertion: text(keys::ASSERTION),
            expected: fields.get(keys::EXPECTED).cloned(),
            assertion_section: text(keys::ASSERTION_SECTION),
            assertion_section_delimiter: text(keys::ASSERTION_SECTION_DELIMITER)
                .filter(|delimiter| !delimiter.is_empty())
                .unwrap_or_else(|| DEFAULT_SECTION_DELIMITER.to_string()),
            print_result: flag(keys::PRINT_RESULT, true),
            pillar_data: fields.get(keys::PILLAR_DATA).and_then(Value::as_object).cloned(),
            skip: flag(keys::SKIP, false),
        }
    }

    /// Returns the parsed assertion, if the name is recognized.
    #[must_use]
    pub fn assertion_kind(&self) -> Option<Assertion> {
        self.assertion.as_deref().and_then(|name| name.parse().ok())
    }

    /// Returns true when the operation is the state-apply alias.
    #[must_use]
    pub fn is_state_apply(&self) -> bool {
        self.operation.as_deref() == Some(STATE_APPLY_OPERATION)
    }

    /// Returns the expected value when present and non-null.
    #[must_use]
    pub fn expected_value(&self) -> Option<&Value> {
        self.expected.as_ref().filter(|value| !value.is_null())
    }
}

/// Splits an operation into namespace and verb.
///
/// Returns `None` unless the identifier contains exactly one `.` separator.
#[must_use]
pub fn split_operation(operation: &str) -> Option<(&str, &str)> {
    let (namespace, verb) = operation.split_once('.')?;
    if verb.contains('.') {
        return None;
    }
    Some((namespace, verb))
}
