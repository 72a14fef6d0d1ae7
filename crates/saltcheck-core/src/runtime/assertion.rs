// crates/saltcheck-core/src/runtime/assertion.rs
// ============================================================================
// Module: Saltcheck Assertion Library
// Description: Table-driven evaluation of the twelve assertion kinds.
// Purpose: Convert expected/actual pairs into pass or fail statuses.
// Dependencies: crate::core, serde_json
// ============================================================================

//! ## Overview
//! Each assertion maps to one [`AssertionRule`] holding its report symbol and
//! a pure evaluation function. Evaluation never panics: incomparable values
//! and unsupported membership checks become `Fail` statuses carrying the
//! reason, the same as an ordinary mismatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use serde_json::Value;

use crate::core::Assertion;
use crate::core::TestStatus;
use crate::core::ValueKind;
use crate::core::value::contains;
use crate::core::value::is_truthy;
use crate::core::value::loose_cmp;
use crate::core::value::loose_eq;
use crate::core::value::render;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Inputs to a single assertion evaluation.
#[derive(Debug, Clone, Copy)]
pub struct AssertionInput<'a> {
    /// Expected value (null when absent).
    pub expected: &'a Value,
    /// Actual (possibly section-extracted) return value.
    pub actual: &'a Value,
    /// Whether failure messages include the compared values.
    pub print_result: bool,
}

/// Evaluation function signature shared by every rule.
type Evaluate = fn(&AssertionInput<'_>) -> TestStatus;

/// Table entry describing one assertion.
#[derive(Debug, Clone, Copy)]
pub struct AssertionRule {
    /// Assertion this rule evaluates.
    pub assertion: Assertion,
    /// Operator symbol or phrase used in the assertion description.
    pub symbol: &'static str,
    /// Evaluation function.
    evaluate: Evaluate,
}

impl AssertionRule {
    /// Evaluates the rule.
    #[must_use]
    pub fn evaluate(&self, input: &AssertionInput<'_>) -> TestStatus {
        (self.evaluate)(input)
    }

    /// Separator placed around the symbol in the assertion description.
    #[must_use]
    pub const fn separator(&self) -> &'static str {
        match self.assertion {
            Assertion::In | Assertion::NotIn => "\n\n",
            _ => " ",
        }
    }

    /// Builds the human-readable assertion description.
    ///
    /// The expected value is omitted when absent or null.
    #[must_use]
    pub fn describe(&self, expected: Option<&Value>, actual: &Value) -> String {
        let separator = self.separator();
        let prefix = match expected {
            None | Some(Value::Null) => String::new(),
            Some(value) => format!("{}{separator}", render(value)),
        };
        format!("{prefix}{}{separator}{}", self.symbol, render(actual))
    }
}

// ============================================================================
// SECTION: Rule Table
// ============================================================================

/// Assertion rules, indexed by [`Assertion`] discriminant.
static RULES: [AssertionRule; 12] = [
    AssertionRule {
        assertion: Assertion::Equal,
        symbol: "==",
        evaluate: assert_equal,
    },
    AssertionRule {
        assertion: Assertion::NotEqual,
        symbol: "!=",
        evaluate: assert_not_equal,
    },
    AssertionRule {
        assertion: Assertion::True,
        symbol: "True is",
        evaluate: assert_true,
    },
    AssertionRule {
        assertion: Assertion::False,
        symbol: "False is",
        evaluate: assert_false,
    },
    AssertionRule {
        assertion: Assertion::In,
        symbol: "IS IN",
        evaluate: assert_in,
    },
    AssertionRule {
        assertion: Assertion::NotIn,
        symbol: "IS NOT IN",
        evaluate: assert_not_in,
    },
    AssertionRule {
        assertion: Assertion::Greater,
        symbol: ">",
        evaluate: assert_greater,
    },
    AssertionRule {
        assertion: Assertion::GreaterEqual,
        symbol: ">=",
        evaluate: assert_greater_equal,
    },
    AssertionRule {
        assertion: Assertion::Less,
        symbol: "<",
        evaluate: assert_less,
    },
    AssertionRule {
        assertion: Assertion::LessEqual,
        symbol: "<=",
        evaluate: assert_less_equal,
    },
    AssertionRule {
        assertion: Assertion::Empty,
        symbol: "IS EMPTY:",
        evaluate: assert_empty,
    },
    AssertionRule {
        assertion: Assertion::NotEmpty,
        symbol: "IS NOT EMPTY:",
        evaluate: assert_not_empty,
    },
];

/// Returns the rule for an assertion.
#[must_use]
pub fn rule(assertion: Assertion) -> &'static AssertionRule {
    &RULES[assertion as usize]
}

/// Evaluates an assertion against expected and actual values.
#[must_use]
pub fn evaluate(
    assertion: Assertion,
    expected: Option<&Value>,
    actual: &Value,
    print_result: bool,
) -> TestStatus {
    let input = AssertionInput {
        expected: expected.unwrap_or(&Value::Null),
        actual,
        print_result,
    };
    rule(assertion).evaluate(&input)
}

// ============================================================================
// SECTION: Evaluation Functions
// ============================================================================

/// Builds a failure status.
fn fail(message: impl Into<String>) -> TestStatus {
    TestStatus::Fail(message.into())
}

/// `expected == actual`.
fn assert_equal(input: &AssertionInput<'_>) -> TestStatus {
    if loose_eq(input.expected, input.actual) {
        TestStatus::Pass
    } else if input.print_result {
        fail(format!("{} is not equal to {}", render(input.expected), render(input.actual)))
    } else {
        fail("Result is not equal")
    }
}

/// `expected != actual`.
fn assert_not_equal(input: &AssertionInput<'_>) -> TestStatus {
    if !loose_eq(input.expected, input.actual) {
        TestStatus::Pass
    } else if input.print_result {
        fail(format!("{} is equal to {}", render(input.expected), render(input.actual)))
    } else {
        fail("Result is equal")
    }
}

/// `actual` is exactly boolean true.
fn assert_true(input: &AssertionInput<'_>) -> TestStatus {
    if matches!(input.actual, Value::Bool(true)) {
        TestStatus::Pass
    } else {
        fail(format!("{} not True", render(input.actual)))
    }
}

/// `actual` is exactly boolean false; strings are first read as non-empty.
fn assert_false(input: &AssertionInput<'_>) -> TestStatus {
    let converted;
    let actual = match input.actual {
        Value::String(text) => {
            converted = Value::Bool(!text.is_empty());
            &converted
        }
        other => other,
    };
    if matches!(actual, Value::Bool(false)) {
        TestStatus::Pass
    } else {
        fail(format!("{} not False", render(actual)))
    }
}

/// `expected` is a member of `actual`.
fn assert_in(input: &AssertionInput<'_>) -> TestStatus {
    match contains(input.actual, input.expected) {
        Ok(true) => TestStatus::Pass,
        Ok(false) if input.print_result => {
            fail(format!("{} not found in {}", render(input.expected), render(input.actual)))
        }
        Ok(false) => fail("Result not found"),
        Err(message) => fail(message),
    }
}

/// `expected` is not a member of `actual`.
fn assert_not_in(input: &AssertionInput<'_>) -> TestStatus {
    match contains(input.actual, input.expected) {
        Ok(false) => TestStatus::Pass,
        Ok(true) if input.print_result => {
            fail(format!("{} was found in {}", render(input.expected), render(input.actual)))
        }
        Ok(true) => fail("Result was found"),
        Err(message) => fail(message),
    }
}

/// Evaluates `expected <symbol> actual` for the ordering assertions.
fn compare_ordered(
    input: &AssertionInput<'_>,
    symbol: &str,
    accept: fn(Ordering) -> bool,
) -> TestStatus {
    match loose_cmp(input.expected, input.actual) {
        Some(ordering) if accept(ordering) => TestStatus::Pass,
        Some(_) => fail(format!("{} not False", render(input.actual))),
        None => fail(format!(
            "'{symbol}' not supported between instances of '{}' and '{}'",
            ValueKind::of(input.expected).as_str(),
            ValueKind::of(input.actual).as_str()
        )),
    }
}

/// `expected > actual`.
fn assert_greater(input: &AssertionInput<'_>) -> TestStatus {
    compare_ordered(input, ">", Ordering::is_gt)
}

/// `expected >= actual`.
fn assert_greater_equal(input: &AssertionInput<'_>) -> TestStatus {
    compare_ordered(input, ">=", Ordering::is_ge)
}

/// `expected < actual`.
fn assert_less(input: &AssertionInput<'_>) -> TestStatus {
    compare_ordered(input, "<", Ordering::is_lt)
}

/// `expected <= actual`.
fn assert_less_equal(input: &AssertionInput<'_>) -> TestStatus {
    compare_ordered(input, "<=", Ordering::is_le)
}

/// `actual` is falsy.
fn assert_empty(input: &AssertionInput<'_>) -> TestStatus {
    if is_truthy(input.actual) {
        fail(format!("{} is not empty", render(input.actual)))
    } else {
        TestStatus::Pass
    }
}

/// `actual` is truthy.
fn assert_not_empty(input: &AssertionInput<'_>) -> TestStatus {
    if is_truthy(input.actual) { TestStatus::Pass } else { fail("value is empty") }
}
