// crates/saltcheck-core/src/runtime/runner.rs
// ============================================================================
// Module: Saltcheck Test Runner
// Description: Validate, dispatch, extract, coerce, assert, and time one test.
// Purpose: Turn a test definition into a timed result record.
// Dependencies: crate::core, crate::interfaces, crate::audit, serde_json
// ============================================================================

//! ## Overview
//! The runner owns a [`TestValidator`] and borrows the operation invoker. Each
//! call to [`TestRunner::run`] is self-contained: invalid and skipped tests
//! short-circuit before dispatch, assertion mismatches become `Fail` statuses,
//! and only an invocation-layer error escapes as `Err`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use serde_json::Map;
use serde_json::Value;

use crate::audit::AuditSink;
use crate::core::Assertion;
use crate::core::InvocationDescription;
use crate::core::ResultRecord;
use crate::core::TestDefinition;
use crate::core::keys;
use crate::core::result::round_duration;
use crate::core::value::repr;
use crate::interfaces::Invocation;
use crate::interfaces::InvokeError;
use crate::interfaces::ModuleCatalog;
use crate::interfaces::OperationInvoker;
use crate::runtime::assertion::AssertionInput;
use crate::runtime::assertion::rule;
use crate::runtime::coercion::coerce;
use crate::runtime::validator::TestValidator;

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes individual test definitions.
pub struct TestRunner<'a> {
    /// Validation gate with memoized introspection.
    validator: TestValidator<'a>,
    /// Operation dispatcher.
    invoker: &'a dyn OperationInvoker,
    /// Diagnostic sink.
    audit: &'a dyn AuditSink,
}

impl<'a> TestRunner<'a> {
    /// Creates a runner.
    #[must_use]
    pub fn new(
        invoker: &'a dyn OperationInvoker,
        catalog: &'a dyn ModuleCatalog,
        audit: &'a dyn AuditSink,
    ) -> Self {
        Self {
            validator: TestValidator::new(catalog, audit),
            invoker,
            audit,
        }
    }

    /// Runs one test and returns its result record.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when the operation invocation itself fails.
    pub fn run(&mut self, test: &TestDefinition) -> Result<ResultRecord, InvokeError> {
        let started = Instant::now();
        if !self.validator.validate(test) {
            return Ok(ResultRecord::invalid(started.elapsed()));
        }
        if test.skip {
            return Ok(ResultRecord::skipped());
        }
        let assertion =
            if test.is_state_apply() { Some(Assertion::NotEmpty) } else { test.assertion_kind() };
        let (Some(operation), Some(assertion)) = (test.operation.as_deref(), assertion) else {
            return Ok(ResultRecord::invalid(started.elapsed()));
        };

        let call = Invocation::new(operation, test.args.clone(), merge_pillar(test));
        let returned = self.invoker.invoke(&call)?;
        let actual = match test.assertion_section.as_deref().filter(|section| !section.is_empty()) {
            Some(section) if returned.is_object() => {
                extract_section(&returned, section, &test.assertion_section_delimiter)
            }
            _ => returned,
        };
        let invocation = describe_invocation(operation, test);

        let expected = match test.expected_value() {
            Some(expected) if assertion.coerces_expected() => {
                Some(coerce(expected, &actual, self.audit))
            }
            other => other.cloned(),
        };
        let rule = rule(assertion);
        let status = rule.evaluate(&AssertionInput {
            expected: expected.as_ref().unwrap_or(&Value::Null),
            actual: &actual,
            print_result: test.print_result,
        });
        let description = rule.describe(expected.as_ref(), &actual);
        Ok(ResultRecord {
            duration: round_duration(started.elapsed()),
            invocation: Some(invocation),
            assertion: Some(description),
            status,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds keyword arguments with pillar data injected or stale pillar removed.
fn merge_pillar(test: &TestDefinition) -> Option<Map<String, Value>> {
    match test.pillar_data.as_ref().filter(|pillar| !pillar.is_empty()) {
        Some(pillar) => {
            let mut kwargs = test.kwargs.clone().unwrap_or_default();
            kwargs.insert(keys::PILLAR_KWARG.to_string(), Value::Object(pillar.clone()));
            Some(kwargs)
        }
        None => test.kwargs.clone().map(|mut kwargs| {
            kwargs.remove(keys::PILLAR_KWARG);
            kwargs
        }),
    }
}

/// Describes the dispatched operation as `<op> <args>[ => <section>]`.
fn describe_invocation(operation: &str, test: &TestDefinition) -> InvocationDescription {
    let args = test.args.as_ref().map_or_else(|| "None".to_string(), |args| {
        repr(&Value::Array(args.clone()))
    });
    let section =
        test.assertion_section.as_deref().map(|section| format!(" => {section}")).unwrap_or_default();
    InvocationDescription {
        text: format!("{operation} {args}{section}"),
        sectioned: test.assertion_section.is_some(),
    }
}

/// Walks a structured return along a delimited section path.
///
/// Mapping segments are looked up by key. List segments are read as an index
/// (negative counts from the end); non-numeric list segments search the
/// list's embedded mappings for the key. A missing path yields `false`.
#[must_use]
pub fn extract_section(value: &Value, section: &str, delimiter: &str) -> Value {
    let mut current = value;
    for segment in section.split(delimiter) {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => match segment.trim().parse::<i64>() {
                Ok(index) => list_index(items, index),
                Err(_) => items.iter().find_map(|item| item.as_object()?.get(segment)),
            },
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return Value::Bool(false),
        }
    }
    current.clone()
}

/// Indexes a list, counting negative indices from the end.
fn list_index(items: &[Value], index: i64) -> Option<&Value> {
    let len = i64::try_from(items.len()).ok()?;
    let position = if index < 0 { len + index } else { index };
    usize::try_from(position).ok().and_then(|position| items.get(position))
}
