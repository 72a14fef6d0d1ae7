// crates/saltcheck-core/src/runtime/validator.rs
// ============================================================================
// Module: Saltcheck Test Validator
// Description: Weighted scoring of test definition completeness.
// Purpose: Gate execution on a category-dependent required score.
// Dependencies: crate::core, crate::interfaces, crate::audit
// ============================================================================

//! ## Overview
//! Validation awards one point per satisfied [`Criterion`] and compares the
//! total against a threshold chosen by test category:
//!
//! | category | required |
//! |---|---|
//! | skipped | 0 |
//! | state-apply alias | 2 |
//! | `assertEmpty`, `assertNotEmpty`, `assertTrue`, `assertFalse` | 4 |
//! | everything else | 6 |
//!
//! Reasons for missing points are collected for diagnostics only; they do not
//! change the verdict. Namespace and verb lookups are memoized for the
//! lifetime of the validator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::audit::AuditSink;
use crate::audit::ValidationAuditEvent;
use crate::core::Assertion;
use crate::core::TestDefinition;
use crate::core::split_operation;
use crate::interfaces::ModuleCatalog;

// ============================================================================
// SECTION: Criteria
// ============================================================================

/// A single scoring predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    /// A well-formed `<namespace>.<verb>` operation is present.
    OperationPresent,
    /// The namespace is known to the module catalog.
    KnownNamespace,
    /// The verb is known within the namespace.
    KnownVerb,
    /// The assertion is one of the supported kinds.
    KnownAssertion,
    /// The `expected-return` key is present.
    ExpectedKeyPresent,
    /// The `expected-return` value is non-null.
    ExpectedValuePresent,
}

impl Criterion {
    /// Points awarded when the criterion holds.
    #[must_use]
    pub const fn points(self) -> u32 {
        1
    }
}

/// Criteria evaluated for every definition, in order.
pub const CRITERIA: [Criterion; 6] = [
    Criterion::OperationPresent,
    Criterion::KnownNamespace,
    Criterion::KnownVerb,
    Criterion::KnownAssertion,
    Criterion::ExpectedKeyPresent,
    Criterion::ExpectedValuePresent,
];

/// Result of evaluating one criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriterionOutcome {
    /// Criterion held; points awarded.
    Awarded,
    /// Criterion failed; carries the reason.
    Missed(String),
    /// Criterion was not evaluated (its prerequisite is missing).
    NotApplicable,
}

/// Score breakdown for one definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Points awarded.
    pub score: u32,
    /// Points required for this definition's category.
    pub required: u32,
    /// Outcome of each criterion, in [`CRITERIA`] order.
    pub outcomes: Vec<(Criterion, CriterionOutcome)>,
}

impl ValidationReport {
    /// Returns true when the score meets the required threshold.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.score >= self.required
    }

    /// Returns the reasons for every missed criterion.
    #[must_use]
    pub fn reasons(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                CriterionOutcome::Missed(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Returns the score a definition must reach to be valid.
#[must_use]
pub fn required_points(test: &TestDefinition) -> u32 {
    if test.skip {
        0
    } else if test.is_state_apply() {
        2
    } else if test.assertion_kind().is_some_and(Assertion::is_unary) {
        4
    } else {
        6
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Scores test definitions against the module catalog.
pub struct TestValidator<'a> {
    /// Namespace and verb introspection.
    catalog: &'a dyn ModuleCatalog,
    /// Diagnostic sink for failed validations.
    audit: &'a dyn AuditSink,
    /// Cached namespace listing.
    namespaces: Option<BTreeSet<String>>,
    /// Cached verb listings per namespace.
    verbs: HashMap<String, Vec<String>>,
}

impl<'a> TestValidator<'a> {
    /// Creates a validator backed by the given catalog.
    #[must_use]
    pub fn new(catalog: &'a dyn ModuleCatalog, audit: &'a dyn AuditSink) -> Self {
        Self {
            catalog,
            audit,
            namespaces: None,
            verbs: HashMap::new(),
        }
    }

    /// Returns true when the definition meets its required score.
    pub fn validate(&mut self, test: &TestDefinition) -> bool {
        let report = self.assess(test);
        if !report.is_valid() {
            self.audit.record_validation(&ValidationAuditEvent::new(
                test.name.clone(),
                report.score,
                report.required,
                report.reasons(),
            ));
        }
        report.is_valid()
    }

    /// Scores a definition and returns the full breakdown.
    pub fn assess(&mut self, test: &TestDefinition) -> ValidationReport {
        let mut outcomes = Vec::with_capacity(CRITERIA.len());
        let mut score = 0;
        for criterion in CRITERIA {
            let outcome = self.check(criterion, test);
            if outcome == CriterionOutcome::Awarded {
                score += criterion.points();
            }
            outcomes.push((criterion, outcome));
        }
        ValidationReport {
            score,
            required: required_points(test),
            outcomes,
        }
    }

    /// Evaluates one criterion.
    fn check(&mut self, criterion: Criterion, test: &TestDefinition) -> CriterionOutcome {
        let operation = test.operation.as_deref();
        let parts = operation.and_then(split_operation);
        match criterion {
            Criterion::OperationPresent => match (operation, parts) {
                (None, _) => CriterionOutcome::NotApplicable,
                (Some(_), Some(_)) => CriterionOutcome::Awarded,
                (Some(operation), None) => CriterionOutcome::Missed(format!(
                    "{operation} is not a valid module_and_function"
                )),
            },
            Criterion::KnownNamespace => match parts {
                None => CriterionOutcome::NotApplicable,
                Some((namespace, _)) if self.is_known_namespace(namespace) => {
                    CriterionOutcome::Awarded
                }
                Some((namespace, _)) => {
                    CriterionOutcome::Missed(format!("{namespace} is not a valid module"))
                }
            },
            Criterion::KnownVerb => match parts {
                None => CriterionOutcome::NotApplicable,
                Some((namespace, verb)) if self.is_known_verb(namespace, verb) => {
                    CriterionOutcome::Awarded
                }
                Some((_, verb)) => {
                    CriterionOutcome::Missed(format!("{verb} is not a valid function"))
                }
            },
            Criterion::KnownAssertion => {
                if test.assertion_kind().is_some() {
                    CriterionOutcome::Awarded
                } else {
                    CriterionOutcome::Missed(format!(
                        "{} is not in the assertions list",
                        test.assertion.as_deref().unwrap_or("None")
                    ))
                }
            }
            Criterion::ExpectedKeyPresent => {
                if test.expected.is_some() {
                    CriterionOutcome::Awarded
                } else {
                    CriterionOutcome::Missed("No expected return key".to_string())
                }
            }
            Criterion::ExpectedValuePresent => {
                if test.expected_value().is_some() {
                    CriterionOutcome::Awarded
                } else {
                    CriterionOutcome::Missed("expected-return does not have a value".to_string())
                }
            }
        }
    }

    /// Returns true when the namespace is listed by the catalog.
    fn is_known_namespace(&mut self, namespace: &str) -> bool {
        let catalog = self.catalog;
        self.namespaces.get_or_insert_with(|| catalog.list_modules()).contains(namespace)
    }

    /// Returns true when `namespace.verb` is listed by the catalog.
    ///
    /// A lookup failure is treated as an empty verb list.
    fn is_known_verb(&mut self, namespace: &str, verb: &str) -> bool {
        let catalog = self.catalog;
        let verbs = self
            .verbs
            .entry(namespace.to_string())
            .or_insert_with(|| catalog.list_functions(namespace).unwrap_or_default());
        let qualified = format!("{namespace}.{verb}");
        verbs.iter().any(|candidate| *candidate == qualified)
    }
}
