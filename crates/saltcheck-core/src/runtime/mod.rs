// crates/saltcheck-core/src/runtime/mod.rs
// ============================================================================
// Module: Saltcheck Runtime
// Description: Assertion, coercion, validation, execution, and discovery.
// Purpose: Turn state names into evaluated, timed test results.
// Dependencies: crate::core, crate::interfaces, crate::audit
// ============================================================================

//! ## Overview
//! Data flows leaf-first: state name, then [`TestFileResolver`], then
//! [`TestSuiteLoader`], then [`TestValidator`] and [`TestRunner`] per test.
//! [`Saltcheck`] wires the stages together for batch runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertion;
pub mod coercion;
pub mod loader;
pub mod resolver;
pub mod runner;
pub mod session;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertion::AssertionInput;
pub use assertion::AssertionRule;
pub use coercion::CoercionError;
pub use coercion::cast;
pub use coercion::coerce;
pub use loader::LoadError;
pub use loader::TestSuite;
pub use loader::TestSuiteLoader;
pub use resolver::REMOTE_SCHEME;
pub use resolver::ResolveError;
pub use resolver::SLS_KEY;
pub use resolver::TEST_LOCATION_KEY;
pub use resolver::TestFileResolver;
pub use runner::TestRunner;
pub use runner::extract_section;
pub use session::Collaborators;
pub use session::DEFAULT_SALTENV;
pub use session::SALTENV_KEY;
pub use session::Saltcheck;
pub use session::SessionError;
pub use validator::CRITERIA;
pub use validator::Criterion;
pub use validator::CriterionOutcome;
pub use validator::TestValidator;
pub use validator::ValidationReport;
pub use validator::required_points;
