// crates/saltcheck-core/src/runtime/session.rs
// ============================================================================
// Module: Saltcheck Session
// Description: Batch, highstate, and single-test entry points.
// Purpose: Drive resolve, load, and run across states into one report.
// Dependencies: crate::core, crate::interfaces, crate::runtime, crate::audit
// ============================================================================

//! ## Overview
//! A [`Saltcheck`] session bundles the collaborators and exposes the three
//! entry points. States are processed one at a time, each producing its own
//! result group; the aggregated [`RunReport`] carries the return code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::TestResultAuditEvent;
use crate::core::ResultAggregator;
use crate::core::ResultRecord;
use crate::core::RunReport;
use crate::core::StateResults;
use crate::core::TestDefinition;
use crate::interfaces::CatalogError;
use crate::interfaces::ConfigSource;
use crate::interfaces::FileCache;
use crate::interfaces::InvokeError;
use crate::interfaces::ModuleCatalog;
use crate::interfaces::OperationInvoker;
use crate::interfaces::Renderer;
use crate::interfaces::StateCatalog;
use crate::runtime::loader::LoadError;
use crate::runtime::loader::TestSuiteLoader;
use crate::runtime::resolver::ResolveError;
use crate::runtime::resolver::TestFileResolver;
use crate::runtime::runner::TestRunner;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Configuration key naming the default environment.
pub const SALTENV_KEY: &str = "saltenv";
/// Environment used when neither the caller nor configuration names one.
pub const DEFAULT_SALTENV: &str = "base";
/// Name given to ad-hoc tests passed to [`Saltcheck::run_test`].
pub const AD_HOC_TEST_NAME: &str = "run_test";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Test file resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    /// Test suite loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// An operation invocation failed.
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    /// The top file could not be read.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// An ad-hoc test was not a non-empty mapping.
    #[error("Test argument must be a dictionary")]
    NotADictionary,
}

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Collaborators a session dispatches to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Operation dispatcher.
    pub invoker: &'a dyn OperationInvoker,
    /// Namespace and verb introspection.
    pub modules: &'a dyn ModuleCatalog,
    /// State enumeration and plan compilation.
    pub states: &'a dyn StateCatalog,
    /// Remote directory cache.
    pub cache: &'a dyn FileCache,
    /// Test file renderer.
    pub renderer: &'a dyn Renderer,
    /// Configuration lookup.
    pub config: &'a dyn ConfigSource,
    /// Diagnostic sink.
    pub audit: &'a dyn AuditSink,
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Saltcheck entry points over a fixed set of collaborators.
pub struct Saltcheck<'a> {
    /// Collaborators used by every run.
    collaborators: Collaborators<'a>,
}

impl<'a> Saltcheck<'a> {
    /// Creates a session.
    #[must_use]
    pub const fn new(collaborators: Collaborators<'a>) -> Self {
        Self {
            collaborators,
        }
    }

    /// Resolves the environment: explicit, then configured, then `base`.
    #[must_use]
    pub fn saltenv(&self, saltenv: Option<&str>) -> String {
        if let Some(saltenv) = saltenv.filter(|saltenv| !saltenv.is_empty()) {
            return saltenv.to_string();
        }
        match self.collaborators.config.get_config(SALTENV_KEY, Value::Null) {
            Value::String(saltenv) if !saltenv.is_empty() => saltenv,
            _ => DEFAULT_SALTENV.to_string(),
        }
    }

    /// Runs the tests for a comma-separated list of states.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when resolution, loading, or dispatch fails.
    pub fn run_state_tests(
        &self,
        states: &str,
        saltenv: Option<&str>,
        check_all: bool,
    ) -> Result<RunReport, SessionError> {
        let deps = self.collaborators;
        let saltenv = self.saltenv(saltenv);
        let resolver =
            TestFileResolver::new(deps.states, deps.cache, deps.audit, deps.config, saltenv);
        let mut loader = TestSuiteLoader::new(deps.renderer);
        let mut runner = TestRunner::new(deps.invoker, deps.modules, deps.audit);
        let mut aggregator = ResultAggregator::new();
        for state in split_states(states) {
            loader.add_files(resolver.resolve(state, check_all)?);
            let suite = loader.load()?;
            let mut results = StateResults::new();
            for (name, test) in &suite {
                let record = runner.run(test)?;
                deps.audit.record_result(&TestResultAuditEvent::new(
                    state,
                    name.clone(),
                    record.status.to_string(),
                    record.duration,
                ));
                results.insert(name.clone(), record);
            }
            aggregator.record_state(state, results);
        }
        Ok(aggregator.finish())
    }

    /// Runs the tests for every state assigned through the top file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the top file cannot be read or a run fails.
    pub fn run_highstate_tests(&self, saltenv: Option<&str>) -> Result<RunReport, SessionError> {
        let saltenv = self.saltenv(saltenv);
        let states = self.collaborators.states.show_top(&saltenv)?.join(",");
        self.run_state_tests(&states, Some(&saltenv), false)
    }

    /// Runs one ad-hoc test definition.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotADictionary`] unless `test` is a non-empty
    /// mapping, or [`SessionError::Invoke`] when dispatch fails.
    pub fn run_test(&self, test: &Value) -> Result<ResultRecord, SessionError> {
        if !test.as_object().is_some_and(|fields| !fields.is_empty()) {
            return Err(SessionError::NotADictionary);
        }
        let deps = self.collaborators;
        let definition = TestDefinition::from_value(AD_HOC_TEST_NAME, test);
        let mut runner = TestRunner::new(deps.invoker, deps.modules, deps.audit);
        Ok(runner.run(&definition)?)
    }
}

/// Splits a comma-separated state list, trimming blanks.
fn split_states(states: &str) -> impl Iterator<Item = &str> {
    states.split(',').map(str::trim).filter(|state| !state.is_empty())
}
