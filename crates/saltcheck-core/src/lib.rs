// crates/saltcheck-core/src/lib.rs
// ============================================================================
// Module: Saltcheck Core Library
// Description: Public API surface for the saltcheck test engine.
// Purpose: Expose core types, collaborator interfaces, and runtime stages.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Saltcheck discovers declarative tests tied to configuration states,
//! validates and runs them against a managed system, and aggregates the
//! outcomes into a report. The engine reaches the managed system only through
//! the traits in [`interfaces`], so every collaborator is substitutable.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use interfaces::CacheError;
pub use interfaces::CallShape;
pub use interfaces::CatalogError;
pub use interfaces::ConfigSource;
pub use interfaces::FileCache;
pub use interfaces::Invocation;
pub use interfaces::InvokeError;
pub use interfaces::ModuleCatalog;
pub use interfaces::OperationInvoker;
pub use interfaces::RenderError;
pub use interfaces::Renderer;
pub use interfaces::StateCatalog;
pub use runtime::Collaborators;
pub use runtime::LoadError;
pub use runtime::ResolveError;
pub use runtime::Saltcheck;
pub use runtime::SessionError;
pub use runtime::TestFileResolver;
pub use runtime::TestRunner;
pub use runtime::TestSuite;
pub use runtime::TestSuiteLoader;
pub use runtime::TestValidator;
