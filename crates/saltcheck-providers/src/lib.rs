// crates/saltcheck-providers/src/lib.rs
// ============================================================================
// Module: Saltcheck Providers
// Description: Local collaborators for the saltcheck engine.
// Purpose: Run saltcheck against local state trees without a remote system.
// Dependencies: saltcheck-core, serde_yaml, walkdir
// ============================================================================

//! ## Overview
//! This crate ships concrete implementations of the engine's collaborator
//! traits: an execution module registry with built-in modules, a file-root
//! backed directory cache, an SLS state catalog, and a YAML test renderer.
//! All file access is bounded by size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cache;
pub mod modules;
pub mod registry;
pub mod render;
pub mod source;
pub mod states;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::FileRootCache;
pub use modules::environ::EnvironModule;
pub use modules::environ::EnvironModuleConfig;
pub use modules::file::FileModule;
pub use modules::file::FileModuleConfig;
pub use modules::saltcheck::StateApplyModule;
pub use modules::test::TestModule;
pub use registry::ExecutionModule;
pub use registry::ModuleError;
pub use registry::ModuleRegistry;
pub use registry::RegistryError;
pub use render::YamlTestRenderer;
pub use source::DEFAULT_MAX_FILE_BYTES;
pub use source::SourceError;
pub use states::SlsStateCatalog;
