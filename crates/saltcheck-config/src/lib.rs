// crates/saltcheck-config/src/lib.rs
// ============================================================================
// Module: Saltcheck Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for saltcheck.toml semantics.
// Dependencies: saltcheck-core, serde, toml
// ============================================================================

//! ## Overview
//! `saltcheck-config` defines the configuration model for saltcheck runs:
//! where test directories live, the default environment, the state trees per
//! environment, and where audit events go. Loading is strict and fails
//! closed on unknown keys or out-of-range values.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
