// crates/saltcheck-core/src/core/mod.rs
// ============================================================================
// Module: Saltcheck Core Types
// Description: Test definitions, values, result records, and run summaries.
// Purpose: Provide the data model shared by the runtime and collaborators.
// Dependencies: indexmap, serde, serde_json
// ============================================================================

//! ## Overview
//! Core types are pure data: no collaborator calls and no I/O. The runtime
//! builds on them; collaborator crates construct and consume them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod definition;
pub mod result;
pub mod summary;
pub mod value;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use definition::Assertion;
pub use definition::DEFAULT_SECTION_DELIMITER;
pub use definition::DEFAULT_TEST_LOCATION;
pub use definition::STATE_APPLY_OPERATION;
pub use definition::TEST_FILE_EXTENSION;
pub use definition::TestDefinition;
pub use definition::UnknownAssertion;
pub use definition::keys;
pub use definition::split_operation;
pub use result::InvocationDescription;
pub use result::ResultRecord;
pub use result::TestStatus;
pub use summary::ResultAggregator;
pub use summary::RunReport;
pub use summary::RunSummary;
pub use summary::StateResults;
pub use value::ValueKind;
