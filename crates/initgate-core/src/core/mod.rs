// crates/initgate-core/src/core/mod.rs
// ============================================================================
// Module: Init Gate Core Data Model
// Description: Field map, wire field names, and identity record types.
// Purpose: Define the immutable data model shared by the verification runtime.
// Dependencies: serde, serde_json, thiserror, uuid
// ============================================================================

//! ## Overview
//! The core data model for decoded payloads and extracted identities. All
//! types here are plain immutable data; evaluation lives in
//! [`crate::runtime`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod fields;
pub mod identity;
