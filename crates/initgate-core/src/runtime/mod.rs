// crates/initgate-core/src/runtime/mod.rs
// ============================================================================
// Module: Init Gate Runtime
// Description: Decoding, signature computation, and verification pipeline.
// Purpose: Evaluate untrusted init-data payloads against the core data model.
// Dependencies: crate::core, hex, hmac, serde_json, sha2, subtle, time, url
// ============================================================================

//! ## Overview
//! The runtime evaluates one payload per call: decode, canonicalize, compute
//! the two-stage keyed hash, compare in constant time, check freshness. All
//! functions are pure and perform no I/O; wall-clock time enters only through
//! the [`verify`](crate::runtime::verify::verify) boundary convenience.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod decode;
pub mod signature;
pub mod verify;
