// crates/initgate-core/src/lib.rs
// ============================================================================
// Module: Init Gate Core
// Description: Verification engine for platform-signed init-data payloads.
// Purpose: Verify payload signatures and extract normalized identity records.
// Dependencies: hex, hmac, serde, serde_json, sha2, subtle, thiserror, time, url, uuid
// ============================================================================

//! ## Overview
//! This crate verifies that a signed init-data payload was genuinely issued
//! by the messaging platform and has not been tampered with or replayed
//! beyond a freshness window, then extracts a typed identity record from it.
//! The pipeline is pure, synchronous, and single-pass: decode, canonicalize,
//! two-stage HMAC-SHA-256, constant-time comparison, freshness check, lazy
//! identity extraction.
//! Invariants:
//! - Structural outcomes (signature, freshness, degraded decode) are data on
//!   the result, never errors; only identity-shape failures error.
//! - No shared mutable state; calls are trivially safe to run concurrently.
//!
//! Security posture: init-data is untrusted input; signature comparison is
//! constant-time and decoding fails closed to a guaranteed mismatch.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::fields::ATTRIBUTE_NAMESPACE;
pub use crate::core::fields::AUTH_DATE_FIELD;
pub use crate::core::fields::CORRELATION_ATTRIBUTE;
pub use crate::core::fields::DecodedPayload;
pub use crate::core::fields::FieldMap;
pub use crate::core::fields::IDENTITY_FIELD;
pub use crate::core::fields::PayloadFormat;
pub use crate::core::fields::SIGNATURE_FIELD;
pub use crate::core::identity::IdentityError;
pub use crate::core::identity::IdentityRecord;
pub use crate::runtime::decode::decode_init_data;
pub use crate::runtime::signature::check_string;
pub use crate::runtime::signature::derive_signing_key;
pub use crate::runtime::signature::expected_signature;
pub use crate::runtime::signature::signatures_match;
pub use crate::runtime::verify::Verification;
pub use crate::runtime::verify::VerifyParams;
pub use crate::runtime::verify::verify;
pub use crate::runtime::verify::verify_at;
