// crates/initgate-core/src/runtime/signature.rs
// ============================================================================
// Module: Init Gate Signature Computation
// Description: Canonical check-string derivation and two-stage keyed hashing.
// Purpose: Compute and compare the platform signature over decoded fields.
// Dependencies: crate::core, hex, hmac, sha2, subtle
// ============================================================================

//! ## Overview
//! The platform signs init-data with a two-stage HMAC-SHA-256: the shared
//! secret is first keyed under the fixed ASCII literal `WebAppData` to derive
//! a signing key, which then keys the hash over the canonical check-string of
//! all non-signature fields. The check-string joins `key=value` lines in
//! byte-wise ascending key order with single newlines and no trailing
//! newline. Signatures are rendered as lowercase hexadecimal and compared in
//! constant time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::core::fields::FieldMap;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed outer key used to derive the signing key from the shared secret.
const DERIVATION_KEY: &[u8] = b"WebAppData";

// ============================================================================
// SECTION: Canonicalization
// ============================================================================

/// Builds the canonical check-string over the given fields.
///
/// The field map must already exclude the signature field. Entries are
/// emitted as `key=value` lines in byte-wise ascending key order (the map's
/// iteration order), joined by single newlines with no trailing newline.
#[must_use]
pub fn check_string(fields: &FieldMap) -> String {
    let mut lines = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        lines.push(format!("{key}={value}"));
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Keyed Hashing
// ============================================================================

/// Derives the signing key from the shared secret.
///
/// Stage one of the scheme: HMAC-SHA-256 keyed by the fixed `WebAppData`
/// literal over the UTF-8 bytes of the shared secret.
#[must_use]
pub fn derive_signing_key(shared_secret: &str) -> [u8; 32] {
    hmac_sha256(DERIVATION_KEY, shared_secret.as_bytes())
}

/// Computes the expected signature for the given non-signature fields.
///
/// Stage two of the scheme: HMAC-SHA-256 over the canonical check-string
/// keyed by the derived signing key, rendered as lowercase hexadecimal.
#[must_use]
pub fn expected_signature(fields: &FieldMap, shared_secret: &str) -> String {
    let signing_key = derive_signing_key(shared_secret);
    let digest = hmac_sha256(&signing_key, check_string(fields).as_bytes());
    hex::encode(digest)
}

/// HMAC-SHA-256 of `message` under `key`.
fn hmac_sha256(key: &[u8], message: &[u8]) -> [u8; 32] {
    match Hmac::<Sha256>::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(message);
            mac.finalize().into_bytes().into()
        }
        // HMAC-SHA-256 accepts keys of any length; this branch is unreachable.
        Err(_) => [0_u8; 32],
    }
}

// ============================================================================
// SECTION: Constant-Time Comparisons
// ============================================================================

/// Compares two signature strings in constant time.
#[must_use]
pub fn signatures_match(supplied: &str, expected: &str) -> bool {
    supplied.as_bytes().ct_eq(expected.as_bytes()).into()
}
