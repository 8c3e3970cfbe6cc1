// crates/initgate-core/src/runtime/verify.rs
// ============================================================================
// Module: Init Gate Verification Pipeline
// Description: Single-pass signature and freshness verification over init-data.
// Purpose: Produce a total verification result for one untrusted payload.
// Dependencies: crate::core, crate::runtime, serde, serde_json, time
// ============================================================================

//! ## Overview
//! Verification is a pure, single-pass pipeline: decode the payload, remove
//! the supplied signature, compute the expected signature over the remaining
//! fields, compare in constant time, then check the `auth_date` freshness
//! window when enforcement is on and the signature matched. Structural
//! outcomes (signature mismatch, staleness, degraded decode) are reported as
//! data on the result, never as errors; only identity-shape failures error,
//! and only when identity access is attempted. Callers must gate all
//! downstream logic on `signature_valid` first; `freshness_valid` carries
//! meaning only under a valid signature.
//!
//! The pipeline never reads wall-clock time itself; [`verify_at`] takes the
//! current Unix time explicitly so results replay deterministically, and
//! [`verify`] reads the clock once at the boundary for callers that do not
//! need replayability.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::core::fields::ATTRIBUTE_NAMESPACE;
use crate::core::fields::AUTH_DATE_FIELD;
use crate::core::fields::FieldMap;
use crate::core::fields::IDENTITY_FIELD;
use crate::core::fields::PayloadFormat;
use crate::core::fields::SIGNATURE_FIELD;
use crate::core::identity::IdentityError;
use crate::core::identity::IdentityRecord;
use crate::runtime::decode::decode_init_data;
use crate::runtime::signature::expected_signature;
use crate::runtime::signature::signatures_match;

// ============================================================================
// SECTION: Verification Parameters
// ============================================================================

/// Caller-supplied parameters for one verification call.
///
/// # Invariants
/// - Immutable for the duration of the call.
/// - `freshness_valid` on the result is trivially `true` when
///   `check_freshness` is `false`.
#[derive(Debug, Clone, Copy)]
pub struct VerifyParams<'a> {
    /// Raw init-data string as received from the client.
    pub init_data: &'a str,
    /// Per-tenant shared secret (bot token equivalent).
    pub shared_secret: &'a str,
    /// Whether to enforce the freshness window on `auth_date`.
    pub check_freshness: bool,
    /// Maximum allowed payload age in seconds when enforcement is on.
    pub max_age_seconds: i64,
}

impl<'a> VerifyParams<'a> {
    /// Creates parameters with explicit freshness enforcement.
    #[must_use]
    pub const fn new(
        init_data: &'a str,
        shared_secret: &'a str,
        check_freshness: bool,
        max_age_seconds: i64,
    ) -> Self {
        Self {
            init_data,
            shared_secret,
            check_freshness,
            max_age_seconds,
        }
    }

    /// Creates parameters from a configured freshness window, enforcing
    /// freshness iff the window is a positive number of seconds.
    #[must_use]
    pub const fn with_window(
        init_data: &'a str,
        shared_secret: &'a str,
        max_age_seconds: i64,
    ) -> Self {
        Self {
            init_data,
            shared_secret,
            check_freshness: max_age_seconds > 0,
            max_age_seconds,
        }
    }
}

// ============================================================================
// SECTION: Verification Result
// ============================================================================

/// Outcome of verifying one init-data payload.
///
/// # Invariants
/// - `fields` holds the full decoded field set with the signature field
///   restored under its original key when it was present.
/// - `freshness_valid` is meaningful only when `signature_valid` is `true`;
///   it is reported `true` by convention otherwise.
/// - Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Full decoded field map, signature field included.
    pub fields: FieldMap,
    /// Wire encoding recognized during decoding.
    pub format: PayloadFormat,
    /// Count of malformed query pairs dropped during decoding.
    pub dropped_pairs: usize,
    /// Whether the supplied signature matches the expected signature.
    pub signature_valid: bool,
    /// Whether the payload is within the freshness window; meaningful only
    /// when `signature_valid` is `true`.
    pub freshness_valid: bool,
}

impl Verification {
    /// Extracts the normalized identity record from the verified fields.
    ///
    /// Extraction is independent of the signature and freshness outcomes;
    /// callers deciding acceptance must gate on `signature_valid` and
    /// `freshness_valid` themselves.
    ///
    /// # Errors
    /// Returns [`IdentityError`] when the identity field is absent,
    /// unparsable, or lacks its mandatory numeric identifier.
    pub fn identity(&self) -> Result<IdentityRecord, IdentityError> {
        IdentityRecord::from_fields(&self.fields)
    }

    /// Projects the raw identity fields as namespaced account attributes.
    ///
    /// Each scalar field of the identity object becomes a
    /// `telegram_<field>` attribute with its value rendered as a string
    /// (`telegram_id` doubling as the downstream correlation key). Null and
    /// non-scalar values are skipped.
    ///
    /// # Errors
    /// Returns [`IdentityError`] when the identity field is absent, fails to
    /// parse as JSON, or is not a JSON object.
    pub fn namespaced_attributes(&self) -> Result<BTreeMap<String, String>, IdentityError> {
        let raw = self
            .fields
            .get(IDENTITY_FIELD)
            .ok_or(IdentityError::MissingField)?;
        let parsed: Value = serde_json::from_str(raw)?;
        let Value::Object(object) = parsed else {
            return Err(IdentityError::NotAnObject);
        };

        let mut attributes = BTreeMap::new();
        for (key, value) in object {
            let rendered = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => continue,
            };
            attributes.insert(format!("{ATTRIBUTE_NAMESPACE}_{key}"), rendered);
        }
        Ok(attributes)
    }
}

// ============================================================================
// SECTION: Verification Pipeline
// ============================================================================

/// Verifies an init-data payload against the current wall-clock time.
///
/// Reads the clock once; use [`verify_at`] for deterministic replay.
#[must_use]
pub fn verify(params: &VerifyParams<'_>) -> Verification {
    verify_at(params, OffsetDateTime::now_utc().unix_timestamp())
}

/// Verifies an init-data payload against an explicit current Unix time.
#[must_use]
pub fn verify_at(params: &VerifyParams<'_>, now_unix: i64) -> Verification {
    let decoded = decode_init_data(params.init_data);
    let mut fields = decoded.fields;

    // A missing signature compares as empty and fails uniformly; no special
    // error path.
    let supplied = fields.remove(SIGNATURE_FIELD);
    let expected = expected_signature(&fields, params.shared_secret);
    let signature_valid = signatures_match(supplied.as_deref().unwrap_or_default(), &expected);

    // Valid-by-convention under an invalid signature, to keep the result
    // shape total.
    let freshness_valid = if signature_valid {
        is_fresh(&fields, params, now_unix)
    } else {
        true
    };

    if let Some(signature) = supplied {
        fields.insert(SIGNATURE_FIELD.to_string(), signature);
    }

    Verification {
        fields,
        format: decoded.format,
        dropped_pairs: decoded.dropped_pairs,
        signature_valid,
        freshness_valid,
    }
}

/// Checks the `auth_date` field against the configured freshness window.
///
/// Trivially fresh when enforcement is off. A missing or unparsable
/// `auth_date` fails closed, as does an age too large to represent.
/// Future-dated payloads are accepted; the window bounds age from above
/// only.
fn is_fresh(fields: &FieldMap, params: &VerifyParams<'_>, now_unix: i64) -> bool {
    if !params.check_freshness {
        return true;
    }
    fields
        .get(AUTH_DATE_FIELD)
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|issued| now_unix.checked_sub(issued))
        .is_some_and(|age| age <= params.max_age_seconds)
}
