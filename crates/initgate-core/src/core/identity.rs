// crates/initgate-core/src/core/identity.rs
// ============================================================================
// Module: Init Gate Identity Model
// Description: Normalized identity record extracted from a verified payload.
// Purpose: Provide strict identity parsing with handle defaulting rules.
// Dependencies: serde, serde_json, thiserror, uuid
// ============================================================================

//! ## Overview
//! The identity sub-document travels inside the init-data payload as a raw
//! JSON string under the `user` field. Extraction parses it into an immutable
//! [`IdentityRecord`] in a single construction step: the numeric identifier
//! is mandatory, unknown fields are ignored, and a blank or absent display
//! handle is replaced with a freshly generated random one rather than
//! rejected. Structural signature or freshness failures are reported as data
//! elsewhere; identity-shape failures have no sensible in-band value and are
//! surfaced as [`IdentityError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::core::fields::FieldMap;
use crate::core::fields::IDENTITY_FIELD;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure to extract an identity record from a decoded payload.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The identity field is absent from the payload.
    #[error("identity field `{}` is absent from the payload", IDENTITY_FIELD)]
    MissingField,
    /// The identity field does not parse as the expected JSON shape.
    #[error("identity field does not parse as an identity object: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The identity field parses but is not a JSON object.
    #[error("identity field is not a JSON object")]
    NotAnObject,
    /// The identity object lacks its mandatory numeric identifier.
    #[error("identity object has no numeric identifier")]
    MissingId,
}

// ============================================================================
// SECTION: Wire Shape
// ============================================================================

/// Identity sub-document as it appears on the wire, before defaulting.
///
/// All fields are optional at this stage so that mandatory-field enforcement
/// and handle defaulting happen in one construction step rather than through
/// post-construction mutation. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct WireIdentity {
    /// Platform-assigned numeric identifier.
    id: Option<i64>,
    /// Display handle; may be absent or blank on the wire.
    username: Option<String>,
    /// Optional given name.
    first_name: Option<String>,
    /// Optional family name.
    last_name: Option<String>,
}

// ============================================================================
// SECTION: Identity Record
// ============================================================================

/// Normalized platform identity extracted from a verified payload.
///
/// # Invariants
/// - `id` is always present in a constructed record.
/// - `username` is never blank; a random handle is synthesized when the wire
///   value is absent or blank.
/// - Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityRecord {
    /// Platform-assigned numeric identifier; the external correlation key.
    pub id: i64,
    /// Display handle, synthesized when the wire value is absent or blank.
    pub username: String,
    /// Optional given name.
    pub first_name: Option<String>,
    /// Optional family name.
    pub last_name: Option<String>,
}

impl IdentityRecord {
    /// Extracts an identity record from the decoded field map.
    ///
    /// # Errors
    /// Returns [`IdentityError`] when the identity field is absent, fails to
    /// parse as an identity object, or lacks its numeric identifier.
    pub fn from_fields(fields: &FieldMap) -> Result<Self, IdentityError> {
        let raw = fields.get(IDENTITY_FIELD).ok_or(IdentityError::MissingField)?;
        let wire: WireIdentity = serde_json::from_str(raw)?;
        let id = wire.id.ok_or(IdentityError::MissingId)?;
        let username = match wire.username {
            Some(handle) if !handle.trim().is_empty() => handle,
            _ => synthesize_handle(),
        };
        Ok(Self {
            id,
            username,
            first_name: wire.first_name,
            last_name: wire.last_name,
        })
    }
}

/// Generates a random unique display handle for identities without one.
fn synthesize_handle() -> String {
    Uuid::new_v4().to_string()
}
