// crates/initgate-core/src/core/fields.rs
// ============================================================================
// Module: Init Gate Field Model
// Description: Decoded field map, wire field names, and payload format tags.
// Purpose: Provide the canonical decoded representation of an init-data payload.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An init-data payload decodes into a flat map from field name to raw string
//! value. The map is ordered (byte-wise ascending by key) so that
//! canonicalization for signing is order-independent by construction. Values
//! stay raw strings at this layer; the embedded identity sub-document remains
//! an undecoded JSON string until extraction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Wire Field Names
// ============================================================================

/// Field carrying the platform-issued signature of all other fields.
pub const SIGNATURE_FIELD: &str = "hash";

/// Field carrying the payload issue time as a Unix-epoch second count.
pub const AUTH_DATE_FIELD: &str = "auth_date";

/// Field carrying the embedded identity sub-document as a raw JSON string.
pub const IDENTITY_FIELD: &str = "user";

/// Namespace prefix applied to identity fields projected as downstream
/// account attributes.
pub const ATTRIBUTE_NAMESPACE: &str = "telegram";

/// Attribute key a downstream account system uses as the external
/// correlation key. Equal to the projection of the identity `id` field under
/// [`ATTRIBUTE_NAMESPACE`].
pub const CORRELATION_ATTRIBUTE: &str = "telegram_id";

// ============================================================================
// SECTION: Field Map
// ============================================================================

/// Decoded init-data fields, keyed by field name.
///
/// # Invariants
/// - Keys are unique and iterate in byte-wise ascending order.
/// - Values are the raw percent-decoded strings supplied by the client.
pub type FieldMap = BTreeMap<String, String>;

// ============================================================================
// SECTION: Payload Format
// ============================================================================

/// Wire encoding recognized while decoding an init-data payload.
///
/// # Invariants
/// - Variants are stable for reporting and telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// `&`-joined `key=value` pairs with percent-encoded values.
    QueryString,
    /// A flat JSON object with string keys and string values.
    Json,
    /// Neither wire encoding matched; the payload decoded to no fields.
    Unrecognized,
}

impl PayloadFormat {
    /// Returns a stable label for the format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryString => "query_string",
            Self::Json => "json",
            Self::Unrecognized => "unrecognized",
        }
    }
}

// ============================================================================
// SECTION: Decoded Payload
// ============================================================================

/// Outcome of decoding an opaque init-data string.
///
/// # Invariants
/// - `fields` is empty when `format` is [`PayloadFormat::Unrecognized`].
/// - `dropped_pairs` counts query pairs discarded for lacking a `=`
///   separator; it is zero for JSON-decoded payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPayload {
    /// Decoded field map, including the signature field when present.
    pub fields: FieldMap,
    /// Wire encoding that produced the fields.
    pub format: PayloadFormat,
    /// Count of malformed query pairs silently dropped during decoding.
    pub dropped_pairs: usize,
}
