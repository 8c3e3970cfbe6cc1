// crates/initgate-core/src/runtime/decode.rs
// ============================================================================
// Module: Init Gate Payload Decoder
// Description: Best-effort decoding of the opaque init-data wire string.
// Purpose: Turn an untrusted init-data string into a decoded field map.
// Dependencies: crate::core, serde_json, url
// ============================================================================

//! ## Overview
//! Init-data arrives in one of two wire encodings: a query-style string of
//! `&`-joined `key=value` pairs with percent-encoded values, or a flat JSON
//! object with string keys and string values. Decoding is an explicit
//! two-strategy dispatch on the shape of the input, never
//! exception-as-control-flow, and it never fails outward: unrecognized input
//! degrades to an empty field map, which downstream yields a guaranteed
//! signature mismatch. Query pairs lacking a `=` separator are dropped and
//! counted so callers can detect degraded input instead of observing only a
//! mysterious signature failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::core::fields::DecodedPayload;
use crate::core::fields::FieldMap;
use crate::core::fields::PayloadFormat;

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes an opaque init-data string into a field map.
///
/// Query-shaped input is decoded as `&`-joined `key=value` pairs; anything
/// else is attempted as a flat JSON object of strings. Input matching neither
/// encoding yields an empty map tagged [`PayloadFormat::Unrecognized`].
#[must_use]
pub fn decode_init_data(raw: &str) -> DecodedPayload {
    if is_query_shaped(raw) {
        decode_query(raw)
    } else {
        decode_json(raw)
    }
}

/// Returns whether every byte of the input is legal in a URI.
///
/// The JSON wire encoding always contains at least one byte outside this set
/// (`{`, `"`), so the check doubles as the strategy dispatch.
fn is_query_shaped(raw: &str) -> bool {
    raw.bytes().all(is_uri_byte)
}

/// Returns whether a byte belongs to the RFC 3986 URI character set
/// (unreserved, reserved, or the percent sign).
const fn is_uri_byte(byte: u8) -> bool {
    matches!(byte,
        b'A'..=b'Z'
        | b'a'..=b'z'
        | b'0'..=b'9'
        | b'-' | b'.' | b'_' | b'~'
        | b'!' | b'$' | b'&' | b'\'' | b'(' | b')'
        | b'*' | b'+' | b',' | b';' | b'='
        | b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@'
        | b'%')
}

/// Decodes a query-shaped string into percent-decoded `key=value` fields.
///
/// Pairs without a `=` separator carry no usable field and are dropped;
/// empty segments (as produced by leading, trailing, or doubled `&`) are
/// skipped without counting. Duplicate keys keep the last value.
fn decode_query(raw: &str) -> DecodedPayload {
    let mut fields = FieldMap::new();
    let mut dropped_pairs = 0_usize;

    for pair in raw.split('&') {
        if pair.is_empty() {
            continue;
        }
        if !pair.contains('=') {
            dropped_pairs += 1;
            continue;
        }
        if let Some((key, value)) = form_urlencoded::parse(pair.as_bytes()).next() {
            fields.insert(key.into_owned(), value.into_owned());
        }
    }

    DecodedPayload {
        fields,
        format: PayloadFormat::QueryString,
        dropped_pairs,
    }
}

/// Decodes the full input as a flat JSON object of string fields.
fn decode_json(raw: &str) -> DecodedPayload {
    serde_json::from_str::<BTreeMap<String, String>>(raw).map_or_else(
        |_| DecodedPayload {
            fields: FieldMap::new(),
            format: PayloadFormat::Unrecognized,
            dropped_pairs: 0,
        },
        |fields| DecodedPayload {
            fields,
            format: PayloadFormat::Json,
            dropped_pairs: 0,
        },
    )
}
