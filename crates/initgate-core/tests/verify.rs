// crates/initgate-core/tests/verify.rs
// ============================================================================
// Module: Verification Pipeline Tests
// Description: Verifies signature comparison, freshness, and result shape.
// ============================================================================
//! ## Overview
//! Ensures the two-stage keyed hash matches correctly signed payloads,
//! rejects tampered ones, enforces the freshness window boundary exactly,
//! restores the signature field into the returned map, and reports freshness
//! valid-by-convention under an invalid signature.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use initgate_core::CORRELATION_ATTRIBUTE;
use initgate_core::FieldMap;
use initgate_core::PayloadFormat;
use initgate_core::SIGNATURE_FIELD;
use initgate_core::VerifyParams;
use initgate_core::check_string;
use initgate_core::expected_signature;
use initgate_core::verify_at;
use url::form_urlencoded::Serializer;

/// Fixed "current time" used across freshness tests.
const NOW: i64 = 1_700_000_000;

/// Builds a correctly signed query-string payload from the given fields.
fn signed_payload(fields: &[(&str, &str)], secret: &str) -> String {
    let map: FieldMap = fields
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    let signature = expected_signature(&map, secret);

    let mut serializer = Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, value);
    }
    serializer.append_pair(SIGNATURE_FIELD, &signature);
    serializer.finish()
}

#[test]
fn correctly_signed_payload_verifies_end_to_end() {
    let raw = signed_payload(
        &[
            ("auth_date", "1700000000"),
            ("query_id", "AAA"),
            ("user", "{\"id\":7,\"username\":\"bob\"}"),
        ],
        "BOTTOKEN",
    );

    let result = verify_at(&VerifyParams::new(&raw, "BOTTOKEN", false, 0), NOW);

    assert!(result.signature_valid);
    assert!(result.freshness_valid);
    assert_eq!(result.format, PayloadFormat::QueryString);

    let identity = result.identity().expect("identity");
    assert_eq!(identity.id, 7);
    assert_eq!(identity.username, "bob");
}

#[test]
fn expected_signature_matches_a_known_answer_vector() {
    // Independently computed with reference HMAC-SHA-256 tooling for the
    // two-stage scheme: key = HMAC("WebAppData", secret), sig = HMAC(key,
    // check-string), lowercase hex.
    let mut fields = FieldMap::new();
    fields.insert("auth_date".to_string(), "1700000000".to_string());
    fields.insert("query_id".to_string(), "AAA".to_string());
    fields.insert("user".to_string(), "{\"id\":7,\"username\":\"bob\"}".to_string());

    assert_eq!(
        expected_signature(&fields, "BOTTOKEN"),
        "8960522a1195558a72edf0ef1ee1ee013133037155a866775f1c4f81174764ec"
    );
}

#[test]
fn verification_is_deterministic_for_fixed_time() {
    let raw = signed_payload(&[("auth_date", "1700000000"), ("query_id", "AAA")], "secret");
    let params = VerifyParams::new(&raw, "secret", true, 120);

    let first = verify_at(&params, NOW);
    let second = verify_at(&params, NOW);

    assert_eq!(first, second);
}

#[test]
fn tampered_field_value_invalidates_signature() {
    let raw = signed_payload(&[("auth_date", "1700000000"), ("query_id", "AAA")], "secret");
    let tampered = raw.replace("AAA", "AAB");

    let result = verify_at(&VerifyParams::new(&tampered, "secret", false, 0), NOW);

    assert!(!result.signature_valid);
}

#[test]
fn wrong_secret_invalidates_signature() {
    let raw = signed_payload(&[("auth_date", "1700000000")], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "other-secret", false, 0), NOW);

    assert!(!result.signature_valid);
}

#[test]
fn field_order_does_not_affect_the_signature() {
    let fields_forward = [("auth_date", "1700000000"), ("query_id", "AAA")];
    let fields_reversed = [("query_id", "AAA"), ("auth_date", "1700000000")];

    let raw_forward = signed_payload(&fields_forward, "secret");
    let raw_reversed = signed_payload(&fields_reversed, "secret");

    let forward = verify_at(&VerifyParams::new(&raw_forward, "secret", false, 0), NOW);
    let reversed = verify_at(&VerifyParams::new(&raw_reversed, "secret", false, 0), NOW);

    assert!(forward.signature_valid);
    assert!(reversed.signature_valid);
}

#[test]
fn check_string_sorts_keys_and_omits_trailing_newline() {
    let mut fields = FieldMap::new();
    fields.insert("query_id".to_string(), "AAA".to_string());
    fields.insert("auth_date".to_string(), "1700000000".to_string());

    assert_eq!(check_string(&fields), "auth_date=1700000000\nquery_id=AAA");
}

#[test]
fn payload_at_the_window_boundary_is_fresh() {
    let issued = NOW - 60;
    let raw = signed_payload(&[("auth_date", &issued.to_string())], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "secret", true, 60), NOW);

    assert!(result.signature_valid);
    assert!(result.freshness_valid);
}

#[test]
fn payload_one_second_past_the_window_is_stale() {
    let issued = NOW - 61;
    let raw = signed_payload(&[("auth_date", &issued.to_string())], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "secret", true, 60), NOW);

    assert!(result.signature_valid);
    assert!(!result.freshness_valid);
}

#[test]
fn future_dated_payload_within_the_window_is_fresh() {
    let issued = NOW + 30;
    let raw = signed_payload(&[("auth_date", &issued.to_string())], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "secret", true, 60), NOW);

    assert!(result.freshness_valid);
}

#[test]
fn freshness_is_trivially_valid_when_not_enforced() {
    let issued = NOW - 1_000_000;
    let raw = signed_payload(&[("auth_date", &issued.to_string())], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "secret", false, 0), NOW);

    assert!(result.signature_valid);
    assert!(result.freshness_valid);
}

#[test]
fn extreme_negative_auth_date_fails_closed_when_enforced() {
    // An age beyond i64 range must fail closed as stale, not wrap or panic.
    let issued = i64::MIN;
    let raw = signed_payload(&[("auth_date", &issued.to_string())], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "secret", true, 60), NOW);

    assert!(result.signature_valid);
    assert!(!result.freshness_valid);
}

#[test]
fn missing_auth_date_fails_closed_when_enforced() {
    let raw = signed_payload(&[("query_id", "AAA")], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "secret", true, 60), NOW);

    assert!(result.signature_valid);
    assert!(!result.freshness_valid);
}

#[test]
fn with_window_enforces_freshness_only_for_positive_windows() {
    let enforced = VerifyParams::with_window("", "secret", 60);
    let disabled = VerifyParams::with_window("", "secret", 0);

    assert!(enforced.check_freshness);
    assert!(!disabled.check_freshness);
}

#[test]
fn signature_field_is_restored_into_the_returned_map() {
    let raw = signed_payload(&[("auth_date", "1700000000")], "secret");

    let result = verify_at(&VerifyParams::new(&raw, "secret", false, 0), NOW);

    let restored = result.fields.get(SIGNATURE_FIELD).expect("signature field");
    assert!(raw.ends_with(restored.as_str()));
}

#[test]
fn missing_signature_field_fails_verification_without_restoring_it() {
    let result = verify_at(
        &VerifyParams::new("auth_date=1700000000&query_id=AAA", "secret", false, 0),
        NOW,
    );

    assert!(!result.signature_valid);
    assert!(result.freshness_valid);
    assert!(!result.fields.contains_key(SIGNATURE_FIELD));
    assert_eq!(result.fields.len(), 2);
}

#[test]
fn freshness_reports_valid_by_convention_under_invalid_signature() {
    let result = verify_at(
        &VerifyParams::new("auth_date=1&hash=deadbeef", "secret", true, 60),
        NOW,
    );

    assert!(!result.signature_valid);
    assert!(result.freshness_valid);
}

#[test]
fn unrecognized_payload_degrades_to_signature_mismatch() {
    let result = verify_at(
        &VerifyParams::new("not json {{{ and not a query string", "secret", false, 0),
        NOW,
    );

    assert_eq!(result.format, PayloadFormat::Unrecognized);
    assert!(result.fields.is_empty());
    assert!(!result.signature_valid);
}

#[test]
fn identity_fields_project_as_namespaced_attributes() {
    let raw = signed_payload(
        &[(
            "user",
            "{\"id\":7,\"username\":\"bob\",\"premium\":true,\"photo\":null}",
        )],
        "secret",
    );

    let result = verify_at(&VerifyParams::new(&raw, "secret", false, 0), NOW);
    let attributes = result.namespaced_attributes().expect("attributes");

    assert_eq!(attributes[CORRELATION_ATTRIBUTE], "7");
    assert_eq!(attributes["telegram_username"], "bob");
    assert_eq!(attributes["telegram_premium"], "true");
    assert!(!attributes.contains_key("telegram_photo"));
}
