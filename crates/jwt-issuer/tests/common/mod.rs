//! Common test utilities for integration tests
//!
//! Key fixtures live in `tests/fixtures/` (2048-bit RSA, P-256 and P-521 EC,
//! all PKCS#8 PEM unless the name says otherwise, with `_pub` public halves).

#![allow(dead_code)]

use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde_json::{Map, Value, json};

/// Absolute path of a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Contents of a fixture file
pub fn fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixture_path(name)).expect("fixture should exist")
}

/// Decode one base64url JSON segment of a token
pub fn decode_segment(segment: &str) -> Value {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .expect("segment should be base64url");
    serde_json::from_slice(&bytes).expect("segment should be JSON")
}

/// Split a token into (header, claims, signature) without verifying it
pub fn decode_unverified(token: &str) -> (Value, Value, String) {
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts.len(), 3, "token must have three segments: {token}");
    (
        decode_segment(parts[0]),
        decode_segment(parts[1]),
        parts[2].to_string(),
    )
}

/// Validation that only checks the signature and algorithm
pub fn signature_only(algorithm: Algorithm) -> Validation {
    let mut validation = Validation::new(algorithm);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation
}

/// Verify a token and return its claims
pub fn verify(
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
) -> jsonwebtoken::errors::Result<Value> {
    decode::<Value>(token, key, &signature_only(algorithm)).map(|data| data.claims)
}

/// Verify an ES512 token against a P-521 key pair
///
/// `jsonwebtoken` has no ES512 support, so the check goes through `p521`.
/// The public key PEM must be the public half of the private key PEM.
pub fn verify_es512(token: &str, private_pem: &[u8], public_pem: &[u8]) -> Value {
    use p521::ecdsa::signature::Verifier;
    use p521::pkcs8::{DecodePrivateKey, DecodePublicKey};

    let private_pem = std::str::from_utf8(private_pem).expect("PEM is UTF-8");
    let public_pem = std::str::from_utf8(public_pem).expect("PEM is UTF-8");
    let secret = p521::SecretKey::from_pkcs8_pem(private_pem).expect("P-521 PKCS#8 key");
    let public = p521::PublicKey::from_public_key_pem(public_pem).expect("P-521 public key");
    assert_eq!(secret.public_key(), public, "key pair fixtures must match");

    let signing_key =
        p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes()).expect("valid P-521 scalar");

    let (signing_input, signature) = token.rsplit_once('.').expect("token has a signature");
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .expect("signature should be base64url");
    let signature =
        p521::ecdsa::Signature::from_slice(&signature).expect("fixed-size ES512 signature");
    p521::ecdsa::VerifyingKey::from(&signing_key)
        .verify(signing_input.as_bytes(), &signature)
        .expect("ES512 signature should verify");

    let claims = signing_input.split('.').nth(1).expect("claims segment");
    decode_segment(claims)
}

/// The `{"foo": "bar"}` payload used across the tests
pub fn foo_bar() -> Map<String, Value> {
    let mut claims = Map::new();
    claims.insert("foo".into(), json!("bar"));
    claims
}
