//! Token encoding
//!
//! [`TokenEncoder`] is the seam between secret resolution and the actual JWS
//! serialization. [`JwsEncoder`] is the default: it writes the compact
//! serialization itself (so arbitrary header entries survive) and delegates
//! the signature to `jsonwebtoken::crypto::sign`, or to `p521` for ES512.

use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, EncodingKey};
use p521::ecdsa::signature::Signer;
use serde_json::Value;
use tracing::debug;

use crate::algorithm::SigningMethod;
use crate::config::{Claims, Headers};
use crate::error::{IssuerError, IssuerResult};
use crate::key::{KeyFamily, KeyMaterial, PrivateKey};

const ES512: &str = "ES512";

/// Serializes and signs a token
pub trait TokenEncoder: Send + Sync {
    /// Encode `claims` under `headers`, signed with `key` using `algorithm`
    ///
    /// Must accept [`KeyMaterial::None`] with algorithm `"none"` and produce an
    /// unsigned token.
    ///
    /// # Errors
    ///
    /// Implementation specific; see [`JwsEncoder::encode`] for the default.
    fn encode(
        &self,
        claims: &Claims,
        key: &KeyMaterial,
        algorithm: &str,
        headers: &Headers,
    ) -> IssuerResult<String>;
}

/// JWS compact serialization encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct JwsEncoder;

impl JwsEncoder {
    /// Create the encoder
    pub fn new() -> Self {
        Self
    }

    fn signing_input(claims: &Claims, algorithm: &str, headers: &Headers) -> IssuerResult<String> {
        let mut header = headers.clone();
        header.insert("alg".to_string(), Value::String(algorithm.to_string()));

        let header_json = serde_json::to_vec(&header)?;
        let claims_json = serde_json::to_vec(claims)?;

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        ))
    }

    fn encoding_key(
        key: &KeyMaterial,
        algorithm: Algorithm,
        algorithm_name: &str,
    ) -> IssuerResult<EncodingKey> {
        let mismatch = || Self::mismatch(key, algorithm_name);

        match (algorithm, key) {
            (_, KeyMaterial::None) => Err(IssuerError::MissingSigningKey {
                algorithm: algorithm_name.to_string(),
            }),
            (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512, KeyMaterial::Shared(_)) => {
                key.shared_secret()
                    .map(EncodingKey::from_secret)
                    .ok_or_else(mismatch)
            }
            (
                Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512,
                KeyMaterial::Asymmetric {
                    key: PrivateKey::Jws(key),
                    family: KeyFamily::Rsa,
                },
            ) => Ok(key.clone()),
            (
                Algorithm::ES256 | Algorithm::ES384,
                KeyMaterial::Asymmetric {
                    key: PrivateKey::Jws(key),
                    family: KeyFamily::Ec,
                },
            ) => Ok(key.clone()),
            _ => Err(mismatch()),
        }
    }

    fn mismatch(key: &KeyMaterial, algorithm_name: &str) -> IssuerError {
        IssuerError::KeyMismatch {
            algorithm: algorithm_name.to_string(),
            key: key.kind(),
        }
    }

    // Fixed-size R || S (66 + 66 bytes), as JWS requires
    fn sign_es512(
        signing_input: &str,
        key: &KeyMaterial,
        algorithm_name: &str,
    ) -> IssuerResult<String> {
        let secret = match key {
            KeyMaterial::Asymmetric {
                key: PrivateKey::P521(secret),
                ..
            } => secret,
            KeyMaterial::None => {
                return Err(IssuerError::MissingSigningKey {
                    algorithm: algorithm_name.to_string(),
                });
            }
            _ => return Err(Self::mismatch(key, algorithm_name)),
        };

        let signing_key = p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
            .map_err(IssuerError::EcdsaSigning)?;
        let signature: p521::ecdsa::Signature = signing_key
            .try_sign(signing_input.as_bytes())
            .map_err(IssuerError::EcdsaSigning)?;

        Ok(URL_SAFE_NO_PAD.encode(signature.to_bytes()))
    }
}

impl TokenEncoder for JwsEncoder {
    /// Encode a token
    ///
    /// The `alg` header always carries `algorithm`, overriding any `alg` entry
    /// in `headers`. For `"none"` (any case) the key is ignored and the token
    /// ends with an empty signature segment.
    ///
    /// # Errors
    ///
    /// - [`IssuerError::UnsupportedAlgorithm`] for names `jsonwebtoken` doesn't know
    /// - [`IssuerError::MissingSigningKey`] for a signing algorithm without a key
    /// - [`IssuerError::KeyMismatch`] when the key family doesn't fit the algorithm
    /// - [`IssuerError::Signing`], [`IssuerError::EcdsaSigning`] and
    ///   [`IssuerError::Serialization`] from the codec
    fn encode(
        &self,
        claims: &Claims,
        key: &KeyMaterial,
        algorithm: &str,
        headers: &Headers,
    ) -> IssuerResult<String> {
        let signing_input = Self::signing_input(claims, algorithm, headers)?;
        let method = SigningMethod::normalize(Some(algorithm));

        if method.is_none() {
            debug!(key = key.kind(), "Encoding unsigned token");
            return Ok(format!("{signing_input}."));
        }

        let signature = if method.as_str() == ES512 {
            Self::sign_es512(&signing_input, key, algorithm)?
        } else {
            let alg = Algorithm::from_str(method.as_str())
                .map_err(|_| IssuerError::UnsupportedAlgorithm(algorithm.to_string()))?;
            let encoding_key = Self::encoding_key(key, alg, algorithm)?;
            jsonwebtoken::crypto::sign(signing_input.as_bytes(), &encoding_key, alg)
                .map_err(IssuerError::Signing)?
        };

        debug!(algorithm = algorithm, key = key.kind(), "Encoded signed token");
        Ok(format!("{signing_input}.{signature}"))
    }
}
