//! Key material and key-parsing adapters
//!
//! PEM parsing is delegated to `jsonwebtoken::EncodingKey`, except for P-521
//! keys which `jsonwebtoken` can't sign with and which are kept as
//! `p521::SecretKey`. This module only decides which parser to call and
//! carries the result around as [`KeyMaterial`], which exists for the
//! duration of one `generate` call.

use std::fmt;
use std::path::Path;

use jsonwebtoken::EncodingKey;
use p521::pkcs8::DecodePrivateKey;
use secrecy::{ExposeSecret, SecretString, SecretVec};
use tracing::debug;

use crate::error::{IssuerError, IssuerResult};

/// Asymmetric key family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// RSA (RS256, RS384, RS512, ...)
    Rsa,
    /// Elliptic curve (ES256, ES384, ...)
    Ec,
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rsa => f.write_str("RSA"),
            Self::Ec => f.write_str("EC"),
        }
    }
}

/// Parsed asymmetric private key
#[derive(Clone)]
pub enum PrivateKey {
    /// RSA or EC P-256/P-384 key in `jsonwebtoken` form
    Jws(EncodingKey),
    /// EC P-521 key for ES512
    P521(p521::SecretKey),
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jws(_) => f.write_str("PrivateKey::Jws(<redacted>)"),
            Self::P521(_) => f.write_str("PrivateKey::P521(<redacted>)"),
        }
    }
}

/// Key material resolved for a single token
pub enum KeyMaterial {
    /// No key; the token is unsigned
    None,
    /// Shared secret for the HMAC family
    Shared(SecretVec<u8>),
    /// Parsed asymmetric signing key
    Asymmetric {
        /// Key handed to the signer
        key: PrivateKey,
        /// Family the key was parsed as
        family: KeyFamily,
    },
}

impl KeyMaterial {
    /// Wrap shared secret bytes
    pub fn shared(secret: impl Into<Vec<u8>>) -> Self {
        Self::Shared(SecretVec::new(secret.into()))
    }

    /// Short description used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "no",
            Self::Shared(_) => "shared-secret",
            Self::Asymmetric {
                family: KeyFamily::Rsa,
                ..
            } => "RSA",
            Self::Asymmetric {
                family: KeyFamily::Ec,
                ..
            } => "EC",
        }
    }

    /// Family of an asymmetric key
    pub fn family(&self) -> Option<KeyFamily> {
        match self {
            Self::Asymmetric { family, .. } => Some(*family),
            _ => None,
        }
    }

    /// Shared secret bytes, if this is HMAC key material
    pub fn shared_secret(&self) -> Option<&[u8]> {
        match self {
            Self::Shared(secret) => Some(secret.expose_secret().as_slice()),
            _ => None,
        }
    }
}

// Manual Debug impl so secret bytes never reach logs
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("KeyMaterial::None"),
            Self::Shared(_) => f.write_str("KeyMaterial::Shared(<redacted>)"),
            Self::Asymmetric { family, .. } => f
                .debug_struct("KeyMaterial::Asymmetric")
                .field("key", &"<redacted>")
                .field("family", family)
                .finish(),
        }
    }
}

/// Secret configured directly on the signing configuration
///
/// Either raw bytes (a shared secret, or PEM text to be parsed once the
/// signing method is known) or a key that was parsed up front.
pub enum RawSecret {
    /// String or byte blob
    Bytes(SecretVec<u8>),
    /// Pre-parsed asymmetric key
    Parsed {
        /// Parsed signing key
        key: PrivateKey,
        /// Family of the key
        family: KeyFamily,
    },
}

impl RawSecret {
    /// Raw secret from bytes or text
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(SecretVec::new(bytes.into()))
    }

    /// Parse an RSA private key PEM up front
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::KeyParse`] if the PEM is not an RSA key.
    pub fn rsa_pem(pem: &[u8]) -> IssuerResult<Self> {
        Ok(Self::Parsed {
            key: parse_rsa(pem)?,
            family: KeyFamily::Rsa,
        })
    }

    /// Parse an EC private key PEM (PKCS#8) up front
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::KeyParse`] if the PEM is not an EC key.
    pub fn ec_pem(pem: &[u8]) -> IssuerResult<Self> {
        Ok(Self::Parsed {
            key: parse_ec(pem)?,
            family: KeyFamily::Ec,
        })
    }
}

impl fmt::Debug for RawSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(_) => f.write_str("RawSecret::Bytes(<redacted>)"),
            Self::Parsed { family, .. } => f
                .debug_struct("RawSecret::Parsed")
                .field("key", &"<redacted>")
                .field("family", family)
                .finish(),
        }
    }
}

impl From<&str> for RawSecret {
    fn from(value: &str) -> Self {
        Self::from_bytes(value.as_bytes())
    }
}

impl From<String> for RawSecret {
    fn from(value: String) -> Self {
        Self::from_bytes(value.into_bytes())
    }
}

impl From<&[u8]> for RawSecret {
    fn from(value: &[u8]) -> Self {
        Self::from_bytes(value)
    }
}

impl From<Vec<u8>> for RawSecret {
    fn from(value: Vec<u8>) -> Self {
        Self::from_bytes(value)
    }
}

impl From<SecretString> for RawSecret {
    fn from(value: SecretString) -> Self {
        Self::from_bytes(value.expose_secret().as_bytes())
    }
}

/// Parse an RSA private key from PEM (PKCS#1 or PKCS#8)
///
/// # Errors
///
/// Returns [`IssuerError::KeyParse`] on malformed or non-RSA PEM.
pub fn parse_rsa(pem: &[u8]) -> IssuerResult<PrivateKey> {
    EncodingKey::from_rsa_pem(pem)
        .map(PrivateKey::Jws)
        .map_err(|source| IssuerError::KeyParse {
            family: KeyFamily::Rsa,
            source,
        })
}

/// Parse an EC private key from PEM (PKCS#8)
///
/// P-521 keys become [`PrivateKey::P521`]; other curves are left to
/// `jsonwebtoken`.
///
/// # Errors
///
/// Returns [`IssuerError::KeyParse`] on malformed or non-EC PEM.
pub fn parse_ec(pem: &[u8]) -> IssuerResult<PrivateKey> {
    if let Some(key) = parse_p521(pem) {
        return Ok(PrivateKey::P521(key));
    }

    EncodingKey::from_ec_pem(pem)
        .map(PrivateKey::Jws)
        .map_err(|source| IssuerError::KeyParse {
            family: KeyFamily::Ec,
            source,
        })
}

// A PKCS#8 key on any other curve fails the curve OID check here
fn parse_p521(pem: &[u8]) -> Option<p521::SecretKey> {
    let pem = std::str::from_utf8(pem).ok()?;
    p521::SecretKey::from_pkcs8_pem(pem).ok()
}

/// Parse PEM bytes as a key of the given family
///
/// # Errors
///
/// Returns [`IssuerError::KeyParse`] if the PEM does not hold a key of `family`.
pub fn parse_pem(pem: &[u8], family: KeyFamily) -> IssuerResult<KeyMaterial> {
    let key = match family {
        KeyFamily::Rsa => parse_rsa(pem)?,
        KeyFamily::Ec => parse_ec(pem)?,
    };
    Ok(KeyMaterial::Asymmetric { key, family })
}

/// Read a PEM key file and parse it as the given family
///
/// The file is read on every call; nothing is cached.
///
/// # Errors
///
/// Returns [`IssuerError::Io`] if the file can't be read and
/// [`IssuerError::KeyParse`] if its contents are not a key of `family`.
pub fn load_key_file(path: &Path, family: KeyFamily) -> IssuerResult<KeyMaterial> {
    let pem = std::fs::read(path).map_err(|source| IssuerError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(
        path = %path.display(),
        family = %family,
        bytes = pem.len(),
        "Loaded key file"
    );

    parse_pem(&pem, family)
}
