//! Secret resolution
//!
//! Decides which key material signs a token. The branches form a priority
//! chain; the first one the configuration selects is final:
//!
//! 1. `use_application_secret` - the requesting application's secret
//! 2. `secret_file_path` - a PEM key file, parsed per the signing method family
//! 3. `RSxxx` method - the configured secret parsed as an RSA PEM
//! 4. `ESxxx` method - the configured secret parsed as an EC PEM
//! 5. otherwise - the configured secret as a shared secret, or no key at all
//!
//! Resolution is a pure function of the configuration and the request: the
//! key file is re-read on every call and nothing is cached.

use secrecy::ExposeSecret;
use tracing::{debug, warn};

use crate::algorithm::SigningMethod;
use crate::application::extract_application_secret;
use crate::config::SigningConfig;
use crate::context::RequestContext;
use crate::error::{IssuerError, IssuerResult};
use crate::key::{self, KeyMaterial, RawSecret};

/// Resolves key material for a token request
#[derive(Debug, Clone, Copy)]
pub struct SecretResolver<'a> {
    config: &'a SigningConfig,
    method: &'a SigningMethod,
}

impl<'a> SecretResolver<'a> {
    /// Resolver for `config`, using the already normalized `method`
    ///
    /// The caller passes the same [`SigningMethod`] it reports to the encoder,
    /// so the family chosen here can't drift from the token's `alg`.
    pub fn new(config: &'a SigningConfig, method: &'a SigningMethod) -> Self {
        Self { config, method }
    }

    /// Resolve key material for `ctx`
    ///
    /// # Errors
    ///
    /// Application secret errors ([`IssuerError::MissingApplication`],
    /// [`IssuerError::SecretNotRestorable`], [`IssuerError::MissingSecret`]),
    /// [`IssuerError::Io`] and [`IssuerError::KeyParse`] for key files and PEM
    /// secrets, and [`IssuerError::UnsupportedFileKeyAlgorithm`] when a key
    /// file is configured for a method that is neither RSA nor ECDSA.
    pub fn resolve(&self, ctx: &RequestContext) -> IssuerResult<KeyMaterial> {
        if self.config.use_application_secret() {
            debug!(method = %self.method, "Resolving signing key from application secret");
            let secret = extract_application_secret(ctx)?;
            return self.key_from_secret(secret.expose_secret());
        }

        if let Some(path) = self.config.secret_file_path() {
            let Some(family) = self.method.key_family() else {
                warn!(
                    method = %self.method,
                    path = %path.display(),
                    "Secret key file configured for a non-asymmetric signing method"
                );
                return Err(IssuerError::UnsupportedFileKeyAlgorithm {
                    method: self.method.to_string(),
                });
            };
            debug!(method = %self.method, path = %path.display(), "Resolving signing key from file");
            return key::load_key_file(path, family);
        }

        match (self.method.key_family(), self.config.raw_secret()) {
            (Some(expected), Some(RawSecret::Parsed { key, family })) => {
                if *family != expected {
                    return Err(IssuerError::KeyFamilyMismatch {
                        expected,
                        actual: *family,
                    });
                }
                debug!(method = %self.method, family = %family, "Using pre-parsed signing key");
                Ok(KeyMaterial::Asymmetric {
                    key: key.clone(),
                    family: *family,
                })
            }
            (Some(family), Some(RawSecret::Bytes(pem))) => {
                debug!(method = %self.method, family = %family, "Parsing configured secret as PEM");
                key::parse_pem(pem.expose_secret(), family)
            }
            (Some(family), None) => {
                warn!(method = %self.method, family = %family, "Asymmetric signing method without a key");
                Err(IssuerError::MissingSecret)
            }
            (None, Some(RawSecret::Parsed { key, family })) => Ok(KeyMaterial::Asymmetric {
                key: key.clone(),
                family: *family,
            }),
            (None, Some(RawSecret::Bytes(secret))) => {
                debug!(method = %self.method, "Using configured shared secret");
                Ok(KeyMaterial::shared(secret.expose_secret().as_slice()))
            }
            (None, None) => {
                debug!(method = %self.method, "No signing key configured");
                Ok(KeyMaterial::None)
            }
        }
    }

    // Application secrets follow the same family dispatch as configured ones
    fn key_from_secret(&self, secret: &[u8]) -> IssuerResult<KeyMaterial> {
        match self.method.key_family() {
            Some(family) => key::parse_pem(secret, family),
            None => Ok(KeyMaterial::shared(secret)),
        }
    }
}

/// Resolve key material for `ctx` under `config`
///
/// # Errors
///
/// See [`SecretResolver::resolve`].
pub fn resolve_secret(config: &SigningConfig, ctx: &RequestContext) -> IssuerResult<KeyMaterial> {
    let method = config.normalized_method();
    SecretResolver::new(config, &method).resolve(ctx)
}
