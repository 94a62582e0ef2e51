//! Token generation
//!
//! [`TokenIssuer`] ties the pieces together for one request: produce the
//! payload and headers, resolve key material, normalize the algorithm name and
//! hand everything to the [`TokenEncoder`].
//!
//! The issuer holds its configuration in a lock-free slot. It can be created
//! unconfigured and configured later (or reconfigured); generating a token
//! before any configuration is installed fails with
//! [`IssuerError::MissingConfiguration`].
//!
//! # Example
//!
//! ```rust
//! use jwt_issuer::{RequestContext, SigningConfig, TokenIssuer};
//!
//! let issuer = TokenIssuer::with_config(
//!     SigningConfig::builder()
//!         .secret_key("super secret")
//!         .signing_method("hs256")
//!         .build(),
//! );
//!
//! let token = issuer.generate(&RequestContext::new())?;
//! assert_eq!(token.split('.').count(), 3);
//! # Ok::<(), jwt_issuer::IssuerError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, warn};

use crate::codec::{JwsEncoder, TokenEncoder};
use crate::config::SigningConfig;
use crate::context::RequestContext;
use crate::error::{IssuerError, IssuerResult};
use crate::resolver::SecretResolver;

/// Issues bearer tokens from a shared signing configuration
pub struct TokenIssuer {
    config: ArcSwapOption<SigningConfig>,
    encoder: Arc<dyn TokenEncoder>,
}

impl TokenIssuer {
    /// Create an unconfigured issuer using the default [`JwsEncoder`]
    pub fn new() -> Self {
        Self {
            config: ArcSwapOption::empty(),
            encoder: Arc::new(JwsEncoder::new()),
        }
    }

    /// Create an issuer with `config` installed
    pub fn with_config(config: impl Into<Arc<SigningConfig>>) -> Self {
        let issuer = Self::new();
        issuer.configure(config);
        issuer
    }

    /// Replace the token encoder
    pub fn with_encoder(mut self, encoder: impl TokenEncoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// Install or replace the signing configuration
    ///
    /// Requests already in flight finish with the configuration they started with.
    pub fn configure(&self, config: impl Into<Arc<SigningConfig>>) {
        self.config.store(Some(config.into()));
        debug!("Signing configuration installed");
    }

    /// The installed configuration
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::MissingConfiguration`] if none is installed.
    pub fn configuration(&self) -> IssuerResult<Arc<SigningConfig>> {
        self.config
            .load_full()
            .ok_or(IssuerError::MissingConfiguration)
    }

    /// Whether a configuration is installed
    pub fn is_configured(&self) -> bool {
        self.config.load().is_some()
    }

    /// Generate a token for `ctx`
    ///
    /// The algorithm reported to the encoder is `"none"` when no signing method
    /// is configured and the upper-cased method otherwise, whatever key
    /// material was resolved. A shared secret configured without a method is
    /// therefore resolved but not used.
    ///
    /// # Errors
    ///
    /// Returns [`IssuerError::MissingConfiguration`] if the issuer is not
    /// configured, any error from secret resolution unchanged, and any error
    /// from the encoder.
    pub fn generate(&self, ctx: &RequestContext) -> IssuerResult<String> {
        let config = self.configuration().inspect_err(|_| {
            warn!("Token requested before the issuer was configured");
        })?;

        let payload = config.payload(ctx);
        let headers = config.headers(ctx);

        let method = config.normalized_method();
        let key = SecretResolver::new(&config, &method).resolve(ctx)?;

        debug!(
            algorithm = %method,
            key = key.kind(),
            claims = payload.len(),
            headers = headers.len(),
            "Generating token"
        );

        self.encoder
            .encode(&payload, &key, method.as_str(), &headers)
    }
}

impl Default for TokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("configured", &self.is_configured())
            .finish_non_exhaustive()
    }
}
