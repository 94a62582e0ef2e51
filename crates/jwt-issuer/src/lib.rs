//! # JWT Issuer - Bearer Tokens for OAuth Authorization Servers
//!
//! Issues signed (or unsigned) JWT bearer tokens from a pluggable payload, a
//! pluggable header set and a declarative signing configuration. The interesting
//! part is deciding *which key* signs a token and *which algorithm* is reported:
//! a shared secret, an RSA or EC key from a string or a PEM file, or the
//! requesting OAuth application's own secret.
//!
//! ## Architecture
//!
//! - [`config`] - Immutable `SigningConfig`, its builder and serde settings
//! - [`context`] - Per-request `RequestContext` and the two `Application` shapes
//! - [`algorithm`] - Signing method normalization and key family inference
//! - [`key`] - `KeyMaterial` and PEM parsing adapters over `jsonwebtoken` and `p521`
//! - [`application`] - Application secret extraction
//! - [`resolver`] - The secret resolution priority chain
//! - [`codec`] - `TokenEncoder` seam and the default JWS encoder
//! - [`issuer`] - `TokenIssuer`, the token generation entry point
//!
//! ## Quick Start
//!
//! ```rust
//! use jwt_issuer::{Application, RequestContext, SigningConfig, TokenIssuer};
//! use serde_json::json;
//!
//! let issuer = TokenIssuer::with_config(
//!     SigningConfig::builder()
//!         .token_payload(|ctx| {
//!             let mut claims = serde_json::Map::new();
//!             claims.insert("iss".into(), json!("https://auth.example.com"));
//!             if let Some(owner) = ctx.param("resource_owner_id") {
//!                 claims.insert("sub".into(), owner.clone());
//!             }
//!             claims
//!         })
//!         .use_application_secret(true)
//!         .signing_method("hs512")
//!         .build(),
//! );
//!
//! let ctx = RequestContext::new()
//!     .with_param("resource_owner_id", 7)
//!     .with_application(Application::plain(json!({ "uid": "app", "secret": "app secret" })));
//!
//! let token = issuer.generate(&ctx)?;
//! assert_eq!(token.split('.').count(), 3);
//! # Ok::<(), jwt_issuer::IssuerError>(())
//! ```
//!
//! ## Thread Safety
//!
//! `SigningConfig` is read-only once built and `TokenIssuer::generate` takes no
//! locks, so one issuer can serve any number of concurrent requests. Each call
//! reads and parses its own key material.

pub mod algorithm;
pub mod application;
pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod issuer;
pub mod key;
pub mod resolver;

pub use algorithm::SigningMethod;
pub use application::extract_application_secret;
pub use codec::{JwsEncoder, TokenEncoder};
pub use config::{
    Claims, HeaderProducer, Headers, PayloadProducer, SigningConfig, SigningConfigBuilder,
    SigningSettings,
};
pub use context::{
    Application, HashedSecretStrategy, PlainSecretStrategy, RequestContext, SecretHolder,
    SecretStrategy,
};
pub use error::{IssuerError, IssuerResult};
pub use issuer::TokenIssuer;
pub use key::{KeyFamily, KeyMaterial, PrivateKey, RawSecret};
pub use resolver::{SecretResolver, resolve_secret};
