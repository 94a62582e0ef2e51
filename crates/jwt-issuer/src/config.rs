//! Signing configuration
//!
//! [`SigningConfig`] is built once at process configuration time and then
//! shared read-only (typically behind an `Arc`) by every token request.
//! [`SigningSettings`] is the serde-facing subset that can come from a config
//! file; the payload and header producers are code and are set on the builder.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::algorithm::SigningMethod;
use crate::context::RequestContext;
use crate::key::RawSecret;

/// Token claims as produced by the payload producer
pub type Claims = Map<String, Value>;

/// Extra JOSE header entries as produced by the header producer
pub type Headers = Map<String, Value>;

/// Produces the token payload for a request
pub type PayloadProducer = Arc<dyn Fn(&RequestContext) -> Claims + Send + Sync>;

/// Produces extra token headers for a request
pub type HeaderProducer = Arc<dyn Fn(&RequestContext) -> Headers + Send + Sync>;

/// Default payload: `{"token": <32 hex chars>}`, random per call
pub fn default_payload(_ctx: &RequestContext) -> Claims {
    let mut claims = Claims::new();
    claims.insert(
        "token".to_string(),
        Value::String(hex::encode(rand::random::<[u8; 16]>())),
    );
    claims
}

/// Default headers: none beyond `alg`
pub fn default_headers(_ctx: &RequestContext) -> Headers {
    Headers::new()
}

/// Immutable token signing configuration
pub struct SigningConfig {
    payload_producer: PayloadProducer,
    header_producer: HeaderProducer,
    raw_secret: Option<RawSecret>,
    secret_file_path: Option<PathBuf>,
    signing_method: Option<String>,
    use_application_secret: bool,
}

impl SigningConfig {
    /// Start building a configuration
    pub fn builder() -> SigningConfigBuilder {
        SigningConfigBuilder::default()
    }

    /// Compute the payload for a request
    pub fn payload(&self, ctx: &RequestContext) -> Claims {
        (self.payload_producer)(ctx)
    }

    /// Compute the extra headers for a request
    pub fn headers(&self, ctx: &RequestContext) -> Headers {
        (self.header_producer)(ctx)
    }

    /// Directly configured secret
    pub fn raw_secret(&self) -> Option<&RawSecret> {
        self.raw_secret.as_ref()
    }

    /// Path of a PEM key file
    pub fn secret_file_path(&self) -> Option<&Path> {
        self.secret_file_path.as_deref()
    }

    /// Configured signing method, as given
    pub fn signing_method(&self) -> Option<&str> {
        self.signing_method.as_deref()
    }

    /// Normalized signing method (`"none"` or upper-cased)
    pub fn normalized_method(&self) -> SigningMethod {
        SigningMethod::normalize(self.signing_method.as_deref())
    }

    /// Whether tokens are signed with the requesting application's secret
    pub fn use_application_secret(&self) -> bool {
        self.use_application_secret
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        SigningConfigBuilder::default().build()
    }
}

// Manual Debug impl: producers are opaque and the secret is redacted
impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("raw_secret", &self.raw_secret)
            .field("secret_file_path", &self.secret_file_path)
            .field("signing_method", &self.signing_method)
            .field("use_application_secret", &self.use_application_secret)
            .finish_non_exhaustive()
    }
}

/// Builder for [`SigningConfig`]
///
/// # Example
///
/// ```rust
/// use jwt_issuer::SigningConfig;
/// use serde_json::json;
///
/// let config = SigningConfig::builder()
///     .token_payload(|ctx| {
///         let mut claims = serde_json::Map::new();
///         claims.insert("sub".into(), ctx.param("resource_owner_id").cloned().unwrap_or(json!(null)));
///         claims
///     })
///     .secret_key("super secret")
///     .signing_method("hs256")
///     .build();
///
/// assert_eq!(config.normalized_method().as_str(), "HS256");
/// ```
#[derive(Default)]
pub struct SigningConfigBuilder {
    payload_producer: Option<PayloadProducer>,
    header_producer: Option<HeaderProducer>,
    raw_secret: Option<RawSecret>,
    secret_file_path: Option<PathBuf>,
    signing_method: Option<String>,
    use_application_secret: bool,
}

impl SigningConfigBuilder {
    /// Set the payload producer
    pub fn token_payload<F>(mut self, producer: F) -> Self
    where
        F: Fn(&RequestContext) -> Claims + Send + Sync + 'static,
    {
        self.payload_producer = Some(Arc::new(producer));
        self
    }

    /// Set the header producer
    pub fn token_headers<F>(mut self, producer: F) -> Self
    where
        F: Fn(&RequestContext) -> Headers + Send + Sync + 'static,
    {
        self.header_producer = Some(Arc::new(producer));
        self
    }

    /// Set the secret: a shared secret, PEM text or a pre-parsed key
    pub fn secret_key(mut self, secret: impl Into<RawSecret>) -> Self {
        self.raw_secret = Some(secret.into());
        self
    }

    /// Set the path of a PEM key file
    pub fn secret_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.secret_file_path = Some(path.into());
        self
    }

    /// Set the signing method (case-insensitive, e.g. `hs256`, `rs512`)
    pub fn signing_method(mut self, method: impl Into<String>) -> Self {
        self.signing_method = Some(method.into());
        self
    }

    /// Set the signing method under its legacy name
    #[deprecated(note = "use `signing_method`")]
    pub fn encryption_method(self, method: impl Into<String>) -> Self {
        self.signing_method(method)
    }

    /// Sign with the requesting application's secret instead of a configured one
    pub fn use_application_secret(mut self, enabled: bool) -> Self {
        self.use_application_secret = enabled;
        self
    }

    /// Freeze the configuration
    pub fn build(self) -> SigningConfig {
        SigningConfig {
            payload_producer: self
                .payload_producer
                .unwrap_or_else(|| Arc::new(default_payload)),
            header_producer: self
                .header_producer
                .unwrap_or_else(|| Arc::new(default_headers)),
            raw_secret: self.raw_secret,
            secret_file_path: self.secret_file_path,
            signing_method: self.signing_method,
            use_application_secret: self.use_application_secret,
        }
    }
}

/// Signing settings as loaded from a configuration source
///
/// ```toml
/// signing_method = "rs512"
/// secret_key_path = "/etc/issuer/private.pem"
/// use_application_secret = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Shared secret or PEM text
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub secret_key: Option<SecretString>,
    /// Path of a PEM key file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key_path: Option<PathBuf>,
    /// Signing method (legacy name: `encryption_method`)
    #[serde(alias = "encryption_method", skip_serializing_if = "Option::is_none")]
    pub signing_method: Option<String>,
    /// Sign with the requesting application's secret
    pub use_application_secret: bool,
}

impl SigningSettings {
    /// Seed a builder with these settings
    ///
    /// Producers keep their defaults until set on the returned builder.
    pub fn into_builder(self) -> SigningConfigBuilder {
        let mut builder =
            SigningConfig::builder().use_application_secret(self.use_application_secret);
        if let Some(secret) = self.secret_key {
            builder = builder.secret_key(secret);
        }
        if let Some(path) = self.secret_key_path {
            builder = builder.secret_key_path(path);
        }
        if let Some(method) = self.signing_method {
            builder = builder.signing_method(method);
        }
        builder
    }
}

// Custom serialization for SecretString
fn serialize_secret<S>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

// Custom deserialization for SecretString
fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secret = Option::<String>::deserialize(deserializer)?;
    Ok(secret.map(SecretString::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_bytes(secret: &RawSecret) -> Option<&[u8]> {
        match secret {
            RawSecret::Bytes(bytes) => Some(bytes.expose_secret().as_slice()),
            RawSecret::Parsed { .. } => None,
        }
    }

    #[test]
    fn test_defaults() {
        let config = SigningConfig::default();

        assert!(config.raw_secret().is_none());
        assert!(config.secret_file_path().is_none());
        assert!(config.signing_method().is_none());
        assert!(!config.use_application_secret());
        assert_eq!(config.normalized_method().as_str(), "none");
        assert!(config.headers(&RequestContext::new()).is_empty());
    }

    #[test]
    fn test_default_payload_is_random_hex_token() {
        let config = SigningConfig::default();
        let ctx = RequestContext::new();

        let first = config.payload(&ctx);
        let second = config.payload(&ctx);

        let token = first["token"].as_str().unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_custom_producers_see_context() {
        let config = SigningConfig::builder()
            .token_payload(|ctx| {
                let mut claims = Claims::new();
                let owner = ctx.param("resource_owner_id").cloned().unwrap_or(json!(null));
                claims.insert("foo".into(), json!(format!("bar_{owner}")));
                claims
            })
            .token_headers(|ctx| {
                let mut headers = Headers::new();
                if let Some(uid) = ctx.application().and_then(|app| app.uid()) {
                    headers.insert("kid".into(), json!(uid));
                }
                headers
            })
            .build();

        let ctx = RequestContext::new()
            .with_param("resource_owner_id", 1)
            .with_application(crate::Application::plain(json!({ "uid": "foo" })));

        assert_eq!(config.payload(&ctx)["foo"], json!("bar_1"));
        assert_eq!(config.headers(&ctx)["kid"], json!("foo"));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = SigningConfig::builder()
            .secret_key("foo")
            .secret_key_path("/etc/issuer/private.pem")
            .signing_method("rs512")
            .use_application_secret(true)
            .build();

        assert_eq!(config.raw_secret().and_then(raw_bytes), Some(&b"foo"[..]));
        assert_eq!(
            config.secret_file_path(),
            Some(Path::new("/etc/issuer/private.pem"))
        );
        assert_eq!(config.signing_method(), Some("rs512"));
        assert!(config.use_application_secret());
    }

    #[test]
    #[allow(deprecated)]
    fn test_legacy_encryption_method() {
        let config = SigningConfig::builder().encryption_method("rs512").build();
        assert_eq!(config.normalized_method().as_str(), "RS512");
    }

    #[test]
    fn test_settings_deserialize_with_legacy_alias() {
        let settings: SigningSettings = serde_json::from_value(json!({
            "secret_key": "super secret",
            "encryption_method": "hs256",
        }))
        .unwrap();

        assert_eq!(settings.signing_method.as_deref(), Some("hs256"));
        assert!(!settings.use_application_secret);

        let config = settings.into_builder().build();
        assert_eq!(config.normalized_method().as_str(), "HS256");
        assert_eq!(
            config.raw_secret().and_then(raw_bytes),
            Some(&b"super secret"[..])
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = SigningConfig::builder().secret_key("super secret").build();
        assert!(!format!("{config:?}").contains("super secret"));

        let settings = SigningSettings {
            secret_key: Some(SecretString::new("super secret".into())),
            ..Default::default()
        };
        assert!(!format!("{settings:?}").contains("super secret"));
    }
}
