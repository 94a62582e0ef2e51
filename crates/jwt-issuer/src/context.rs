//! Per-request context
//!
//! A [`RequestContext`] is created for each `generate` call. It optionally
//! carries the OAuth application (client) the token is issued for, plus free
//! request parameters the payload and header producers may read.
//!
//! Applications come from a host framework this crate does not own, so they
//! are accepted in two shapes:
//!
//! - [`Application::Capability`] - an object implementing [`SecretHolder`],
//!   which knows whether its stored secret can be restored to plaintext
//! - [`Application::Plain`] - a plain mapping with a `"secret"` entry

use std::fmt;
use std::sync::Arc;

use secrecy::SecretString;
use serde_json::{Map, Value};

/// How an application's secret is stored
pub trait SecretStrategy: Send + Sync {
    /// Whether stored secrets can be turned back into plaintext
    ///
    /// Hashing strategies return `false`.
    fn allows_restoring_secrets(&self) -> bool;
}

/// Application exposing its secret through capabilities
pub trait SecretHolder: Send + Sync {
    /// Plaintext secret, if one is available
    fn plaintext_secret(&self) -> Option<SecretString>;

    /// Strategy the secret is stored with
    fn secret_strategy(&self) -> &dyn SecretStrategy;

    /// Public client identifier
    fn uid(&self) -> Option<String> {
        None
    }
}

/// Secret strategy that keeps secrets in plaintext
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainSecretStrategy;

impl SecretStrategy for PlainSecretStrategy {
    fn allows_restoring_secrets(&self) -> bool {
        true
    }
}

/// Secret strategy that stores one-way hashes
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedSecretStrategy;

impl SecretStrategy for HashedSecretStrategy {
    fn allows_restoring_secrets(&self) -> bool {
        false
    }
}

/// The OAuth application a token is issued for
#[derive(Clone)]
pub enum Application {
    /// Capability-bearing application object
    Capability(Arc<dyn SecretHolder>),
    /// Legacy plain mapping (`{"uid": ..., "secret": ...}`)
    Plain(Map<String, Value>),
}

impl Application {
    /// Wrap a capability-bearing application
    pub fn capability(holder: impl SecretHolder + 'static) -> Self {
        Self::Capability(Arc::new(holder))
    }

    /// Wrap a plain mapping
    ///
    /// A value that is not a JSON object yields an application with no entries.
    pub fn plain(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Plain(map),
            _ => Self::Plain(Map::new()),
        }
    }

    /// Public client identifier, if known
    pub fn uid(&self) -> Option<String> {
        match self {
            Self::Capability(holder) => holder.uid(),
            Self::Plain(map) => map.get("uid").and_then(Value::as_str).map(str::to_string),
        }
    }
}

impl From<Map<String, Value>> for Application {
    fn from(map: Map<String, Value>) -> Self {
        Self::Plain(map)
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capability(holder) => f
                .debug_struct("Application::Capability")
                .field("uid", &holder.uid())
                .field(
                    "restorable",
                    &holder.secret_strategy().allows_restoring_secrets(),
                )
                .finish(),
            // Plain maps may hold the secret; only show the keys
            Self::Plain(map) => f
                .debug_struct("Application::Plain")
                .field("keys", &map.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Context for a single token request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    application: Option<Application>,
    params: Map<String, Value>,
}

impl RequestContext {
    /// Empty context: no application, no parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the application the token is issued for
    pub fn with_application(mut self, application: impl Into<Application>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Add a request parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The application, if any
    pub fn application(&self) -> Option<&Application> {
        self.application.as_ref()
    }

    /// A request parameter
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// All request parameters
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Client;

    impl SecretHolder for Client {
        fn plaintext_secret(&self) -> Option<SecretString> {
            Some(SecretString::new("s3cret".into()))
        }

        fn secret_strategy(&self) -> &dyn SecretStrategy {
            &HashedSecretStrategy
        }

        fn uid(&self) -> Option<String> {
            Some("client-1".into())
        }
    }

    #[test]
    fn test_context_builder() {
        let ctx = RequestContext::new()
            .with_param("resource_owner_id", 42)
            .with_param("scope", "read");

        assert!(ctx.application().is_none());
        assert_eq!(ctx.param("resource_owner_id"), Some(&json!(42)));
        assert_eq!(ctx.params().len(), 2);
    }

    #[test]
    fn test_application_uid() {
        assert_eq!(
            Application::plain(json!({ "uid": "foo" })).uid().as_deref(),
            Some("foo")
        );
        assert_eq!(Application::capability(Client).uid().as_deref(), Some("client-1"));
        assert_eq!(Application::plain(json!("not a map")).uid(), None);
    }

    #[test]
    fn test_debug_hides_plain_secret() {
        let app = Application::plain(json!({ "uid": "foo", "secret": "hunter2" }));
        let rendered = format!("{app:?}");
        assert!(rendered.contains("secret"));
        assert!(!rendered.contains("hunter2"));

        let rendered = format!("{:?}", Application::capability(Client));
        assert!(rendered.contains("restorable: false"));
        assert!(!rendered.contains("s3cret"));
    }
}
