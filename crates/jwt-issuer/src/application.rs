//! Application secret extraction
//!
//! Used when the configuration signs tokens with the requesting client's own
//! secret. A secret stored as a one-way hash can't sign anything the client
//! could verify, so a non-restorable strategy is a hard failure.

use secrecy::{ExposeSecret, SecretVec};
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::{Application, RequestContext};
use crate::error::{IssuerError, IssuerResult};

/// Pull the signing secret out of the request's application
///
/// # Errors
///
/// - [`IssuerError::MissingApplication`] if the context carries no application
/// - [`IssuerError::SecretNotRestorable`] if the application's secret strategy
///   can't restore plaintext secrets
/// - [`IssuerError::MissingSecret`] if the secret is absent or empty
pub fn extract_application_secret(ctx: &RequestContext) -> IssuerResult<SecretVec<u8>> {
    let application = ctx.application().ok_or_else(|| {
        warn!("Application secret requested but request has no application");
        IssuerError::MissingApplication
    })?;

    let secret: Option<Vec<u8>> = match application {
        Application::Capability(holder) => {
            if !holder.secret_strategy().allows_restoring_secrets() {
                warn!(
                    uid = ?holder.uid(),
                    "Application secret strategy doesn't allow restoring plaintext secrets"
                );
                return Err(IssuerError::SecretNotRestorable);
            }
            holder
                .plaintext_secret()
                .map(|secret| secret.expose_secret().as_bytes().to_vec())
        }
        Application::Plain(map) => match map.get("secret") {
            Some(Value::String(secret)) => Some(secret.as_bytes().to_vec()),
            _ => None,
        },
    };

    match secret {
        Some(secret) if !secret.is_empty() => {
            debug!(uid = ?application.uid(), "Using application secret");
            Ok(SecretVec::new(secret))
        }
        _ => {
            warn!(uid = ?application.uid(), "Application secret is missing or empty");
            Err(IssuerError::MissingSecret)
        }
    }
}
