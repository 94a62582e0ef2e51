//! Error types for token issuance
//!
//! Every failure in secret resolution or encoding is surfaced to the caller.
//! Issuing a token with the wrong signature (or none) is never a fallback.

use std::path::PathBuf;

use thiserror::Error;

use crate::key::KeyFamily;

/// Result type for issuer operations
pub type IssuerResult<T> = std::result::Result<T, IssuerError>;

/// Errors that can occur while resolving key material or issuing a token
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IssuerError {
    /// No signing configuration has been installed on the issuer
    #[error("Configuration for the token issuer is missing")]
    MissingConfiguration,

    /// `use_application_secret` is set but the request carries no application
    ///
    /// This usually means `client_id` was absent from the request parameters.
    #[error(
        "`use_application_secret` is enabled, but the request context has no application \
         (was `client_id` absent from the request?)"
    )]
    MissingApplication,

    /// The application's secret strategy stores secrets one-way hashed
    #[error(
        "`use_application_secret` is enabled, but the application's secret strategy \
         doesn't allow restoring the plaintext secret"
    )]
    SecretNotRestorable,

    /// The resolved secret is absent or empty
    #[error("Signing secret is missing or empty")]
    MissingSecret,

    /// Key material could not be parsed
    #[error("Failed to parse {family} key: {source}")]
    KeyParse {
        /// Family the key was parsed as
        family: KeyFamily,
        /// Underlying parser error
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    /// A pre-parsed key does not belong to the family the signing method requires
    #[error("Configured key is {actual} but signing method requires {expected}")]
    KeyFamilyMismatch {
        /// Family implied by the signing method
        expected: KeyFamily,
        /// Family of the configured key
        actual: KeyFamily,
    },

    /// The key file could not be read
    #[error("Failed to read key file {}: {source}", path.display())]
    Io {
        /// Configured key file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A key file is configured but the signing method names no asymmetric family
    #[error(
        "A secret key file is configured, but signing method {method} is neither RSA (RSxxx) \
         nor ECDSA (ESxxx)"
    )]
    UnsupportedFileKeyAlgorithm {
        /// Normalized signing method
        method: String,
    },

    /// The encoder does not know the algorithm name
    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A signing algorithm was requested but no key material was resolved
    #[error("Algorithm {algorithm} requires a signing key, but none was resolved")]
    MissingSigningKey {
        /// Algorithm name handed to the encoder
        algorithm: String,
    },

    /// The resolved key cannot be used with the algorithm
    #[error("Algorithm {algorithm} cannot sign with {key} key material")]
    KeyMismatch {
        /// Algorithm name handed to the encoder
        algorithm: String,
        /// Description of the resolved key
        key: &'static str,
    },

    /// The signing operation itself failed
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// ES512 signing failed
    #[error("ES512 signing failed: {0}")]
    EcdsaSigning(#[source] p521::ecdsa::signature::Error),

    /// Claims or headers could not be serialized
    #[error("Token serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IssuerError {
    /// Whether the error stems from configuration or request input
    ///
    /// All issuer errors are non-transient; this only separates problems with
    /// the installed configuration from problems with a particular request.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::MissingApplication | Self::SecretNotRestorable | Self::MissingSecret
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_the_path() {
        let err = IssuerError::Io {
            path: PathBuf::from("/etc/keys/missing.pem"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read key file /etc/keys/missing.pem: not found"
        );
    }

    #[test]
    fn test_request_error_classification() {
        assert!(IssuerError::MissingApplication.is_request_error());
        assert!(IssuerError::SecretNotRestorable.is_request_error());
        assert!(!IssuerError::MissingConfiguration.is_request_error());
        assert!(
            !IssuerError::UnsupportedFileKeyAlgorithm {
                method: "HS256".into()
            }
            .is_request_error()
        );
    }
}
