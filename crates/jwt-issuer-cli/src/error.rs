//! Error types for CLI operations

use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command arguments
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Token issuance failed
    #[error("Issuer error: {0}")]
    Issuer(#[from] jwt_issuer::IssuerError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CliError {
    /// Get user-friendly suggestions for resolving the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidArguments(_) | Self::Json(_) => vec![
                "--claims must be a JSON object, e.g. '{\"sub\": \"42\"}'",
                "--header and --param take KEY=VALUE",
            ],
            Self::Issuer(err) if err.is_request_error() => vec![
                "Pass --application-secret when use_application_secret is enabled",
            ],
            Self::Issuer(_) => vec![
                "Check signing_method against the configured key",
                "RSxxx needs an RSA PEM key, ESxxx an EC PEM key",
            ],
            Self::Config(_) => vec![
                "Check the --config file syntax",
                "Environment overrides use the JWT_ISSUER_ prefix",
            ],
        }
    }
}

/// Result type for CLI operations
pub type CliResult<T> = std::result::Result<T, CliError>;
