//! # jwt-issuer-cli
//!
//! Command-line front end over [`jwt_issuer`]: load signing settings, build a
//! request context from flags and print one token.
//!
//! ```bash
//! # Unsigned token with a random id
//! jwt-issuer-cli issue
//!
//! # HS256 with claims and a key id
//! JWT_ISSUER_SECRET_KEY=secret JWT_ISSUER_SIGNING_METHOD=hs256 \
//!     jwt-issuer-cli issue --claims '{"sub":"42"}' --header kid=k1
//!
//! # RS512 from a settings file
//! jwt-issuer-cli issue --config issuer.toml
//! ```

pub mod cli;
pub mod error;

use std::path::Path;

use config::{Config, Environment, File};
use jwt_issuer::{
    Application, Claims, Headers, RequestContext, SigningConfig, SigningSettings, TokenIssuer,
};
use serde_json::{Map, Value};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub use cli::{Cli, Commands, IssueArgs};
pub use error::{CliError, CliResult};

/// Prefix for environment overrides of the signing settings
pub const ENV_PREFIX: &str = "JWT_ISSUER";

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load signing settings from `path` (if any) and `JWT_ISSUER_*` variables
///
/// # Errors
///
/// Returns [`CliError::Config`] if the file is missing, has an unknown
/// extension or does not deserialize into [`SigningSettings`].
pub fn load_settings(path: Option<&Path>) -> CliResult<SigningSettings> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        debug!(path = %path.display(), "Loading signing settings file");
        builder = builder.add_source(File::from(path));
    }

    // Environment variables override file settings
    let config = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Parse `--claims` into a claims map
///
/// # Errors
///
/// Returns [`CliError::Json`] for malformed JSON and
/// [`CliError::InvalidArguments`] when the value is not an object.
pub fn parse_claims(input: &str) -> CliResult<Claims> {
    match serde_json::from_str(input)? {
        Value::Object(claims) => Ok(claims),
        other => Err(CliError::InvalidArguments(format!(
            "--claims must be a JSON object, got {other}"
        ))),
    }
}

/// Build the signing configuration for `args` on top of `settings`
///
/// # Errors
///
/// Returns an error if `--claims` is not a JSON object.
pub fn signing_config(settings: SigningSettings, args: &IssueArgs) -> CliResult<SigningConfig> {
    let mut builder = settings.into_builder();

    if let Some(input) = &args.claims {
        let claims = parse_claims(input)?;
        builder = builder.token_payload(move |_| claims.clone());
    }

    if !args.headers.is_empty() {
        let headers: Headers = args.headers.iter().cloned().collect();
        builder = builder.token_headers(move |_| headers.clone());
    }

    Ok(builder.build())
}

/// Build the request context for `args`
///
/// An application is attached when `--client-id` or `--application-secret`
/// is given.
pub fn request_context(args: &IssueArgs) -> RequestContext {
    let mut ctx = args
        .params
        .iter()
        .fold(RequestContext::new(), |ctx, (key, value)| {
            ctx.with_param(key.clone(), value.clone())
        });

    if args.client_id.is_some() || args.application_secret.is_some() {
        let mut application = Map::new();
        if let Some(uid) = &args.client_id {
            application.insert("uid".into(), Value::String(uid.clone()));
        }
        if let Some(secret) = &args.application_secret {
            application.insert("secret".into(), Value::String(secret.clone()));
        }
        ctx = ctx.with_application(Application::from(application));
    }

    ctx
}

/// Issue one token for `args`
///
/// # Errors
///
/// Returns configuration, argument and issuer errors.
pub fn issue(args: &IssueArgs) -> CliResult<String> {
    let settings = load_settings(args.config.as_deref())?;
    debug!(settings = ?settings, "Signing settings loaded");

    let issuer = TokenIssuer::with_config(signing_config(settings, args)?);
    Ok(issuer.generate(&request_context(args))?)
}

/// Run the parsed command line
///
/// # Errors
///
/// Returns any error from the subcommand.
pub fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Issue(args) => {
            let token = issue(&args)?;
            println!("{token}");
        }
    }
    Ok(())
}
