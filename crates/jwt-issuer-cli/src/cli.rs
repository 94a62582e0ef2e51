//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// Main CLI application structure
#[derive(Parser, Debug)]
#[command(
    name = "jwt-issuer-cli",
    version,
    about = "Issue bearer tokens from a signing configuration",
    long_about = "Issues one JWT bearer token per invocation and prints it to stdout.\n\
                  Signing settings come from an optional config file (TOML, YAML or JSON)\n\
                  overridden by JWT_ISSUER_* environment variables:\n\
                  JWT_ISSUER_SECRET_KEY, JWT_ISSUER_SECRET_KEY_PATH,\n\
                  JWT_ISSUER_SIGNING_METHOD, JWT_ISSUER_USE_APPLICATION_SECRET.\n\n\
                  Secrets passed on the command line may end up in shell history."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue a token
    Issue(IssueArgs),
}

/// Arguments for `issue`
#[derive(Args, Debug, Clone, Default)]
pub struct IssueArgs {
    /// Signing settings file
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Token claims as a JSON object (default: a random token id)
    #[arg(long, value_name = "JSON")]
    pub claims: Option<String>,

    /// Extra JOSE header entry; the value is parsed as JSON when possible
    #[arg(long = "header", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub headers: Vec<(String, Value)>,

    /// Request parameter visible to the payload and header producers
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub params: Vec<(String, Value)>,

    /// Client id of the requesting application
    #[arg(long, value_name = "UID")]
    pub client_id: Option<String>,

    /// Secret of the requesting application
    #[arg(long, value_name = "SECRET")]
    pub application_secret: Option<String>,
}

/// Parse `KEY=VALUE`, reading VALUE as JSON and falling back to a string
pub fn parse_key_value(input: &str) -> Result<(String, Value), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{input}'"))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{input}'"));
    }

    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("kid=key-1").unwrap(),
            ("kid".to_string(), json!("key-1"))
        );
        assert_eq!(
            parse_key_value("resource_owner_id=7").unwrap(),
            ("resource_owner_id".to_string(), json!(7))
        );
        assert_eq!(
            parse_key_value("x5t=a=b").unwrap(),
            ("x5t".to_string(), json!("a=b"))
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=v").is_err());
    }

    #[test]
    fn test_issue_args() {
        let cli = Cli::try_parse_from([
            "jwt-issuer-cli",
            "issue",
            "--claims",
            r#"{"sub":"42"}"#,
            "--header",
            "kid=k1",
            "--header",
            "typ=JWT",
            "--param",
            "scope=read",
            "--client-id",
            "app",
        ])
        .unwrap();

        let Commands::Issue(args) = cli.command;
        assert_eq!(args.claims.as_deref(), Some(r#"{"sub":"42"}"#));
        assert_eq!(args.headers.len(), 2);
        assert_eq!(args.params, vec![("scope".to_string(), json!("read"))]);
        assert_eq!(args.client_id.as_deref(), Some("app"));
        assert!(args.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_rejects_malformed_header() {
        assert!(Cli::try_parse_from(["jwt-issuer-cli", "issue", "--header", "kid"]).is_err());
    }
}
