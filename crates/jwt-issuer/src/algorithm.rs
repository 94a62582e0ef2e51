//! Signing method normalization and key family inference
//!
//! The normalized method name is computed once per request and shared by the
//! secret resolver and the encoder call, so the key family chosen for the
//! secret always agrees with the `alg` reported in the token header.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::key::KeyFamily;

/// Normalized signing method name
///
/// An absent method normalizes to `"none"`; a configured one to its
/// upper-cased form (`hs256` becomes `HS256`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SigningMethod(String);

impl SigningMethod {
    /// Algorithm name for unsigned tokens
    pub const NONE: &'static str = "none";

    /// Normalize an optional, case-insensitive method name
    pub fn normalize(method: Option<&str>) -> Self {
        match method {
            Some(method) => Self(method.to_uppercase()),
            None => Self(Self::NONE.to_string()),
        }
    }

    /// The normalized name, as reported to the encoder
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this names the unsigned `"none"` algorithm, in any case
    pub fn is_none(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::NONE)
    }

    /// Whether the name contains `RS` followed by exactly three digits
    pub fn is_rsa(&self) -> bool {
        static RSA_RE: OnceLock<Regex> = OnceLock::new();
        RSA_RE
            .get_or_init(|| Regex::new(r"RS\d{3}").expect("static regex is valid"))
            .is_match(&self.0)
    }

    /// Whether the name contains `ES` followed by exactly three digits
    pub fn is_ecdsa(&self) -> bool {
        static ECDSA_RE: OnceLock<Regex> = OnceLock::new();
        ECDSA_RE
            .get_or_init(|| Regex::new(r"ES\d{3}").expect("static regex is valid"))
            .is_match(&self.0)
    }

    /// Asymmetric key family implied by the method, RSA taking precedence
    pub fn key_family(&self) -> Option<KeyFamily> {
        if self.is_rsa() {
            Some(KeyFamily::Rsa)
        } else if self.is_ecdsa() {
            Some(KeyFamily::Ec)
        } else {
            None
        }
    }
}

impl fmt::Display for SigningMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SigningMethod {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_method_normalizes_to_none() {
        let method = SigningMethod::normalize(None);
        assert_eq!(method.as_str(), "none");
        assert!(method.is_none());
        assert_eq!(method.key_family(), None);
    }

    #[test]
    fn test_method_is_upper_cased() {
        assert_eq!(SigningMethod::normalize(Some("hs256")).as_str(), "HS256");
        assert_eq!(SigningMethod::normalize(Some("Rs512")).as_str(), "RS512");
        assert!(SigningMethod::normalize(Some("none")).is_none());
        assert!(!SigningMethod::normalize(Some("hs256")).is_none());
    }

    #[test]
    fn test_family_inference() {
        let family = |m: &str| SigningMethod::normalize(Some(m)).key_family();

        assert_eq!(family("rs256"), Some(KeyFamily::Rsa));
        assert_eq!(family("RS512"), Some(KeyFamily::Rsa));
        assert_eq!(family("es256"), Some(KeyFamily::Ec));
        assert_eq!(family("ES512"), Some(KeyFamily::Ec));
        assert_eq!(family("hs256"), None);
        assert_eq!(family("ps256"), None);
        assert_eq!(family("rs25"), None);
    }

    #[test]
    fn test_family_inference_accepts_unknown_sizes() {
        assert_eq!(
            SigningMethod::normalize(Some("rs999")).key_family(),
            Some(KeyFamily::Rsa)
        );
        assert_eq!(
            SigningMethod::normalize(Some("es768")).key_family(),
            Some(KeyFamily::Ec)
        );
    }
}
