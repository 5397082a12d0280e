//! Posting API credentials.
//!
//! All four OAuth 1.0a secrets are required. They are read from the process
//! environment after loading an optional `.env` file, and validated together
//! so a misconfigured run reports every missing name at once, before any
//! network activity.

use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument};

pub const CONSUMER_KEY: &str = "TWITTER_CONSUMER_KEY";
pub const CONSUMER_SECRET: &str = "TWITTER_CONSUMER_SECRET";
pub const ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_TOKEN_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";

const REQUIRED: [&str; 4] = [CONSUMER_KEY, CONSUMER_SECRET, ACCESS_TOKEN, ACCESS_TOKEN_SECRET];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Missing Twitter API credentials: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// OAuth 1.0a user-context credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Load `.env` (if present) and read the credentials from the environment.
    #[instrument(level = "info")]
    pub fn from_env() -> Result<Self, CredentialsError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) => debug!(error = %e, "No .env loaded"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the credentials through `lookup`. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialsError> {
        let values: Vec<Option<String>> = REQUIRED
            .iter()
            .map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
            .collect();

        let missing: Vec<&'static str> = REQUIRED
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_none())
            .map(|(key, _)| *key)
            .collect();
        if !missing.is_empty() {
            return Err(CredentialsError::Missing(missing));
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            consumer_key: next(),
            consumer_secret: next(),
            access_token: next(),
            access_token_secret: next(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_all_present() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (CONSUMER_KEY, "ck"),
            (CONSUMER_SECRET, "cs"),
            (ACCESS_TOKEN, "at"),
            (ACCESS_TOKEN_SECRET, "ats"),
        ]))
        .unwrap();
        assert_eq!(creds.consumer_key, "ck");
        assert_eq!(creds.consumer_secret, "cs");
        assert_eq!(creds.access_token, "at");
        assert_eq!(creds.access_token_secret, "ats");
    }

    #[test]
    fn test_reports_every_missing_name() {
        let err = Credentials::from_lookup(lookup_from(&[
            (CONSUMER_KEY, "ck"),
            (ACCESS_TOKEN, "  "),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            CredentialsError::Missing(vec![CONSUMER_SECRET, ACCESS_TOKEN, ACCESS_TOKEN_SECRET])
        );
        assert_eq!(
            err.to_string(),
            "Missing Twitter API credentials: TWITTER_CONSUMER_SECRET, TWITTER_ACCESS_TOKEN, TWITTER_ACCESS_TOKEN_SECRET"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials {
            consumer_key: "ck".into(),
            consumer_secret: "super-secret".into(),
            access_token: "token".into(),
            access_token_secret: "token-secret".into(),
        };
        let shown = format!("{:?}", creds);
        assert!(!shown.contains("super-secret"));
        assert!(!shown.contains("token-secret"));
    }
}
