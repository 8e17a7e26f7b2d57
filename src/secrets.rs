//! Secrets loading: the credential store and the API key.
//!
//! Secrets live in a TOML file laid out like a Streamlit `secrets.toml`:
//!
//! ```toml
//! OPENAI_API_KEY = "sk-..."
//!
//! [passwords]
//! alice = "correct horse"
//! ```
//!
//! Unknown keys are ignored so the same file can carry other sections.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

const API_KEY_FIELD: &str = "OPENAI_API_KEY";
const PASSWORDS_FIELD: &str = "passwords";

#[derive(Debug, Deserialize)]
struct RawSecrets {
    #[serde(rename = "OPENAI_API_KEY")]
    openai_api_key: Option<String>,
    passwords: Option<HashMap<String, String>>,
}

/// Immutable mapping of allowed usernames to their passwords
#[derive(Clone, Default)]
pub struct CredentialStore {
    entries: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Build a store from (username, password) pairs
    pub fn from_pairs<I, U, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(u, p)| (u.into(), p.into()))
                .collect(),
        }
    }

    /// Stored password for `username`, if the user is known
    pub fn password_for(&self, username: &str) -> Option<&str> {
        self.entries.get(username).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("users", &self.entries.len())
            .finish()
    }
}

/// API key for the chat-completion service. Never printed.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Everything the process needs from the secrets file
#[derive(Debug, Clone)]
pub struct Secrets {
    pub credentials: CredentialStore,
    pub api_key: ApiKey,
}

impl Secrets {
    /// Load and validate a secrets file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Secrets(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    /// Parse secrets from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let raw: RawSecrets =
            toml::from_str(contents).map_err(|e| Error::Secrets(e.to_string()))?;

        let passwords = raw
            .passwords
            .ok_or_else(|| Error::MissingSecret(PASSWORDS_FIELD.to_string()))?;
        if passwords.is_empty() {
            return Err(Error::MissingSecret(format!(
                "{} (table has no users)",
                PASSWORDS_FIELD
            )));
        }

        let api_key = raw
            .openai_api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| Error::MissingSecret(API_KEY_FIELD.to_string()))?;

        Ok(Self {
            credentials: CredentialStore::new(passwords),
            api_key: ApiKey::new(api_key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
OPENAI_API_KEY = "sk-test"

[passwords]
alice = "wonderland"
bob = "builder"
"#;

    #[test]
    fn test_parse_valid_secrets() {
        let secrets = Secrets::parse(VALID).unwrap();
        assert_eq!(secrets.credentials.len(), 2);
        assert_eq!(secrets.credentials.password_for("alice"), Some("wonderland"));
        assert_eq!(secrets.credentials.password_for("carol"), None);
        assert_eq!(secrets.api_key.expose(), "sk-test");
    }

    #[test]
    fn test_missing_passwords_is_fatal() {
        let err = Secrets::parse(r#"OPENAI_API_KEY = "sk-test""#).unwrap_err();
        assert!(matches!(err, Error::MissingSecret(ref k) if k == "passwords"));
    }

    #[test]
    fn test_empty_passwords_is_fatal() {
        let err = Secrets::parse("OPENAI_API_KEY = \"sk\"\n[passwords]\n").unwrap_err();
        assert!(matches!(err, Error::MissingSecret(_)));
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Secrets::parse("[passwords]\nalice = \"x\"\n").unwrap_err();
        assert!(matches!(err, Error::MissingSecret(ref k) if k == "OPENAI_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_fatal() {
        let err = Secrets::parse("OPENAI_API_KEY = \"  \"\n[passwords]\nalice = \"x\"\n")
            .unwrap_err();
        assert!(matches!(err, Error::MissingSecret(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Secrets::parse("OPENAI_API_KEY = ").unwrap_err();
        assert!(matches!(err, Error::Secrets(_)));
    }

    #[test]
    fn test_unknown_sections_ignored() {
        let text = format!("{}\n[connections.db]\nurl = \"x\"\n", VALID);
        assert!(Secrets::parse(&text).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = Secrets::load("/nonexistent/secrets.toml").unwrap_err();
        assert!(matches!(err, Error::Secrets(_)));
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let secrets = Secrets::parse(VALID).unwrap();
        let debug = format!("{:?}", secrets);
        assert!(!debug.contains("wonderland"));
        assert!(!debug.contains("sk-test"));
        assert_eq!(secrets.api_key.to_string(), "<redacted>");
    }
}
