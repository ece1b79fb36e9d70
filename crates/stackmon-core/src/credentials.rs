//! Vendor API credentials.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

/// A username/token pair for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub token: String,
}

impl Credentials {
    /// Returns `None` when either half is empty.
    pub fn new(user: &str, token: &str) -> Option<Self> {
        if user.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self {
            user: user.to_string(),
            token: token.to_string(),
        })
    }

    /// Read a secret string shaped like `{"<user>": "<token>"}`.
    ///
    /// Unparseable or empty secrets yield `None`. With several entries the
    /// first one in key order is used.
    pub fn from_secret_json(secret: &str) -> Option<Self> {
        let entries: BTreeMap<String, String> = match serde_json::from_str(secret) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "secret is not a JSON object of strings");
                return None;
            }
        };

        if entries.len() > 1 {
            warn!(entries = entries.len(), "secret holds several users, using the first");
        }

        let (user, token) = entries.iter().next()?;
        let credentials = Self::new(user, token);
        if credentials.is_none() {
            warn!("secret holds an empty user or token");
        }
        credentials
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_entry() {
        let creds = Credentials::from_secret_json(r#"{"alice":"s3cret"}"#).unwrap();
        assert_eq!(creds.user, "alice");
        assert_eq!(creds.token, "s3cret");
    }

    #[test]
    fn empty_values_are_unusable() {
        assert!(Credentials::from_secret_json(r#"{"alice":""}"#).is_none());
        assert!(Credentials::from_secret_json(r#"{"":"tok"}"#).is_none());
        assert!(Credentials::from_secret_json("{}").is_none());
    }

    #[test]
    fn garbage_is_unusable() {
        assert!(Credentials::from_secret_json("not json").is_none());
        assert!(Credentials::from_secret_json(r#"{"alice": 3}"#).is_none());
    }

    #[test]
    fn several_entries_pick_first_key() {
        let creds = Credentials::from_secret_json(r#"{"zed":"z","bob":"b"}"#).unwrap();
        assert_eq!(creds.user, "bob");
    }

    #[test]
    fn debug_hides_token() {
        let creds = Credentials::new("alice", "s3cret").unwrap();
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("s3cret"));
    }
}
