//! OAuth2 token as cached by the client and handed to the token saver.

use std::fmt;
use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::client::SecureString;

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// An access token issued by the ControlShift token endpoint.
///
/// The client only looks at the access token and the expiry. The rest is
/// kept so a host application can persist the token as received and seed a
/// later client with it.
///
/// Serialized with `expires_at` as an RFC 3339 timestamp, so a persisted
/// token keeps its expiry across process restarts.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    access_token: SecureString,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<Timestamp>,
    // Kept for persistence only; a refresh always re-runs the client-credentials grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<SecureString>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    scopes: Vec<String>,
}

impl Token {
    /// Creates a bearer token without a known expiry.
    pub fn new(access_token: impl Into<SecureString>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expires_at: None,
            refresh_token: None,
            scopes: Vec::new(),
        }
    }

    /// Sets the expiry relative to now.
    #[must_use]
    pub fn with_expiry(mut self, expires_in: Duration) -> Self {
        let expires_at = SignedDuration::try_from(expires_in)
            .ok()
            .and_then(|delta| Timestamp::now().checked_add(delta).ok())
            .unwrap_or(Timestamp::MAX);
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the absolute expiry.
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Sets the token type reported by the endpoint.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = token_type.into();
        self
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<SecureString>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the granted scopes.
    #[must_use]
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the access token value.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Returns the token type, `Bearer` for ControlShift.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Returns when the token expires, if known.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Returns the refresh token if the endpoint issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_ref().map(SecureString::as_str)
    }

    /// Returns the granted scopes.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Checks if the token is expired.
    ///
    /// Returns `false` if the token has no expiration time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Timestamp::now() >= exp)
    }

    /// Returns the time until expiration, if known and not already past.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at
            .and_then(|exp| Duration::try_from(Timestamp::now().duration_until(exp)).ok())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scopes", &self.scopes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_token() {
        let token = Token::new("access-token-123");
        assert_eq!(token.access_token(), "access-token-123");
        assert_eq!(token.token_type(), "Bearer");
        assert!(token.refresh_token().is_none());
        assert!(!token.is_expired());
        assert!(token.time_until_expiry().is_none());
    }

    #[test]
    fn should_track_expiry() {
        let token = Token::new("token").with_expiry(Duration::from_secs(7200));
        assert!(!token.is_expired());
        assert!(token.time_until_expiry().is_some());

        let token = Token::new("token").with_expiry(Duration::ZERO);
        assert!(token.is_expired());
        assert!(token.time_until_expiry().is_none());
    }

    #[test]
    fn should_redact_debug_output() {
        let token = Token::new("secret-token").with_refresh_token("secret-refresh");
        let debug_str = format!("{token:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret-token"));
        assert!(!debug_str.contains("secret-refresh"));
    }

    #[test]
    fn should_restore_persisted_token() {
        let json = r#"{
            "access_token": "persisted",
            "token_type": "bearer",
            "expires_at": "2000-01-01T00:00:00Z",
            "scopes": ["public"]
        }"#;
        let token: Token = serde_json::from_str(json).expect("valid token");

        assert_eq!(token.access_token(), "persisted");
        assert_eq!(token.token_type(), "bearer");
        assert_eq!(token.scopes(), ["public".to_string()]);
        assert!(token.is_expired());
    }

    #[test]
    fn should_default_token_type_when_missing() {
        let token: Token = serde_json::from_str(r#"{"access_token": "abc"}"#).expect("valid token");
        assert_eq!(token.token_type(), "Bearer");
        assert!(token.expires_at().is_none());
    }

    #[test]
    fn should_skip_absent_fields_when_persisting() {
        let json = serde_json::to_value(Token::new("abc")).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"access_token": "abc", "token_type": "Bearer"})
        );
    }
}
