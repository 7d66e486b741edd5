//! Client configuration: settings sources, explicit overrides, and their resolution.

use std::fmt;

use serde::Deserialize;
use url::Url;

use super::SecureString;
use super::error::ConfigError;
use super::oauth2::Token;

/// Settings key holding the OAuth2 client id.
pub const CLIENT_ID_KEY: &str = "CONTROLSHIFT_CLIENT_ID";
/// Settings key holding the OAuth2 client secret.
pub const CLIENT_SECRET_KEY: &str = "CONTROLSHIFT_CLIENT_SECRET";
/// Settings key holding the ControlShift instance URL.
pub const BASE_URL_KEY: &str = "CONTROLSHIFT_BASEURL";

const TOKEN_PATH: &str = "/oauth/token";

/// Partially known credentials, from a settings source or explicit arguments.
///
/// Deserializes from the upper-case keys used in host application settings
/// (`CONTROLSHIFT_CLIENT_ID`, ...) and also accepts snake_case field names.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// OAuth2 client id.
    #[serde(rename = "CONTROLSHIFT_CLIENT_ID", alias = "client_id", default)]
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    #[serde(rename = "CONTROLSHIFT_CLIENT_SECRET", alias = "client_secret", default)]
    pub client_secret: Option<SecureString>,
    /// Instance URL, e.g. `https://demo.controlshiftlabs.com`.
    #[serde(rename = "CONTROLSHIFT_BASEURL", alias = "base_url", default)]
    pub base_url: Option<String>,
}

impl Settings {
    /// Reads the settings keys through an arbitrary lookup.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            client_id: lookup(CLIENT_ID_KEY),
            client_secret: lookup(CLIENT_SECRET_KEY).map(SecureString::from),
            base_url: lookup(BASE_URL_KEY),
        }
    }

    /// Reads the settings keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Sets the client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the client secret.
    #[must_use]
    pub fn with_client_secret(mut self, client_secret: impl Into<SecureString>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Sets the instance URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Validated configuration of an [`AuthenticatedClient`](crate::AuthenticatedClient).
///
/// Obtained from [`ClientConfig::resolve`], so the three credentials are
/// always present and the base URL is a valid http(s) URL.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: SecureString,
    pub(crate) base_url: String,
    pub(crate) token_url: Url,
    pub(crate) token: Option<Token>,
    pub(crate) debug: bool,
}

impl ClientConfig {
    /// Merges an optional settings source with explicit overrides and validates the result.
    ///
    /// An override takes precedence over the settings source, even when it is empty.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingParameter`] when client id, client secret or base URL
    ///   is absent or empty after merging (reported in that order)
    /// - [`ConfigError::InvalidBaseUrl`] when the base URL is not an absolute http(s) URL
    pub fn resolve(settings: Option<&Settings>, overrides: Settings) -> Result<Self, ConfigError> {
        let source = settings.cloned().unwrap_or_default();

        let client_id = overrides
            .client_id
            .or(source.client_id)
            .filter(|it| !it.is_empty())
            .ok_or(ConfigError::MissingParameter { name: "client_id" })?;
        let client_secret = overrides
            .client_secret
            .or(source.client_secret)
            .filter(|it| !it.is_empty())
            .ok_or(ConfigError::MissingParameter {
                name: "client_secret",
            })?;
        let base_url = overrides
            .base_url
            .or(source.base_url)
            .filter(|it| !it.is_empty())
            .ok_or(ConfigError::MissingParameter { name: "base_url" })?;

        let (base_url, token_url) = Self::parse_base_url(&base_url)?;

        Ok(Self {
            client_id,
            client_secret,
            base_url,
            token_url,
            token: None,
            debug: false,
        })
    }

    fn parse_base_url(raw: &str) -> Result<(String, Url), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason,
        };

        let base_url = raw.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }

        let token_url =
            Url::parse(&format!("{base_url}{TOKEN_PATH}")).map_err(|err| invalid(err.to_string()))?;

        Ok((base_url, token_url))
    }

    /// Seeds the token cache with a previously obtained token.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Logs token save events when enabled.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Returns the OAuth2 client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the instance URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the token endpoint, `{base_url}/oauth/token`.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Returns the seed token, if any.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Returns `true` if token save events are logged.
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{path}", self.base_url))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("token", &self.token)
            .field("debug", &self.debug)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    const BASE: &str = "https://demo.controlshiftlabs.com";

    fn complete() -> Settings {
        Settings::default()
            .with_client_id("client-id")
            .with_client_secret("client-secret")
            .with_base_url(BASE)
    }

    #[test]
    fn should_resolve_from_overrides() {
        let config = ClientConfig::resolve(None, complete()).expect("valid config");

        assert_eq!(config.client_id(), "client-id");
        assert_eq!(config.client_secret.as_str(), "client-secret");
        assert_eq!(config.base_url(), BASE);
        assert_eq!(
            config.token_url().as_str(),
            "https://demo.controlshiftlabs.com/oauth/token"
        );
        assert!(config.token().is_none());
        assert!(!config.debug());
    }

    #[test]
    fn should_resolve_from_settings() {
        let config = ClientConfig::resolve(Some(&complete()), Settings::default())
            .expect("valid config");
        assert_eq!(config.client_id(), "client-id");
    }

    #[test]
    fn should_prefer_overrides_over_settings() {
        let overrides = Settings::default().with_client_id("explicit");
        let config = ClientConfig::resolve(Some(&complete()), overrides).expect("valid config");

        assert_eq!(config.client_id(), "explicit");
        assert_eq!(config.client_secret.as_str(), "client-secret");
    }

    #[rstest]
    #[case::missing_client_id(Settings { client_id: None, ..complete() }, "client_id")]
    #[case::empty_client_id(complete().with_client_id(""), "client_id")]
    #[case::missing_client_secret(Settings { client_secret: None, ..complete() }, "client_secret")]
    #[case::empty_client_secret(complete().with_client_secret(""), "client_secret")]
    #[case::missing_base_url(Settings { base_url: None, ..complete() }, "base_url")]
    #[case::empty_base_url(complete().with_base_url(""), "base_url")]
    #[case::nothing_at_all(Settings::default(), "client_id")]
    fn should_reject_missing_parameter(#[case] overrides: Settings, #[case] expected: &str) {
        let result = ClientConfig::resolve(None, overrides);

        match result.expect_err("should fail") {
            ConfigError::MissingParameter { name } => assert_eq!(name, expected),
            other => panic!("Expected MissingParameter, got {other:?}"),
        }
    }

    #[test]
    fn should_not_fall_back_to_settings_when_override_is_empty() {
        let overrides = Settings::default().with_base_url("");
        let result = ClientConfig::resolve(Some(&complete()), overrides);

        assert!(matches!(
            result,
            Err(ConfigError::MissingParameter { name: "base_url" })
        ));
    }

    #[rstest]
    #[case::not_a_url("not-a-url")]
    #[case::unsupported_scheme("ftp://demo.controlshiftlabs.com")]
    fn should_reject_invalid_base_url(#[case] base_url: &str) {
        let result = ClientConfig::resolve(None, complete().with_base_url(base_url));

        match result.expect_err("should fail") {
            ConfigError::InvalidBaseUrl { url, .. } => assert_eq!(url, base_url),
            other => panic!("Expected InvalidBaseUrl, got {other:?}"),
        }
    }

    #[test]
    fn should_trim_trailing_slash() {
        let config = ClientConfig::resolve(None, complete().with_base_url(format!("{BASE}/")))
            .expect("valid config");

        assert_eq!(config.base_url(), BASE);
        let endpoint = config
            .endpoint("/api/v1/members/lookup")
            .expect("valid endpoint");
        assert_eq!(
            endpoint.as_str(),
            "https://demo.controlshiftlabs.com/api/v1/members/lookup"
        );
    }

    #[test]
    fn should_read_settings_keys_from_lookup() {
        let values = HashMap::from([
            (CLIENT_ID_KEY, "id-from-env"),
            (CLIENT_SECRET_KEY, "secret-from-env"),
        ]);
        let settings = Settings::from_lookup(|key| values.get(key).map(ToString::to_string));

        assert_eq!(settings.client_id.as_deref(), Some("id-from-env"));
        assert!(settings.client_secret.is_some());
        assert!(settings.base_url.is_none());
    }

    #[test]
    fn should_deserialize_settings_keys() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "CONTROLSHIFT_CLIENT_ID": "id",
                "CONTROLSHIFT_CLIENT_SECRET": "secret",
                "base_url": "https://demo.controlshiftlabs.com"
            }"#,
        )
        .expect("valid settings");

        assert_eq!(settings, complete().with_client_id("id").with_client_secret("secret"));
    }

    #[test]
    fn should_redact_debug_output() {
        let config = ClientConfig::resolve(None, complete().with_client_secret("super-secret"))
            .expect("valid config");

        let config_debug = format!("{config:?}");
        assert!(config_debug.contains("[REDACTED]"));
        assert!(!config_debug.contains("super-secret"));

        let settings_debug = format!("{:?}", complete().with_client_secret("super-secret"));
        assert!(!settings_debug.contains("super-secret"));
    }
}
