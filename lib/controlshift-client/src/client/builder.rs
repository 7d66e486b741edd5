use super::oauth2::{NoopTokenSaver, Token, TokenSaver};
use super::{AuthenticatedClient, ClientConfig, ConfigError, Settings};

/// Builder for [`AuthenticatedClient`].
///
/// Credentials come from an optional [`Settings`] source and from explicit
/// `with_*` calls; explicit values win. Validation happens in [`build`](Self::build),
/// so a misconfigured client is never created.
///
/// # Example
///
/// ```rust
/// use controlshift_client::{AuthenticatedClient, Settings};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AuthenticatedClient::builder()
///     .with_settings(Settings::from_env())
///     .with_client_id("my-client-id")
///     .with_client_secret("my-client-secret")
///     .with_base_url("https://demo.controlshiftlabs.com")
///     .with_debug(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct AuthenticatedClientBuilder {
    settings: Option<Settings>,
    overrides: Settings,
    token: Option<Token>,
    debug: bool,
    token_saver: Option<Box<dyn TokenSaver>>,
    http: Option<reqwest::Client>,
}

impl AuthenticatedClientBuilder {
    /// Uses a settings source for the credentials not given explicitly.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the OAuth2 client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.overrides = self.overrides.with_client_id(client_id);
        self
    }

    /// Sets the OAuth2 client secret.
    #[must_use]
    pub fn with_client_secret(mut self, client_secret: impl Into<super::SecureString>) -> Self {
        self.overrides = self.overrides.with_client_secret(client_secret);
        self
    }

    /// Sets the instance URL, e.g. `https://demo.controlshiftlabs.com`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.overrides = self.overrides.with_base_url(base_url);
        self
    }

    /// Seeds the client with a previously obtained token, saving a grant request.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Logs every token save event (the token itself is redacted).
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the hook called whenever a new token is obtained.
    ///
    /// Defaults to [`NoopTokenSaver`].
    #[must_use]
    pub fn with_token_saver(mut self, token_saver: impl TokenSaver + 'static) -> Self {
        self.token_saver = Some(Box::new(token_saver));
        self
    }

    /// Uses the given HTTP client for token and API requests.
    ///
    /// The default client does not follow redirects; keep it that way for
    /// custom clients, as the token request carries the client secret.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Resolves the configuration and builds the client.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a credential is missing, the base URL is
    /// invalid, or the default HTTP client cannot be created.
    pub fn build(self) -> Result<AuthenticatedClient, ConfigError> {
        let Self {
            settings,
            overrides,
            token,
            debug,
            token_saver,
            http,
        } = self;

        let mut config = ClientConfig::resolve(settings.as_ref(), overrides)?.with_debug(debug);
        if let Some(token) = token {
            config = config.with_token(token);
        }

        let http = match http {
            Some(http) => http,
            None => AuthenticatedClient::default_http_client()?,
        };
        let token_saver = token_saver.unwrap_or_else(|| Box::new(NoopTokenSaver));

        Ok(AuthenticatedClient::from_parts(config, http, token_saver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://demo.controlshiftlabs.com";

    #[test]
    fn should_build_client_from_explicit_values() {
        let client = AuthenticatedClientBuilder::default()
            .with_client_id("id")
            .with_client_secret("secret")
            .with_base_url(BASE)
            .with_debug(true)
            .build()
            .expect("should build client");

        assert_eq!(client.config().client_id(), "id");
        assert_eq!(client.config().base_url(), BASE);
        assert!(client.config().debug());
        assert!(client.token().is_none());
    }

    #[test]
    fn should_complete_settings_with_explicit_values() {
        let settings = Settings::default()
            .with_client_id("id-from-settings")
            .with_base_url(BASE);

        let client = AuthenticatedClientBuilder::default()
            .with_settings(settings)
            .with_client_secret("secret")
            .build()
            .expect("should build client");

        assert_eq!(client.config().client_id(), "id-from-settings");
    }

    #[test]
    fn should_fail_fast_on_missing_secret() {
        let result = AuthenticatedClientBuilder::default()
            .with_client_id("id")
            .with_base_url(BASE)
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingParameter {
                name: "client_secret"
            })
        ));
    }

    #[test]
    fn should_seed_token_cache() {
        let client = AuthenticatedClientBuilder::default()
            .with_client_id("id")
            .with_client_secret("secret")
            .with_base_url(BASE)
            .with_token(Token::new("seeded"))
            .build()
            .expect("should build client");

        let token = client.token().expect("seeded token");
        assert_eq!(token.access_token(), "seeded");
    }
}
