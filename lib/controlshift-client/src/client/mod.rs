use std::fmt;

use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

mod builder;
pub use self::builder::AuthenticatedClientBuilder;

mod config;
pub use self::config::{BASE_URL_KEY, CLIENT_ID_KEY, CLIENT_SECRET_KEY, ClientConfig, Settings};

mod error;
pub use self::error::{ConfigError, ControlShiftError};

pub mod oauth2;
use self::oauth2::provider;
pub use self::oauth2::{AuthError, NoopTokenSaver, Token, TokenSaver};

mod petition;
pub use self::petition::PetitionResult;

mod response;
pub use self::response::ApiResponse;

mod secret;
pub use self::secret::SecureString;

mod session;
pub use self::session::AuthenticatedSession;


/// Empty query string, for requests without parameters.
pub const NO_QUERY: &[(&str, &str)] = &[];

const MEMBER_LOOKUP_PATH: &str = "/api/v1/members/lookup";

/// Client for the ControlShift REST API.
///
/// Holds the credentials and the cached OAuth2 token. The token is acquired
/// lazily on the first authenticated request and refreshed once when a request
/// fails because it expired.
///
/// Methods that may replace the token take `&mut self`: one client serves one
/// caller at a time. Use one client per task, or wrap it in a lock.
///
/// # Example
///
/// ```rust,no_run
/// use controlshift_client::AuthenticatedClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = AuthenticatedClient::builder()
///     .with_client_id("my-client-id")
///     .with_client_secret("my-client-secret")
///     .with_base_url("https://demo.controlshiftlabs.com")
///     .build()?;
///
/// let member = client.member_lookup("someone@example.com").await?;
/// let petition = client.petition("save-the-bees", true).await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthenticatedClient {
    config: ClientConfig,
    http: reqwest::Client,
    token: Option<Token>,
    token_saver: Box<dyn TokenSaver>,
}

// Create
impl AuthenticatedClient {
    /// Creates a builder.
    pub fn builder() -> AuthenticatedClientBuilder {
        AuthenticatedClientBuilder::default()
    }

    /// Creates a client from a resolved configuration, with the default HTTP
    /// client and no token persistence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let http = Self::default_http_client()?;
        Ok(Self::from_parts(config, http, Box::new(NoopTokenSaver)))
    }

    pub(crate) fn from_parts(
        config: ClientConfig,
        http: reqwest::Client,
        token_saver: Box<dyn TokenSaver>,
    ) -> Self {
        let token = config.token.clone();
        Self {
            config,
            http,
            token,
            token_saver,
        }
    }

    pub(crate) fn default_http_client() -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| ConfigError::HttpClient {
                reason: err.to_string(),
            })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the cached token, if any.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }
}

// Token
impl AuthenticatedClient {
    /// Runs the client-credentials grant and replaces the cached token.
    ///
    /// The new token is passed to the [`TokenSaver`] once stored.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the token endpoint cannot be reached or
    /// does not issue a token. The cached token is left untouched.
    pub async fn refresh_token(&mut self) -> Result<(), AuthError> {
        let token = provider::request_token(&self.http, &self.config).await?;
        self.save_token(token);
        Ok(())
    }

    fn save_token(&mut self, token: Token) {
        if self.config.debug {
            info!(?token, "saving token");
        }
        let token = self.token.insert(token);
        self.token_saver.on_token_saved(token);
    }

    /// Builds a session attaching the cached token to every request.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenNotAcquired`] if no token is cached
    /// - [`AuthError::TokenExpired`] if the cached token is past its expiry
    /// - [`AuthError::InvalidBearerToken`] if the token is not a valid header value
    pub fn build_session(&self) -> Result<AuthenticatedSession, AuthError> {
        let token = self.token.as_ref().ok_or(AuthError::TokenNotAcquired)?;
        if token.is_expired() {
            return Err(AuthError::TokenExpired);
        }
        AuthenticatedSession::new(self.http.clone(), token)
    }
}

// Requests
impl AuthenticatedClient {
    /// Sends an authenticated `GET {base_url}{path}?{query}`.
    ///
    /// A token is acquired first if none is cached. If the request fails because
    /// the token expired (expired locally, or `401 Unauthorized` from the API) or
    /// on a connection error, the token is refreshed once and the request is
    /// retried once; the outcome of the retry is returned as is.
    ///
    /// Any HTTP status is returned as a response.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use controlshift_client::AuthenticatedClient;
    /// # async fn example(client: &mut AuthenticatedClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let response = client
    ///     .get("/api/v1/petitions", &[("page", "2")])
    ///     .await?;
    /// if response.is_success() {
    ///     let petitions: serde_json::Value = response.json()?;
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or query cannot be built, a required token
    /// grant fails, or the (retried) request fails at transport level.
    pub async fn get<Q>(&mut self, path: &str, query: &Q) -> Result<ApiResponse, ControlShiftError>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path, query)?;

        let fresh_token = self.token.is_none();
        if fresh_token {
            self.refresh_token().await?;
        }

        let outcome = self.send(&url).await;
        let should_retry = match &outcome {
            Ok(response) => !fresh_token && response.status() == StatusCode::UNAUTHORIZED,
            Err(err) => err.is_token_expired() || err.is_connection_error(),
        };
        if !should_retry {
            return outcome;
        }

        debug!(%url, "refreshing token before retrying");
        self.refresh_token().await?;
        self.send(&url).await
    }

    /// Sends an unauthenticated `GET {base_url}{path}?{query}`, for the public
    /// JSON documents served by ControlShift.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or query cannot be built or the request
    /// fails at transport level.
    pub async fn get_public<Q>(&self, path: &str, query: &Q) -> Result<ApiResponse, ControlShiftError>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path, query)?;

        debug!(%url, "sending public request");
        let response = self.http.get(url).send().await?;
        ApiResponse::read(response).await
    }

    async fn send(&self, url: &Url) -> Result<ApiResponse, ControlShiftError> {
        let session = self.build_session()?;
        session.get(url.clone()).await
    }

    fn endpoint<Q>(&self, path: &str, query: &Q) -> Result<Url, ControlShiftError>
    where
        Q: Serialize + ?Sized,
    {
        let mut url = self.config.endpoint(path)?;

        let query_string = serde_urlencoded::to_string(query)?;
        if !query_string.is_empty() {
            let merged = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{query_string}"),
                _ => query_string,
            };
            url.set_query(Some(&merged));
        }

        Ok(url)
    }
}

// Lookups
impl AuthenticatedClient {
    /// Looks up a member by email (`GET /api/v1/members/lookup?email=...`).
    ///
    /// Returns the decoded body unchanged, whatever the status.
    ///
    /// # Errors
    ///
    /// Returns [`ControlShiftError::DecodeError`] if the body is not JSON, or
    /// any error of [`get`](Self::get).
    pub async fn member_lookup(&mut self, email: &str) -> Result<Value, ControlShiftError> {
        let response = self.get(MEMBER_LOOKUP_PATH, &[("email", email)]).await?;
        response.json()
    }

    /// Fetches a petition by slug.
    ///
    /// The public document `/petitions/{slug}.json` is always fetched first; its
    /// fields are kept only if it answers `200 OK`, any other outcome is skipped.
    /// When `authenticated` is set, the `petition` object of
    /// `/api/v1/petitions/{slug}` is merged over them, its values winning.
    ///
    /// # Errors
    ///
    /// A non-200 from the authenticated endpoint is not an error but a
    /// [`PetitionResult::RequestError`]. Errors are the ones of [`get`](Self::get),
    /// plus [`ControlShiftError::DecodeError`] if the authenticated body is not JSON.
    pub async fn petition(
        &mut self,
        slug: &str,
        authenticated: bool,
    ) -> Result<PetitionResult, ControlShiftError> {
        let mut fields = Map::new();

        let public = self.get_public(&petition::public_path(slug), NO_QUERY).await;
        petition::merge_public(&mut fields, public);

        if authenticated {
            let response = self.get(&petition::api_path(slug), NO_QUERY).await?;
            if response.status() != StatusCode::OK {
                return Ok(PetitionResult::RequestError(response));
            }
            petition::merge_authenticated(&mut fields, response.json()?);
        }

        Ok(PetitionResult::Petition(fields))
    }
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("config", &self.config)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
