//! # ControlShift client
//!
//! Async client for the [ControlShift](https://www.controlshiftlabs.com) CRM REST API,
//! authenticated with the OAuth2 client-credentials grant.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use controlshift_client::{AuthenticatedClient, Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Credentials from CONTROLSHIFT_CLIENT_ID, CONTROLSHIFT_CLIENT_SECRET
//! // and CONTROLSHIFT_BASE_URL
//! let mut client = AuthenticatedClient::builder()
//!     .with_settings(Settings::from_env())
//!     .build()?;
//!
//! let member = client.member_lookup("someone@example.com").await?;
//! println!("{member}");
//!
//! let petition = client.petition("save-the-bees", true).await?;
//! println!("{}", serde_json::to_string(&petition)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Tokens
//!
//! The first authenticated request runs the grant; the token is then cached and
//! reused. A request failing with an expired token (or `401 Unauthorized`) is
//! retried once after a refresh.
//!
//! To reuse tokens across processes, seed the client and persist new tokens
//! with a [`TokenSaver`]:
//!
//! ```rust,no_run
//! use controlshift_client::{AuthenticatedClient, Token};
//!
//! # fn load() -> Option<Token> { None }
//! # fn store(token: &Token) {}
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = AuthenticatedClient::builder()
//!     .with_client_id("my-client-id")
//!     .with_client_secret("my-client-secret")
//!     .with_base_url("https://demo.controlshiftlabs.com")
//!     .with_token_saver(|token: &Token| store(token));
//! if let Some(token) = load() {
//!     builder = builder.with_token(token);
//! }
//! let client = builder.build()?;
//! # Ok(())
//! # }
//! ```
//!
//! [`Token`] serializes with serde; secrets are redacted from `Debug` output.

mod client;

pub use self::client::oauth2::{
    API_REQUESTS_PER_MINUTE, DEFAULT_TOKEN_LIFETIME, TOKEN_REQUESTS_PER_MINUTE,
};
pub use self::client::{
    ApiResponse, AuthError, AuthenticatedClient, AuthenticatedClientBuilder, AuthenticatedSession,
    BASE_URL_KEY, CLIENT_ID_KEY, CLIENT_SECRET_KEY, ClientConfig, ConfigError, ControlShiftError,
    NO_QUERY, NoopTokenSaver, PetitionResult, SecureString, Settings, Token, TokenSaver,
};
