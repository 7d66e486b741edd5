use http::HeaderValue;
use http::header::AUTHORIZATION;
use tracing::debug;
use url::Url;

use super::oauth2::{AuthError, Token};
use super::{ApiResponse, ControlShiftError};

/// An HTTP session bound to one token.
///
/// Cheap to build: it shares the client's connection pool and only owns the
/// `Authorization` header value. Build a new one after every token refresh.
#[derive(Clone)]
pub struct AuthenticatedSession {
    http: reqwest::Client,
    authorization: HeaderValue,
}

impl AuthenticatedSession {
    pub(crate) fn new(http: reqwest::Client, token: &Token) -> Result<Self, AuthError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.access_token()))
            .map_err(|err| AuthError::InvalidBearerToken {
                message: err.to_string(),
            })?;
        authorization.set_sensitive(true);

        Ok(Self {
            http,
            authorization,
        })
    }

    /// Sends a GET request with the bearer token and reads the whole response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure only; any HTTP status is a response.
    pub async fn get(&self, url: Url) -> Result<ApiResponse, ControlShiftError> {
        let request = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.authorization.clone())
            .build()?;

        debug!(?request, "sending...");
        let response = self.http.execute(request).await?;
        debug!(?response, "...receiving");

        ApiResponse::read(response).await
    }
}

impl std::fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("authorization", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
