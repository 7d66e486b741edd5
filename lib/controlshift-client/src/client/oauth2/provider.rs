//! Client-credentials grant against the ControlShift token endpoint.

use std::error::Error;

use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse};
use oauth2::{
    AuthType, ClientId, ClientSecret, HttpClientError, RequestTokenError, TokenResponse, TokenUrl,
};
use tracing::debug;

use super::error::AuthError;
use super::token::Token;
use crate::client::ClientConfig;

type GrantError = RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>;

/// Runs the client-credentials grant and converts the response.
///
/// The client id and secret are sent in the request body.
pub(crate) async fn request_token(
    http: &reqwest::Client,
    config: &ClientConfig,
) -> Result<Token, AuthError> {
    let client = BasicClient::new(ClientId::new(config.client_id.clone()))
        .set_client_secret(ClientSecret::new(config.client_secret.as_str().to_string()))
        .set_auth_type(AuthType::RequestBody)
        .set_token_uri(TokenUrl::from_url(config.token_url.clone()));

    debug!(token_url = %config.token_url, "requesting client credentials token");
    let response = client
        .exchange_client_credentials()
        .request_async(http)
        .await
        .map_err(convert_error)?;

    Ok(convert_token_response(&response))
}

fn convert_token_response(response: &BasicTokenResponse) -> Token {
    let token_type: &str = AsRef::<str>::as_ref(response.token_type());
    let mut token =
        Token::new(response.access_token().secret().as_str()).with_token_type(token_type);

    if let Some(expires_in) = response.expires_in() {
        token = token.with_expiry(expires_in);
    }
    if let Some(refresh_token) = response.refresh_token() {
        token = token.with_refresh_token(refresh_token.secret().as_str());
    }
    if let Some(scopes) = response.scopes() {
        token = token.with_scopes(scopes.iter().map(|scope| scope.to_string()));
    }
    token
}

fn convert_error(err: GrantError) -> AuthError {
    match err {
        RequestTokenError::ServerResponse(response) => AuthError::TokenRejected {
            reason: response.to_string(),
        },
        RequestTokenError::Request(ref source) => AuthError::NetworkError {
            reason: error_chain(source),
        },
        RequestTokenError::Parse(..) => AuthError::InvalidTokenResponse {
            reason: error_chain(&err),
        },
        _ => AuthError::TokenAcquisitionFailed {
            reason: error_chain(&err),
        },
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut reason = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    reason
}
