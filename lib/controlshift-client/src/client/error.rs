use super::oauth2::AuthError;

/// Errors raised while building a client from its configuration.
///
/// Construction fails fast: none of these can surface once a client exists.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ConfigError {
    /// A required credential is absent or empty after resolving settings and overrides.
    #[display("AuthenticatedClient requires parameter {name}")]
    MissingParameter {
        /// The missing parameter, `client_id`, `client_secret` or `base_url`.
        name: &'static str,
    },

    /// The base URL cannot be used to reach the API.
    #[display("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The provided base URL.
        url: String,
        /// Description of why the base URL is invalid.
        reason: String,
    },

    /// The underlying HTTP client cannot be initialized.
    #[display("Cannot build HTTP client: {reason}")]
    HttpClient {
        /// Description of the failure.
        reason: String,
    },
}

/// Errors that can occur when using the [`AuthenticatedClient`](crate::AuthenticatedClient).
///
/// A non-2xx HTTP status is not an error: requests return the raw
/// [`ApiResponse`](crate::ApiResponse) and callers decide.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ControlShiftError {
    /// Invalid client configuration.
    ///
    /// Never returned by requests: building a client returns [`ConfigError`]
    /// directly. This variant lets callers use `?` on
    /// [`build`](crate::AuthenticatedClientBuilder::build) in functions
    /// returning [`ControlShiftError`].
    ConfigError(ConfigError),

    /// Token grant failure, or no usable token to attach.
    AuthError(AuthError),

    /// HTTP client error from the underlying reqwest library.
    ///
    /// Occurs when network requests fail, timeouts occur, or connection issues arise.
    ReqwestError(reqwest::Error),

    /// URL parsing error when constructing request URLs.
    UrlError(url::ParseError),

    /// Query parameter serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// The response body is not the expected JSON.
    #[display("Failed to decode JSON from '{path}': {error}\n{body}")]
    #[from(skip)]
    DecodeError {
        /// The request path the body comes from.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
        /// The response body that failed to parse.
        body: String,
    },
}

impl ControlShiftError {
    /// Returns `true` if the cached token was found expired.
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Self::AuthError(AuthError::TokenExpired))
    }

    /// Returns `true` for transport failures at connection level (connect or timeout).
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ReqwestError(err) if err.is_connect() || err.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controlshift_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ControlShiftError>();
        assert_sync::<ControlShiftError>();
    }

    #[test]
    fn should_display_missing_parameter() {
        let error = ConfigError::MissingParameter {
            name: "client_secret",
        };
        assert_eq!(
            error.to_string(),
            "AuthenticatedClient requires parameter client_secret"
        );
    }

    #[test]
    fn should_display_decode_error() {
        let error = serde_json::from_str::<serde_json::Value>("<html>").expect_err("not json");
        let error = ControlShiftError::DecodeError {
            path: "/api/v1/members/lookup".to_string(),
            error,
            body: "<html>".to_string(),
        };

        insta::assert_snapshot!(error.to_string(), @r"
        Failed to decode JSON from '/api/v1/members/lookup': expected value at line 1 column 1
        <html>
        ");
    }

    #[test]
    fn should_propagate_build_error_with_question_mark() {
        fn build() -> Result<crate::AuthenticatedClient, ControlShiftError> {
            let client = crate::AuthenticatedClient::builder()
                .with_client_id("id")
                .build()?;
            Ok(client)
        }

        let error = build().expect_err("missing secret");
        assert!(matches!(
            error,
            ControlShiftError::ConfigError(ConfigError::MissingParameter {
                name: "client_secret"
            })
        ));
    }

    #[test]
    fn should_detect_token_expiry() {
        let error = ControlShiftError::from(AuthError::TokenExpired);
        assert!(error.is_token_expired());
        assert!(!error.is_connection_error());

        let error = ControlShiftError::from(AuthError::TokenNotAcquired);
        assert!(!error.is_token_expired());
    }

    #[tokio::test]
    async fn should_detect_connection_error() {
        // Nothing listens on the discard port
        let error = reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("client")
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .expect_err("connection refused");

        let error = ControlShiftError::from(error);
        assert!(error.is_connection_error());
        assert!(!error.is_token_expired());
    }
}
