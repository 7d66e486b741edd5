//! OAuth2-specific error types.

use std::fmt;

/// Errors raised while obtaining or attaching an OAuth2 token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The grant request failed for a reason not covered below.
    TokenAcquisitionFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The token endpoint answered with an OAuth2 error response.
    TokenRejected {
        /// The error reported by the endpoint.
        reason: String,
    },

    /// Network error during the token request.
    NetworkError {
        /// Description of the network error.
        reason: String,
    },

    /// The token endpoint answered with something that is not a token.
    InvalidTokenResponse {
        /// Description of what was invalid.
        reason: String,
    },

    /// The cached token has expired.
    TokenExpired,

    /// No token has been acquired yet.
    TokenNotAcquired,

    /// The access token cannot be sent as an HTTP header.
    InvalidBearerToken {
        /// Description of the invalid characters.
        message: String,
    },
}

impl std::error::Error for AuthError {}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenAcquisitionFailed { reason } => {
                write!(f, "Token acquisition failed: {reason}")
            }
            Self::TokenRejected { reason } => {
                write!(f, "Token endpoint rejected the grant: {reason}")
            }
            Self::NetworkError { reason } => {
                write!(f, "Network error during OAuth2 request: {reason}")
            }
            Self::InvalidTokenResponse { reason } => {
                write!(f, "Invalid OAuth2 token response: {reason}")
            }
            Self::TokenExpired => write!(f, "OAuth2 token has expired"),
            Self::TokenNotAcquired => write!(f, "OAuth2 token has not been acquired yet"),
            Self::InvalidBearerToken { message } => {
                write!(f, "Bearer token contains invalid characters: {message}")
            }
        }
    }
}
