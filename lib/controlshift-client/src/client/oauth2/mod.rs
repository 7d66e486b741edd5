//! OAuth2 client-credentials support.
//!
//! Tokens are obtained through the `oauth2` crate from `{base_url}/oauth/token`,
//! cached by the [`AuthenticatedClient`](crate::AuthenticatedClient), and handed
//! to a [`TokenSaver`] so the host application can persist them.
//!
//! # Rate limits
//!
//! ControlShift allows [`TOKEN_REQUESTS_PER_MINUTE`] token requests and
//! [`API_REQUESTS_PER_MINUTE`] API requests per minute, and issues tokens valid
//! for [`DEFAULT_TOKEN_LIFETIME`] by default. The client does not enforce these
//! limits; seed new clients with a persisted token to stay under them.

use std::time::Duration;

mod error;
pub(crate) mod provider;
mod saver;
mod token;

pub use self::error::AuthError;
pub use self::saver::{NoopTokenSaver, TokenSaver};
pub use self::token::Token;

/// Token grants allowed per minute and per API client.
pub const TOKEN_REQUESTS_PER_MINUTE: u32 = 10;

/// Authenticated API requests allowed per minute and per API client.
pub const API_REQUESTS_PER_MINUTE: u32 = 1000;

/// Lifetime of the tokens issued by ControlShift, unless the grant says otherwise.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);
