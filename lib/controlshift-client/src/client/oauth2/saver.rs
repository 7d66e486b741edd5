use super::token::Token;

/// Hook invoked every time the client obtains a new token.
///
/// The client stores the token before calling the hook. Implement it to
/// persist tokens so a later client can be seeded with one instead of
/// spending a grant request (the token endpoint allows 10 requests per minute).
///
/// Closures taking `&Token` implement this trait:
///
/// ```rust
/// use controlshift_client::{AuthenticatedClient, Token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = AuthenticatedClient::builder()
///     .with_client_id("id")
///     .with_client_secret("secret")
///     .with_base_url("https://demo.controlshiftlabs.com")
///     .with_token_saver(|token: &Token| {
///         let _persisted = serde_json::to_string(token);
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub trait TokenSaver: Send + Sync {
    /// Called with the token that was just stored.
    fn on_token_saved(&self, token: &Token);
}

impl<F> TokenSaver for F
where
    F: Fn(&Token) + Send + Sync,
{
    fn on_token_saved(&self, token: &Token) {
        self(token);
    }
}

/// Saver that keeps tokens in memory only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenSaver;

impl TokenSaver for NoopTokenSaver {
    fn on_token_saved(&self, _token: &Token) {}
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn should_call_closure_saver() {
        let saved = Mutex::new(Vec::new());
        let saver = |token: &Token| {
            saved
                .lock()
                .expect("lock")
                .push(token.access_token().to_string());
        };

        saver.on_token_saved(&Token::new("first"));
        saver.on_token_saved(&Token::new("second"));

        assert_eq!(*saved.lock().expect("lock"), ["first", "second"]);
    }
}
