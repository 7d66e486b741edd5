use http::StatusCode;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use url::Url;

use super::ControlShiftError;

/// A fully read HTTP response.
///
/// Returned for every status code; non-2xx statuses are for the caller to interpret.
///
/// Serializes as `{"status": 403, "content_type": "...", "url": "...", "body": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    #[serde(serialize_with = "serialize_status")]
    status: StatusCode,
    content_type: Option<String>,
    url: Url,
    body: String,
}

fn serialize_status<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self, ControlShiftError> {
        let status = response.status();
        let url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let body = response.text().await?;

        Ok(Self {
            status,
            content_type,
            url,
            body,
        })
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the final URL of the request.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the body as text.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ControlShiftError::DecodeError`] if the body is not valid JSON for `T`.
    pub fn json<T>(&self) -> Result<T, ControlShiftError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(&self.body).map_err(|error| ControlShiftError::DecodeError {
            path: self.url.path().to_string(),
            error,
            body: self.body.clone(),
        })
    }
}
