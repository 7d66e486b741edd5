use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{ApiResponse, ControlShiftError};

const REQUEST_ERROR: &str = "request error";

/// Slugs are sent as one path segment, RFC 3986 unreserved characters kept.
const SLUG: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn encode_slug(slug: &str) -> String {
    utf8_percent_encode(slug, SLUG).to_string()
}

/// Public (unauthenticated) petition document.
pub(crate) fn public_path(slug: &str) -> String {
    format!("/petitions/{}.json", encode_slug(slug))
}

/// Authenticated petition endpoint.
pub(crate) fn api_path(slug: &str) -> String {
    format!("/api/v1/petitions/{}", encode_slug(slug))
}

/// Outcome of [`AuthenticatedClient::petition`](crate::AuthenticatedClient::petition).
///
/// Serializes to the shapes returned by the API wrappers of other ControlShift
/// clients: `{"petition": {...}}` or `{"error": "request error", "res": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum PetitionResult {
    /// Merged petition fields, authenticated values winning over public ones.
    Petition(Map<String, Value>),
    /// The authenticated endpoint answered with a non-200 status.
    RequestError(ApiResponse),
}

impl PetitionResult {
    /// Returns the merged petition fields, unless the request failed.
    pub fn petition(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Petition(fields) => Some(fields),
            Self::RequestError(_) => None,
        }
    }

    /// Returns the failed authenticated response, if any.
    pub fn request_error(&self) -> Option<&ApiResponse> {
        match self {
            Self::Petition(_) => None,
            Self::RequestError(response) => Some(response),
        }
    }
}

impl Serialize for PetitionResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Petition(fields) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("petition", fields)?;
                map.end()
            }
            Self::RequestError(response) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", REQUEST_ERROR)?;
                map.serialize_entry("res", response)?;
                map.end()
            }
        }
    }
}

/// Collects the public petition fields; any failure leaves `fields` untouched.
pub(crate) fn merge_public(
    fields: &mut Map<String, Value>,
    outcome: Result<ApiResponse, ControlShiftError>,
) {
    let response = match outcome {
        Ok(response) if response.status() == http::StatusCode::OK => response,
        Ok(response) => {
            debug!(status = %response.status(), url = %response.url(), "public petition unavailable, skipping");
            return;
        }
        Err(err) => {
            warn!(error = %err, "public petition request failed, skipping");
            return;
        }
    };

    match response.json::<Value>() {
        Ok(Value::Object(public)) => fields.extend(public),
        Ok(other) => warn!(?other, "public petition is not a JSON object, skipping"),
        Err(err) => warn!(error = %err, "public petition is not JSON, skipping"),
    }
}

/// Overlays the `petition` object of an authenticated response body.
pub(crate) fn merge_authenticated(fields: &mut Map<String, Value>, body: Value) {
    if let Value::Object(mut body) = body
        && let Some(Value::Object(petition)) = body.remove("petition")
    {
        fields.extend(petition);
    }
}
