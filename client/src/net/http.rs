//! Shared request plumbing for the browser adapters.
//!
//! Both hosted services expect the public `apikey` header plus a bearer
//! token: the signed-in user's access token when there is one, otherwise the
//! anon key itself.

#[cfg(feature = "hydrate")]
use gloo_net::http::{RequestBuilder, Response};

#[cfg(feature = "hydrate")]
use crate::error::{BackendError, error_body_message};

/// Attach the `apikey` and `Authorization` headers.
#[cfg(feature = "hydrate")]
pub(crate) fn with_auth_headers(builder: RequestBuilder, anon_key: &str, access_token: Option<&str>) -> RequestBuilder {
    let bearer = format!("Bearer {}", access_token.unwrap_or(anon_key));
    builder.header("apikey", anon_key).header("Authorization", &bearer)
}

/// Send a request and turn non-2xx responses into classified errors.
///
/// # Errors
///
/// `Network` when the request cannot be built or sent, otherwise the
/// status-derived variant carrying the backend's message.
#[cfg(feature = "hydrate")]
pub(crate) async fn execute(
    request: Result<gloo_net::http::Request, gloo_net::Error>,
) -> Result<Response, BackendError> {
    let request = request.map_err(|e| BackendError::Network(e.to_string()))?;
    let resp = request.send().await.map_err(|e| BackendError::Network(e.to_string()))?;
    if resp.ok() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.json::<serde_json::Value>().await.unwrap_or(serde_json::Value::Null);
    let message = error_body_message(&body).unwrap_or_else(|| format!("request failed: {status}"));
    Err(BackendError::from_status(status, message))
}

/// Decode a successful JSON response body.
///
/// # Errors
///
/// `Decode` when the body does not match `T`.
#[cfg(feature = "hydrate")]
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, BackendError> {
    resp.json::<T>().await.map_err(|e| BackendError::Decode(e.to_string()))
}
