//! Request pipeline: one HTTP round trip, normalized
//!
//! Handles:
//! - URL composition against an endpoint base
//! - Default, caller and auth header composition
//! - JSON body encoding
//! - Response classification into value, protocol error or service error

use super::codec::{Codec, JsonCodec};
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::catalog::Token;
use crate::error::{Error, Result};
use crate::types::{HeaderOverrides, Method};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default `Accept` header
pub const DEFAULT_ACCEPT: &str = "application/json, text/plain";

/// Default `Accept-Encoding` header
pub const DEFAULT_ACCEPT_ENCODING: &str = "identity, gzip, deflate, compress";

/// Default `Content-Type` header
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Header carrying the token identifier
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Performs single request/response round trips through an injected
/// transport and codec.
#[derive(Clone)]
pub struct Requester {
    transport: Arc<dyn Transport>,
    codec: Arc<dyn Codec>,
}

impl Requester {
    /// Create a requester from explicit collaborators
    pub fn new(transport: Arc<dyn Transport>, codec: Arc<dyn Codec>) -> Self {
        Self { transport, codec }
    }

    /// Create a requester using `reqwest` and `serde_json`
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            Arc::new(ReqwestTransport::new()?),
            Arc::new(JsonCodec),
        ))
    }

    /// Create a requester on top of a custom transport with the JSON codec
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, Arc::new(JsonCodec))
    }

    /// The codec used for bodies
    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Perform one round trip against `base` + `path`.
    ///
    /// Returns the decoded JSON for 2xx responses (`Value::Null` when the
    /// body is empty) and the status message as a string for statuses
    /// outside 2xx/4xx/5xx.
    pub async fn call(
        &self,
        method: Method,
        base: &str,
        path: &str,
        token: Option<&Token>,
        body: Option<&Value>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value> {
        let url = join_url(base, path);
        let headers = compose_headers(headers, token)?;
        let body = match body {
            Some(value) => Some(Bytes::from(self.codec.encode(value)?)),
            None => None,
        };

        debug!("Request: {} {}", method, url);
        let response = self
            .transport
            .send(HttpRequest {
                method,
                url: url.clone(),
                headers,
                body,
            })
            .await?;

        let outcome = self.classify(&response);
        match &outcome {
            Ok(_) => debug!("Request completed: {} {} -> {}", method, url, response.status),
            Err(e) => warn!("Request failed: {} {}: {}", method, url, e),
        }
        outcome
    }

    /// Turn a raw response into a value or an error
    pub fn classify(&self, response: &HttpResponse) -> Result<Value> {
        match response.status {
            200..=299 => {
                if response.body.is_empty() {
                    return Ok(Value::Null);
                }
                let content_type = response.content_type.as_deref().unwrap_or_default();
                if !is_json_content_type(content_type) {
                    return Err(Error::protocol(format!(
                        "expected application/json response, got '{content_type}'"
                    )));
                }
                self.codec.decode(&response.body).map_err(|e| {
                    Error::protocol(format!("failed to decode JSON response: {e}"))
                })
            }
            400..=599 => Err(Error::service(response.status, response.text())),
            _ => Ok(Value::String(response.status_message())),
        }
    }
}

impl std::fmt::Debug for Requester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requester").finish_non_exhaustive()
    }
}

/// Join an endpoint base and a request path.
///
/// Absolute `http(s)://` paths are used as-is. Otherwise the junction gets
/// exactly one slash; slashes elsewhere are left alone.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.is_empty() || path.starts_with('?') {
        return format!("{base}{path}");
    }

    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{base}{}", &path[1..]),
        (false, false) => format!("{base}/{path}"),
        _ => format!("{base}{path}"),
    }
}

/// Build the final header set for a request.
///
/// Caller overrides replace defaults by name (case-insensitive). An
/// `X-Auth-Token` override is dropped; the header only ever carries the
/// session token.
pub fn compose_headers(
    overrides: Option<&HeaderOverrides>,
    token: Option<&Token>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static(DEFAULT_ACCEPT_ENCODING),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    for (key, value) in overrides.into_iter().flatten() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| Error::InvalidHeader { name: key.clone() })?;
        if name == AUTH_TOKEN_HEADER {
            continue;
        }
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::InvalidHeader { name: key.clone() })?;
        headers.insert(name, value);
    }

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(token.id()).map_err(|_| Error::InvalidHeader {
            name: AUTH_TOKEN_HEADER.to_string(),
        })?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(AUTH_TOKEN_HEADER), value);
    }

    Ok(headers)
}

/// Case-insensitive `application/json` prefix match
fn is_json_content_type(content_type: &str) -> bool {
    const JSON: &str = "application/json";
    content_type
        .get(..JSON.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(JSON))
}
