//! Endpoint client implementation

use crate::catalog::Token;
use crate::error::Result;
use crate::http::Requester;
use crate::pagination::{self, PageSource, Visit};
use crate::types::{HeaderOverrides, Method, QueryParams};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// One service endpoint plus the shared token.
///
/// Immutable after construction. Cloning is cheap and shares the token.
#[derive(Debug, Clone)]
pub struct EndpointClient {
    base_uri: String,
    token: Option<Arc<Token>>,
    requester: Requester,
}

impl EndpointClient {
    /// Bind a base URI, an optional token and a requester
    pub fn new(base_uri: impl Into<String>, token: Option<Arc<Token>>, requester: Requester) -> Self {
        Self {
            base_uri: base_uri.into(),
            token,
            requester,
        }
    }

    /// Client for a standalone service that needs no token
    pub fn unauthenticated(base_uri: impl Into<String>, requester: Requester) -> Self {
        Self::new(base_uri, None, requester)
    }

    /// Base URI every path is joined to
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Token sent with every request
    pub fn token(&self) -> Option<&Arc<Token>> {
        self.token.as_ref()
    }

    /// Make a generic request
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: Option<&HeaderOverrides>,
    ) -> Result<Value> {
        self.requester
            .call(
                method,
                &self.base_uri,
                path,
                self.token.as_deref(),
                body,
                headers,
            )
            .await
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None, None).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body), None).await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(body), None).await
    }

    /// Make a PATCH request
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, path, Some(body), None).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None, None).await
    }

    /// Call `visit` once per decoded page
    pub async fn each<F>(&self, path: &str, query: Option<&QueryParams>, visit: F) -> Result<()>
    where
        F: FnMut(Value) -> Visit,
    {
        pagination::each(self, path, query, visit).await
    }

    /// Call `visit` once per item of `attribute` on every page
    pub async fn every<F>(
        &self,
        path: &str,
        attribute: &str,
        query: Option<&QueryParams>,
        visit: F,
    ) -> Result<()>
    where
        F: FnMut(Value) -> Visit,
    {
        pagination::every(self, path, attribute, query, visit).await
    }

    /// Collect the items of `attribute` across all pages
    pub async fn all(
        &self,
        path: &str,
        attribute: &str,
        query: Option<&QueryParams>,
    ) -> Result<Vec<Value>> {
        pagination::all(self, path, attribute, query).await
    }
}

#[async_trait]
impl PageSource for EndpointClient {
    async fn get_page(&self, path: &str) -> Result<Value> {
        self.get(path).await
    }
}
