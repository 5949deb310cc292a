//! HTTP request layer
//!
//! Performs exactly one round trip per call and normalizes the outcome.
//!
//! # Features
//!
//! - **Injectable Transport**: `reqwest` by default, any [`Transport`] for tests
//! - **Injectable Codec**: `serde_json` by default
//! - **Header Composition**: JSON defaults, caller overrides, `X-Auth-Token`
//! - **Classification**: decoded JSON, protocol errors, service errors

mod client;
mod codec;
mod transport;

pub use client::{
    compose_headers, join_url, Requester, AUTH_TOKEN_HEADER, DEFAULT_ACCEPT,
    DEFAULT_ACCEPT_ENCODING, DEFAULT_CONTENT_TYPE,
};
pub use codec::{Codec, JsonCodec};
pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportConfig,
    TransportConfigBuilder,
};
