//! Endpoint client
//!
//! Binds one service's base URI to the shared token and exposes plain
//! requests and paginated fetches against it.

mod client;

pub use client::EndpointClient;
