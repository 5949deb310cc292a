// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]
#![allow(clippy::struct_excessive_bools)]

//! # keystone-rest
//!
//! A minimal client for OpenStack-style REST APIs authenticated through a
//! Keystone-like identity service.
//!
//! ## Features
//!
//! - **Catalog Authentication**: one token exchange per client, service catalog parsing
//! - **Endpoint Resolution**: region, endpoint id and public/internal/admin selection
//! - **Generic REST Calls**: JSON in, JSON out, service and protocol error classification
//! - **Pagination**: follows `next` cursors with deterministic query strings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keystone_rest::{CatalogAuthenticator, Credentials, EndpointSelection, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let auth = CatalogAuthenticator::with_defaults("http://keystone:5000/v2.0")?;
//!     auth.authenticate(&Credentials::new("demo", "admin", "secret")).await?;
//!
//!     let image = auth
//!         .resolve_service("image", &EndpointSelection::new().region("RegionOne"))
//!         .await?;
//!     let images = image.all("/v2/images", "images", None).await?;
//!     println!("{} images", images.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  CatalogAuthenticator                    │
//! │  authenticate() → Token + Catalog   resolve_service()    │
//! └──────────────────────────────┬───────────────────────────┘
//!                                │
//!                       ┌────────┴────────┐
//!                       │ EndpointClient  │ (cached per service)
//!                       └────────┬────────┘
//!                ┌───────────────┴───────────────┐
//!                │                               │
//!        ┌───────┴───────┐              ┌────────┴────────┐
//!        │   Requester   │◄─────────────│   Pagination    │
//!        │ one round trip│              │ each/every/all  │
//!        └───────┬───────┘              └─────────────────┘
//!                │
//!        Transport + Codec (injected)
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP request pipeline, transport and codec
pub mod http;

/// Cursor pagination
pub mod pagination;

/// Per-service endpoint client
pub mod endpoint;

/// Token exchange, service catalog and endpoint resolution
pub mod catalog;

/// Client configuration
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use catalog::{
    AccessClass, CatalogAuthenticator, Credentials, EndpointSelection, ServiceCatalog, Token,
};
pub use config::ClientConfig;
pub use endpoint::EndpointClient;
pub use http::{Requester, Transport};
pub use pagination::Visit;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
