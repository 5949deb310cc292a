//! Catalog authentication module
//!
//! Performs the Keystone token exchange, parses the service catalog and
//! resolves service names to cached [`EndpointClient`](crate::endpoint::EndpointClient)s.
//!
//! The `CatalogAuthenticator` moves from unauthenticated to authenticated
//! exactly once; there is no logout or refresh.

mod authenticator;
mod types;

pub use authenticator::{CatalogAuthenticator, TOKENS_PATH};
pub use types::{
    AccessClass, CatalogEntry, Credentials, EndpointDescriptor, EndpointSelection,
    ServiceCatalog, TenantRef, Token,
};
