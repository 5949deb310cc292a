//! Catalog authenticator implementation
//!
//! Exchanges credentials for a token and service catalog, then hands out
//! one cached endpoint client per service.

use super::types::{parse_access, Credentials, EndpointSelection, ServiceCatalog, Token};
use crate::config::ClientConfig;
use crate::endpoint::EndpointClient;
use crate::error::{Error, Result};
use crate::http::{ReqwestTransport, Requester};
use crate::types::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Path of the token resource under the identity endpoint
pub const TOKENS_PATH: &str = "/tokens";

/// Token and catalog held once authenticated
#[derive(Debug, Clone)]
struct Session {
    token: Arc<Token>,
    catalog: Arc<ServiceCatalog>,
}

/// Authenticates once against the identity endpoint and resolves services
pub struct CatalogAuthenticator {
    /// Identity endpoint URI
    identity_url: String,
    /// Request pipeline shared with every endpoint client
    requester: Requester,
    /// `None` until authenticated; never cleared afterwards
    session: RwLock<Option<Session>>,
    /// Endpoint clients by service name
    clients: Mutex<HashMap<String, Arc<EndpointClient>>>,
}

impl CatalogAuthenticator {
    /// Create an authenticator with an explicit request pipeline
    pub fn new(identity_url: impl Into<String>, requester: Requester) -> Result<Self> {
        let identity_url = identity_url.into();
        if identity_url.is_empty() {
            return Err(Error::missing_field("identity_url"));
        }

        Ok(Self {
            identity_url,
            requester,
            session: RwLock::new(None),
            clients: Mutex::new(HashMap::new()),
        })
    }

    /// Create an authenticator using `reqwest` and `serde_json`
    pub fn with_defaults(identity_url: impl Into<String>) -> Result<Self> {
        Self::new(identity_url, Requester::with_defaults()?)
    }

    /// Create an authenticator from loaded configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let identity_url = config
            .identity_url
            .clone()
            .ok_or_else(|| Error::missing_field("identity_url"))?;
        let transport = ReqwestTransport::with_config(&config.transport_config())?;
        Self::new(identity_url, Requester::with_transport(Arc::new(transport)))
    }

    /// Identity endpoint URI
    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    /// Authenticate, or return the token from an earlier success.
    ///
    /// Only the first successful call contacts the identity service. A
    /// failed call leaves the authenticator unauthenticated so it can be
    /// retried.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Arc<Token>> {
        credentials.validate()?;

        {
            let session = self.session.read().await;
            if let Some(session) = session.as_ref() {
                return Ok(Arc::clone(&session.token));
            }
        }

        let mut session = self.session.write().await;

        // Double-check after acquiring write lock
        if let Some(existing) = session.as_ref() {
            return Ok(Arc::clone(&existing.token));
        }

        debug!(
            "Requesting token for user '{}' in tenant '{}'",
            credentials.username, credentials.tenant_name
        );
        let body = credentials.to_request_body()?;
        let response = self
            .requester
            .call(
                Method::POST,
                &self.identity_url,
                TOKENS_PATH,
                None,
                Some(&body),
                None,
            )
            .await?;

        let (token, catalog) = parse_access(response)?;
        info!(
            "Authenticated against {} ({} services in catalog)",
            self.identity_url,
            catalog.len()
        );

        let token = Arc::new(token);
        *session = Some(Session {
            token: Arc::clone(&token),
            catalog: Arc::new(catalog),
        });
        Ok(token)
    }

    /// Whether a token is held
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// The held token, if authenticated
    pub async fn token(&self) -> Option<Arc<Token>> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| Arc::clone(&s.token))
    }

    /// The parsed catalog, if authenticated
    pub async fn catalog(&self) -> Option<Arc<ServiceCatalog>> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| Arc::clone(&s.catalog))
    }

    /// Sorted service names; empty before authentication
    pub async fn list_services(&self) -> Vec<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.catalog.service_names())
            .unwrap_or_default()
    }

    /// Get the endpoint client for a service.
    ///
    /// The first resolution of a name is cached and returned for every
    /// later call without a `uri` override, whatever its other criteria.
    /// A `uri` override always builds a new client and replaces the cache.
    pub async fn resolve_service(
        &self,
        name: &str,
        selection: &EndpointSelection,
    ) -> Result<Arc<EndpointClient>> {
        let session = self
            .session
            .read()
            .await
            .clone()
            .ok_or(Error::NotAuthenticated)?;

        let entry = session
            .catalog
            .get(name)
            .ok_or_else(|| Error::unknown_service(name))?;

        let mut clients = self.clients.lock().await;

        if let Some(uri) = &selection.uri {
            debug!("Using explicit URI for service '{}': {}", name, uri);
            let client = Arc::new(self.endpoint_client(uri.clone(), &session));
            clients.insert(name.to_string(), Arc::clone(&client));
            return Ok(client);
        }

        if let Some(client) = clients.get(name) {
            return Ok(Arc::clone(client));
        }

        let class = selection.access_class()?;
        let url = entry
            .endpoints
            .iter()
            .filter(|descriptor| selection.matches(descriptor))
            .find_map(|descriptor| descriptor.url_for(class))
            .ok_or_else(|| {
                Error::no_matching_endpoint(
                    name,
                    format!(
                        "no {class} endpoint matches region {:?} and id {:?}",
                        selection.region, selection.endpoint_id
                    ),
                )
            })?;

        debug!("Resolved service '{}' to {} ({})", name, url, class);
        let client = Arc::new(self.endpoint_client(url.to_string(), &session));
        let client = clients.entry(name.to_string()).or_insert(client);
        Ok(Arc::clone(client))
    }

    fn endpoint_client(&self, base_uri: String, session: &Session) -> EndpointClient {
        EndpointClient::new(
            base_uri,
            Some(Arc::clone(&session.token)),
            self.requester.clone(),
        )
    }
}

impl std::fmt::Debug for CatalogAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogAuthenticator")
            .field("identity_url", &self.identity_url)
            .finish_non_exhaustive()
    }
}
