//! Catalog data model
//!
//! Credentials, the token, the parsed service catalog and the criteria used
//! to pick one endpoint out of it. Also holds the identity wire formats.

use crate::error::{Error, Result};
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

// ============================================================================
// Credentials
// ============================================================================

/// Tenant-scoped username/password credentials
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Tenant (project) name
    pub tenant_name: String,
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create new credentials
    pub fn new(
        tenant_name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            tenant_name: tenant_name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Fail with a configuration error if any field is empty
    pub fn validate(&self) -> Result<()> {
        if self.tenant_name.is_empty() {
            return Err(Error::missing_field("tenant_name"));
        }
        if self.username.is_empty() {
            return Err(Error::missing_field("username"));
        }
        if self.password.is_empty() {
            return Err(Error::missing_field("password"));
        }
        Ok(())
    }

    /// Token request body in the identity service's envelope
    pub(crate) fn to_request_body(&self) -> Result<serde_json::Value> {
        let request = TokenRequest {
            auth: AuthEnvelope {
                tenant_name: &self.tenant_name,
                password_credentials: PasswordCredentials {
                    username: &self.username,
                    password: &self.password,
                },
            },
        };
        Ok(serde_json::to_value(request)?)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_name", &self.tenant_name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Token
// ============================================================================

/// Tenant the token is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRef {
    /// Tenant ID
    #[serde(default)]
    pub id: Option<String>,
    /// Tenant name
    #[serde(default)]
    pub name: Option<String>,
}

/// Token issued by the identity service. Immutable once issued.
#[derive(Clone, PartialEq)]
pub struct Token {
    id: String,
    expires: Option<DateTime<Utc>>,
    tenant: Option<TenantRef>,
    metadata: JsonObject,
}

impl Token {
    /// Create a token with only an identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            expires: None,
            tenant: None,
            metadata: JsonObject::new(),
        }
    }

    /// Token identifier sent as `X-Auth-Token`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Expiry time, if the identity service reported a parseable one
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Tenant the token is scoped to
    pub fn tenant(&self) -> Option<&TenantRef> {
        self.tenant.as_ref()
    }

    /// Remaining token fields as returned by the identity service
    pub fn metadata(&self) -> &JsonObject {
        &self.metadata
    }

    /// Whether the token's expiry lies in the past.
    ///
    /// Tokens without an expiry never report as expired. Nothing refreshes
    /// an expired token; this is informational only.
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|expires| expires <= Utc::now())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &"<redacted>")
            .field("expires", &self.expires)
            .field("tenant", &self.tenant)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Service Catalog
// ============================================================================

/// Which URL variant of an endpoint descriptor to use.
///
/// Parsed case-insensitively from `public`, `internal` or `admin`, with or
/// without the `URL` suffix, from both strings and config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AccessClass {
    /// `publicURL`
    #[default]
    Public,
    /// `internalURL`
    Internal,
    /// `adminURL`
    Admin,
}

impl FromStr for AccessClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "public" | "publicurl" => Ok(Self::Public),
            "internal" | "internalurl" => Ok(Self::Internal),
            "admin" | "adminurl" => Ok(Self::Admin),
            other => Err(Error::invalid_selection(format!(
                "unknown access class '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for AccessClass {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Admin => "admin",
        })
    }
}

/// One region's URLs for a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Endpoint identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Region identifier
    #[serde(default)]
    pub region: Option<String>,
    /// Public URL
    #[serde(rename = "publicURL", default)]
    pub public_url: Option<String>,
    /// Internal URL
    #[serde(rename = "internalURL", default)]
    pub internal_url: Option<String>,
    /// Admin URL
    #[serde(rename = "adminURL", default)]
    pub admin_url: Option<String>,
}

impl EndpointDescriptor {
    /// The non-empty URL for an access class
    pub fn url_for(&self, class: AccessClass) -> Option<&str> {
        let url = match class {
            AccessClass::Public => &self.public_url,
            AccessClass::Internal => &self.internal_url,
            AccessClass::Admin => &self.admin_url,
        };
        url.as_deref().filter(|url| !url.is_empty())
    }
}

/// A service and its endpoints, in catalog order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Service name
    pub name: String,
    /// Endpoint descriptors
    pub endpoints: Vec<EndpointDescriptor>,
}

/// Service name to catalog entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ServiceCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. Endpoints of a repeated service name are appended.
    pub fn insert(&mut self, entry: CatalogEntry) {
        match self.entries.get_mut(&entry.name) {
            Some(existing) => existing.endpoints.extend(entry.endpoints),
            None => {
                self.entries.insert(entry.name.clone(), entry);
            }
        }
    }

    /// Look up a service
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    /// Sorted service names
    pub fn service_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of services
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no services
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in name order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }
}

// ============================================================================
// Endpoint Selection
// ============================================================================

/// How to pick an endpoint out of a catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSelection {
    /// Use this URI directly, bypassing the catalog
    pub uri: Option<String>,
    /// Only consider descriptors in this region
    pub region: Option<String>,
    /// Only consider the descriptor with this identifier
    pub endpoint_id: Option<String>,
    /// Use `publicURL`
    pub public: bool,
    /// Use `internalURL`
    pub internal: bool,
    /// Use `adminURL`
    pub admin: bool,
}

impl Default for EndpointSelection {
    fn default() -> Self {
        Self {
            uri: None,
            region: None,
            endpoint_id: None,
            public: true,
            internal: false,
            admin: false,
        }
    }
}

impl EndpointSelection {
    /// Public endpoint, no filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the URI
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Filter by region
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Filter by endpoint identifier
    #[must_use]
    pub fn endpoint_id(mut self, id: impl Into<String>) -> Self {
        self.endpoint_id = Some(id.into());
        self
    }

    /// Select exactly one access class
    #[must_use]
    pub fn interface(mut self, class: AccessClass) -> Self {
        self.public = class == AccessClass::Public;
        self.internal = class == AccessClass::Internal;
        self.admin = class == AccessClass::Admin;
        self
    }

    /// The requested access class; public wins over internal over admin
    pub fn access_class(&self) -> Result<AccessClass> {
        if self.public {
            Ok(AccessClass::Public)
        } else if self.internal {
            Ok(AccessClass::Internal)
        } else if self.admin {
            Ok(AccessClass::Admin)
        } else {
            Err(Error::invalid_selection(
                "one of public, internal or admin must be selected",
            ))
        }
    }

    /// Whether a descriptor passes the region and identifier filters
    pub fn matches(&self, descriptor: &EndpointDescriptor) -> bool {
        let region_ok = self
            .region
            .as_deref()
            .map_or(true, |region| descriptor.region.as_deref() == Some(region));
        let id_ok = self
            .endpoint_id
            .as_deref()
            .map_or(true, |id| descriptor.id.as_deref() == Some(id));
        region_ok && id_ok
    }
}

// ============================================================================
// Identity wire format
// ============================================================================

#[derive(Serialize)]
struct TokenRequest<'a> {
    auth: AuthEnvelope<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthEnvelope<'a> {
    tenant_name: &'a str,
    password_credentials: PasswordCredentials<'a>,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccessResponse {
    #[serde(default)]
    access: Option<Access>,
}

#[derive(Debug, Deserialize)]
struct Access {
    #[serde(default)]
    token: Option<RawToken>,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<RawCatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct RawToken {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    expires: Option<String>,
    #[serde(default)]
    tenant: Option<TenantRef>,
    #[serde(flatten)]
    extra: JsonObject,
}

#[derive(Debug, Deserialize)]
struct RawCatalogEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    service_type: Option<String>,
    #[serde(default)]
    endpoints: Vec<EndpointDescriptor>,
}

/// Parse an identity token response into a token and catalog
pub(crate) fn parse_access(body: serde_json::Value) -> Result<(Token, ServiceCatalog)> {
    let response: AccessResponse = serde_json::from_value(body)
        .map_err(|e| Error::protocol(format!("malformed token response: {e}")))?;

    let access = response
        .access
        .ok_or_else(|| Error::protocol("no token in response"))?;
    let raw = access
        .token
        .ok_or_else(|| Error::protocol("no token in response"))?;
    let id = raw
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::protocol("no token in response"))?;

    let expires = raw.expires.as_deref().and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| warn!("Ignoring unparseable token expiry '{}': {}", s, e))
            .ok()
    });

    let token = Token {
        id,
        expires,
        tenant: raw.tenant,
        metadata: raw.extra,
    };

    let mut catalog = ServiceCatalog::new();
    for entry in access.service_catalog {
        let Some(name) = entry.service_type.or(entry.name) else {
            warn!("Skipping catalog entry without name or type");
            continue;
        };
        catalog.insert(CatalogEntry {
            name,
            endpoints: entry.endpoints,
        });
    }

    Ok((token, catalog))
}

#[cfg(test)]
mod type_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_credentials_validate() {
        assert!(Credentials::new("demo", "admin", "secret").validate().is_ok());

        let err = Credentials::new("", "admin", "secret").validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { field } if field == "tenant_name"));

        let err = Credentials::new("demo", "admin", "").validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { field } if field == "password"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("demo", "admin", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_request_body_envelope() {
        let body = Credentials::new("demo", "admin", "secret")
            .to_request_body()
            .unwrap();
        assert_eq!(
            body,
            json!({
                "auth": {
                    "tenantName": "demo",
                    "passwordCredentials": {"username": "admin", "password": "secret"}
                }
            })
        );
    }

    #[test]
    fn test_parse_access_full() {
        let (token, catalog) = parse_access(json!({
            "access": {
                "token": {
                    "id": "T1",
                    "expires": "2030-01-01T00:00:00Z",
                    "issued_at": "2029-12-31T00:00:00Z",
                    "tenant": {"id": "t-1", "name": "demo"}
                },
                "serviceCatalog": [
                    {"name": "glance", "type": "image", "endpoints": [
                        {"region": "RegionOne", "publicURL": "http://glance:9292"}
                    ]},
                    {"name": "compute", "endpoints": []}
                ]
            }
        }))
        .unwrap();

        assert_eq!(token.id(), "T1");
        assert!(!token.is_expired());
        assert_eq!(token.tenant().unwrap().name.as_deref(), Some("demo"));
        assert_eq!(token.metadata().get("issued_at"), Some(&json!("2029-12-31T00:00:00Z")));
        assert_eq!(catalog.service_names(), vec!["compute", "image"]);
        assert_eq!(
            catalog.get("image").unwrap().endpoints[0].public_url.as_deref(),
            Some("http://glance:9292")
        );
    }

    #[test]
    fn test_parse_access_without_token() {
        for body in [
            json!({}),
            json!({"access": {}}),
            json!({"access": {"token": {}}}),
            json!({"access": {"token": {"id": ""}}}),
        ] {
            let err = parse_access(body).unwrap_err();
            assert!(err.to_string().contains("no token in response"));
        }
    }

    #[test]
    fn test_parse_access_bad_expiry_is_ignored() {
        let (token, _) = parse_access(json!({
            "access": {"token": {"id": "T1", "expires": "tomorrow"}}
        }))
        .unwrap();
        assert!(token.expires().is_none());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_catalog_merges_repeated_names() {
        let mut catalog = ServiceCatalog::new();
        catalog.insert(CatalogEntry {
            name: "image".into(),
            endpoints: vec![EndpointDescriptor {
                region: Some("A".into()),
                ..Default::default()
            }],
        });
        catalog.insert(CatalogEntry {
            name: "image".into(),
            endpoints: vec![EndpointDescriptor {
                region: Some("B".into()),
                ..Default::default()
            }],
        });
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("image").unwrap().endpoints.len(), 2);
    }

    #[test]
    fn test_descriptor_url_for() {
        let descriptor = EndpointDescriptor {
            public_url: Some("http://public".into()),
            internal_url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(descriptor.url_for(AccessClass::Public), Some("http://public"));
        assert_eq!(descriptor.url_for(AccessClass::Internal), None);
        assert_eq!(descriptor.url_for(AccessClass::Admin), None);
    }

    #[test]
    fn test_selection_access_class() {
        assert_eq!(
            EndpointSelection::new().access_class().unwrap(),
            AccessClass::Public
        );
        assert_eq!(
            EndpointSelection::new()
                .interface(AccessClass::Admin)
                .access_class()
                .unwrap(),
            AccessClass::Admin
        );

        let none = EndpointSelection {
            public: false,
            ..Default::default()
        };
        assert!(matches!(
            none.access_class(),
            Err(Error::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_selection_filters() {
        let descriptor = EndpointDescriptor {
            id: Some("e1".into()),
            region: Some("RegionOne".into()),
            ..Default::default()
        };
        assert!(EndpointSelection::new().matches(&descriptor));
        assert!(EndpointSelection::new().region("RegionOne").matches(&descriptor));
        assert!(!EndpointSelection::new().region("RegionTwo").matches(&descriptor));
        assert!(EndpointSelection::new().endpoint_id("e1").matches(&descriptor));
        assert!(!EndpointSelection::new().endpoint_id("e2").matches(&descriptor));
    }

    #[test]
    fn test_access_class_from_str() {
        assert_eq!("internal".parse::<AccessClass>().unwrap(), AccessClass::Internal);
        assert_eq!("adminURL".parse::<AccessClass>().unwrap(), AccessClass::Admin);
        assert!("private".parse::<AccessClass>().is_err());
    }
}
