//! Client configuration
//!
//! Settings can be loaded from YAML (inline or from a file) or from the
//! conventional `OS_*` environment variables.

use crate::catalog::{AccessClass, Credentials, EndpointSelection};
use crate::error::{Error, Result};
use crate::http::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Identity endpoint URI (e.g. `http://keystone:5000/v2.0`)
    #[serde(default)]
    pub identity_url: Option<String>,

    /// Tenant (project) name
    #[serde(default, alias = "project_name")]
    pub tenant_name: Option<String>,

    /// Username
    #[serde(default)]
    pub username: Option<String>,

    /// Password
    #[serde(default)]
    pub password: Option<String>,

    /// Preferred region for endpoint resolution
    #[serde(default)]
    pub region: Option<String>,

    /// Preferred endpoint identifier
    #[serde(default)]
    pub endpoint_id: Option<String>,

    /// Access class for endpoint resolution
    #[serde(default)]
    pub interface: AccessClass,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl ClientConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Load configuration from `OS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let interface: AccessClass = match get("OS_INTERFACE") {
            Some(value) => value.parse()?,
            None => AccessClass::default(),
        };

        Ok(Self {
            identity_url: get("OS_AUTH_URL"),
            tenant_name: get("OS_TENANT_NAME").or_else(|| get("OS_PROJECT_NAME")),
            username: get("OS_USERNAME"),
            password: get("OS_PASSWORD"),
            region: get("OS_REGION_NAME"),
            endpoint_id: None,
            interface,
            http: HttpConfig::default(),
        })
    }

    /// Credentials for authentication; every field must be present
    pub fn credentials(&self) -> Result<Credentials> {
        let field = |value: &Option<String>, name: &str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::missing_field(name))
        };

        Ok(Credentials::new(
            field(&self.tenant_name, "tenant_name")?,
            field(&self.username, "username")?,
            field(&self.password, "password")?,
        ))
    }

    /// Default endpoint selection criteria
    pub fn selection(&self) -> EndpointSelection {
        let mut selection = EndpointSelection::new().interface(self.interface);
        selection.region = self.region.clone();
        selection.endpoint_id = self.endpoint_id.clone();
        selection
    }

    /// Settings for the default transport
    pub fn transport_config(&self) -> TransportConfig {
        let mut builder = TransportConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .connect_timeout(Duration::from_secs(self.http.connect_timeout_seconds));
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_parse_minimal_config() {
        let config = ClientConfig::from_yaml_str("identity_url: http://keystone:5000/v2.0\n").unwrap();
        assert_eq!(
            config.identity_url.as_deref(),
            Some("http://keystone:5000/v2.0")
        );
        assert_eq!(config.interface, AccessClass::Public);
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
identity_url: "http://keystone:5000/v2.0"
project_name: demo
username: admin
password: secret
region: RegionOne
interface: internal
http:
  timeout_seconds: 5
  user_agent: "tests/1.0"
"#;
        let config = ClientConfig::from_yaml_str(yaml).unwrap();

        let creds = config.credentials().unwrap();
        assert_eq!(creds.tenant_name, "demo");
        assert_eq!(creds.username, "admin");

        let selection = config.selection();
        assert_eq!(selection.region.as_deref(), Some("RegionOne"));
        assert_eq!(selection.access_class().unwrap(), AccessClass::Internal);

        let transport = config.transport_config();
        assert_eq!(transport.timeout, Duration::from_secs(5));
        assert_eq!(transport.connect_timeout, Duration::from_secs(10));
        assert_eq!(transport.user_agent, "tests/1.0");
    }

    #[test]
    fn test_interface_spellings_match_env() {
        for (spelling, expected) in [
            ("publicURL", AccessClass::Public),
            ("InternalURL", AccessClass::Internal),
            ("ADMIN", AccessClass::Admin),
        ] {
            let yaml = ClientConfig::from_yaml_str(&format!("interface: {spelling}\n")).unwrap();
            let env = ClientConfig::from_lookup(|k| (k == "OS_INTERFACE").then(|| spelling.to_string())).unwrap();
            assert_eq!(yaml.interface, expected);
            assert_eq!(env.interface, expected);
        }

        assert!(ClientConfig::from_yaml_str("interface: private\n").is_err());
    }

    #[test]
    fn test_missing_credentials_field() {
        let config = ClientConfig {
            tenant_name: Some("demo".into()),
            username: Some("admin".into()),
            password: Some(String::new()),
            ..Default::default()
        };
        let err = config.credentials().unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { field } if field == "password"));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("OS_AUTH_URL", "http://keystone:5000/v2.0"),
            ("OS_PROJECT_NAME", "demo"),
            ("OS_USERNAME", "admin"),
            ("OS_PASSWORD", "secret"),
            ("OS_REGION_NAME", "RegionOne"),
            ("OS_INTERFACE", "admin"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string())).unwrap();
        assert_eq!(config.tenant_name.as_deref(), Some("demo"));
        assert_eq!(config.region.as_deref(), Some("RegionOne"));
        assert_eq!(config.interface, AccessClass::Admin);
    }

    #[test]
    fn test_from_lookup_bad_interface() {
        let result = ClientConfig::from_lookup(|k| (k == "OS_INTERFACE").then(|| "private".to_string()));
        assert!(matches!(result, Err(Error::InvalidSelection { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "identity_url: http://keystone:5000/v2.0").unwrap();
        writeln!(file, "tenant_name: demo").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tenant_name.as_deref(), Some("demo"));
    }

    #[test]
    fn test_from_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/keystone-rest.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
