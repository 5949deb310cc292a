//! Error types for keystone-rest
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for keystone-rest
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Catalog Errors
    // ============================================================================
    #[error("Not authenticated: call authenticate() before resolving services")]
    NotAuthenticated,

    #[error("Service '{service}' not found in catalog")]
    UnknownService { service: String },

    #[error("No matching endpoint for service '{service}': {message}")]
    NoMatchingEndpoint { service: String, message: String },

    #[error("Invalid endpoint selection: {message}")]
    InvalidSelection { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Response page has no '{attribute}' attribute")]
    MissingAttribute { attribute: String },

    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create a service error from a 4xx/5xx response.
    ///
    /// An empty body is replaced with a generic message naming the status.
    pub fn service(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let body = if body.is_empty() {
            format!("HTTP request failed with status {status}")
        } else {
            body
        };
        Self::Service { status, body }
    }

    /// Create an unknown service error
    pub fn unknown_service(service: impl Into<String>) -> Self {
        Self::UnknownService {
            service: service.into(),
        }
    }

    /// Create a no-matching-endpoint error
    pub fn no_matching_endpoint(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NoMatchingEndpoint {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an invalid selection error
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection {
            message: message.into(),
        }
    }

    /// Create a missing attribute error
    pub fn missing_attribute(attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute: attribute.into(),
        }
    }

    /// Whether this error came from a 4xx/5xx response
    pub fn is_service(&self) -> bool {
        matches!(self, Error::Service { .. })
    }

    /// HTTP status of a service error
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Remote body text of a service error, verbatim
    pub fn service_body(&self) -> Option<&str> {
        match self {
            Error::Service { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Result type alias for keystone-rest
pub type Result<T> = std::result::Result<T, Error>;
