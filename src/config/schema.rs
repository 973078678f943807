//! Configuration schema definitions.
//!
//! This module defines the configuration file structure of a routekeeper
//! service. All types derive Serde traits for deserialization from TOML.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Listener and request timeout.
    pub server: ServerConfig,

    /// Schema validation settings.
    pub validation: ValidationConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// API documentation settings.
    pub swagger: SwaggerConfig,
}

/// Server harness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Schema validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Add a response validator to routes that declare response schemas.
    pub validate_responses: bool,

    /// Largest request body the request validator will buffer.
    pub max_body_bytes: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_responses: false,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Add a request logger as the first stage of every route.
    pub log_requests: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_requests: false,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// API documentation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwaggerConfig {
    /// `info.title` of the generated document.
    pub title: String,

    /// `info.version` of the generated document.
    pub version: String,

    /// `info.description` of the generated document.
    pub description: Option<String>,

    /// Where the documentation UI is mounted.
    pub docs_path: String,

    /// Server URLs listed in the document.
    pub servers: Vec<String>,
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            title: "API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
            docs_path: "/docs".to_string(),
            servers: Vec::new(),
        }
    }
}
