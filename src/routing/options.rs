//! Registrar-wide options, fixed at construction.

use std::fmt;
use std::sync::Arc;

use crate::config::RegistrarConfig;
use crate::docs::{ApiInfo, Server, SwaggerBaseProperties};
use crate::http::request::{default_correlation_id_extractor, CorrelationIdExtractor};
use crate::http::response::{ErrorHandler, JsonErrorHandler};

const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Options shared by every route of a registrar.
#[derive(Clone)]
pub struct RegistrarOptions {
    /// Add a response validator to routes with response schemas.
    pub validate_responses: bool,
    /// Add a request logger as the first stage of every route.
    pub log_requests: bool,
    /// Largest request body the request validator buffers.
    pub max_body_bytes: usize,
    pub correlation_id_extractor: CorrelationIdExtractor,
    pub error_handler: Arc<dyn ErrorHandler>,
    pub swagger: SwaggerBaseProperties,
}

impl Default for RegistrarOptions {
    fn default() -> Self {
        Self {
            validate_responses: false,
            log_requests: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            correlation_id_extractor: default_correlation_id_extractor(),
            error_handler: Arc::new(JsonErrorHandler),
            swagger: SwaggerBaseProperties::default(),
        }
    }
}

impl RegistrarOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from the file configuration; hooks keep their defaults.
    pub fn from_config(config: &RegistrarConfig) -> Self {
        let mut info = ApiInfo::new(&config.swagger.title, &config.swagger.version);
        info.description = config.swagger.description.clone();

        Self {
            validate_responses: config.validation.validate_responses,
            log_requests: config.observability.log_requests,
            max_body_bytes: config.validation.max_body_bytes,
            swagger: SwaggerBaseProperties::new(info)
                .servers(config.swagger.servers.iter().map(Server::new)),
            ..Self::default()
        }
    }

    pub fn validate_responses(mut self, enabled: bool) -> Self {
        self.validate_responses = enabled;
        self
    }

    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn correlation_id_extractor(mut self, extractor: CorrelationIdExtractor) -> Self {
        self.correlation_id_extractor = extractor;
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    pub fn swagger(mut self, swagger: SwaggerBaseProperties) -> Self {
        self.swagger = swagger;
        self
    }
}

impl fmt::Debug for RegistrarOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrarOptions")
            .field("validate_responses", &self.validate_responses)
            .field("log_requests", &self.log_requests)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("swagger", &self.swagger)
            .finish_non_exhaustive()
    }
}
