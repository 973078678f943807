//! Documentation base properties.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::docs::openapi::{ApiInfo, SecurityRequirement, Server, Tag};
use crate::http::middleware::BoxedMiddleware;

/// Document-level properties merged into every generated OpenAPI document,
/// plus the middleware that guards the served documentation.
#[derive(Clone, Default)]
pub struct SwaggerBaseProperties {
    pub info: ApiInfo,
    pub servers: Vec<Server>,
    pub tags: Vec<Tag>,
    /// `components.securitySchemes`, by scheme name.
    pub security_schemes: BTreeMap<String, Value>,
    /// Document-wide security; non-public operations inherit it.
    pub security: Vec<SecurityRequirement>,
    /// Run before the documentation endpoints.
    pub pre_handlers: Vec<BoxedMiddleware>,
}

impl SwaggerBaseProperties {
    pub fn new(info: ApiInfo) -> Self {
        Self {
            info,
            ..Self::default()
        }
    }

    pub fn server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    pub fn servers(mut self, servers: impl IntoIterator<Item = Server>) -> Self {
        self.servers.extend(servers);
        self
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn security_scheme(mut self, name: impl Into<String>, scheme: Value) -> Self {
        self.security_schemes.insert(name.into(), scheme);
        self
    }

    pub fn security(mut self, requirement: SecurityRequirement) -> Self {
        self.security.push(requirement);
        self
    }

    pub fn pre_handler(mut self, middleware: BoxedMiddleware) -> Self {
        self.pre_handlers.push(middleware);
        self
    }
}

impl fmt::Debug for SwaggerBaseProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwaggerBaseProperties")
            .field("info", &self.info)
            .field("servers", &self.servers)
            .field("tags", &self.tags)
            .field("security_schemes", &self.security_schemes)
            .field("security", &self.security)
            .field("pre_handlers", &self.pre_handlers.len())
            .finish()
    }
}
