//! API documentation subsystem.
//!
//! # Data Flow
//! ```text
//! RouteTable + SwaggerBaseProperties
//!     → openapi.rs (generate: OpenApiDocument)
//!     → Registrar::to_swagger (typed document)
//!     → Registrar::serve_swagger
//!         GET {path}              → swagger.rs (Swagger UI page)
//!         GET {path}/openapi.json → document as JSON
//! ```
//!
//! # Design Decisions
//! - Same generator for `to_swagger` and the served document
//! - The UI bundle is loaded from a CDN; no assets are embedded

pub mod config;
pub mod openapi;
pub mod swagger;

pub use config::SwaggerBaseProperties;
pub use openapi::{
    generate, ApiInfo, OpenApiDocument, Operation, PathItem, SecurityRequirement, Server, Tag,
};
pub use swagger::generate_swagger_html;
