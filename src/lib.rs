//! routekeeper: declarative route registration for axum.
//!
//! # Architecture Overview
//!
//! ```text
//!   RouteDefinition ──▶ routing::Registrar ──▶ RouteTable ──▶ docs (OpenAPI, Swagger UI)
//!                              │
//!                              ▼
//!                      http::Pipeline (per route)
//!      request logger → pre-handlers → request validator
//!                     → response validator → handlers
//!                              │
//!                              ▼ failure
//!                      http::ErrorHandler (exactly once)
//!
//!   Cross-cutting: config (TOML), observability (tracing), lifecycle (shutdown)
//! ```

pub mod config;
pub mod docs;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod validation;

pub use config::RegistrarConfig;
pub use http::{handler, from_fn, HttpServer, Next, RouteError};
pub use lifecycle::Shutdown;
pub use routing::{Registrar, RegistrarError, RegistrarOptions, RouteDefinition, Verb};
pub use validation::{RequestSchema, ResponseSchemas, RouteSchema};
