//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RouteDefinition (url, operation id, stages, schema, doc metadata)
//!     → registrar.rs
//!         path.rs        (normalise url, detect parameter conflicts)
//!         validation     (compile schemas into stages)
//!         descriptor.rs  (record RouteDescriptor in the RouteTable)
//!         http::pipeline (fixed stage order, error forwarding)
//!     → axum Router (installed per method and url)
//!
//! RouteTable → docs::generate → OpenAPI document
//! ```
//!
//! # Design Decisions
//! - Routes are registered at startup, immutable at runtime
//! - Duplicate `(verb, url)` pairs fail before anything is installed
//! - Deterministic: the same registrations always produce the same document

pub mod definition;
pub mod descriptor;
pub mod error;
pub mod options;
pub(crate) mod path;
pub mod registrar;

pub use definition::RouteDefinition;
pub use descriptor::{RouteDescriptor, RouteTable, Verb};
pub use error::RegistrarError;
pub use options::RegistrarOptions;
pub use registrar::{introspection, Registrar};
