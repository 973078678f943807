//! Schema validation subsystem.
//!
//! # Data Flow
//! ```text
//! RouteSchema (registration time)
//!     → schema.rs (descriptors → CompiledSchema via jsonschema)
//!     → request.rs  (RequestValidator stage)
//!     → response.rs (ResponseValidator stage)
//!
//! Per request:
//!     params / query / headers / body → JSON values → violations
//!     → 400 Bad Request, or warn + continue
//!     response body → violations → warn only
//! ```
//!
//! # Design Decisions
//! - Schemas compile once, at registration; a bad schema stops startup
//! - Compiled validators are Arc-shared and immutable
//! - Response validation never changes the response

pub mod request;
pub mod response;
pub mod schema;

pub use request::RequestValidator;
pub use response::ResponseValidator;
pub use schema::{CompiledSchema, RequestPart, RequestSchema, ResponseSchemas, RouteSchema, SchemaError};
