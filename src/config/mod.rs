//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → RegistrarConfig (validated, immutable)
//!     → RegistrarOptions::from_config / HttpServer::new / init_logging
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; routes are never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    LogFormat, ObservabilityConfig, RegistrarConfig, ServerConfig, SwaggerConfig, ValidationConfig,
};
pub use validation::{validate_config, ValidationError};
