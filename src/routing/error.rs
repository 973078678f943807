//! Registration errors.

use thiserror::Error;

use crate::validation::SchemaError;

/// A route could not be registered. Raised at startup; fatal.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("Route already defined: ({method}) {url}")]
    DuplicateRoute { method: String, url: String },

    #[error("Route {url} conflicts with {existing}: parameters at the same position differ")]
    ConflictingRoute { url: String, existing: String },

    #[error("Route ({method}) {url} has no operation id")]
    MissingOperationId { method: String, url: String },

    #[error("Route ({method}) {url} has no handlers")]
    MissingHandlers { method: String, url: String },

    #[error("Invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid {location} schema for {operation_id}: {source}")]
    InvalidSchema {
        operation_id: String,
        location: String,
        #[source]
        source: SchemaError,
    },
}

impl RegistrarError {
    pub(crate) fn duplicate(method: impl Into<String>, url: impl Into<String>) -> Self {
        RegistrarError::DuplicateRoute {
            method: method.into(),
            url: url.into(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, RegistrarError::DuplicateRoute { .. })
    }
}
