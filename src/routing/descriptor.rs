//! Route metadata.
//!
//! # Responsibilities
//! - Name the verbs a registrar accepts
//! - Hold one immutable descriptor per registered `(verb, url)`
//! - Answer lookups by `(verb, url)` and iterate in registration order
//!
//! # Design Decisions
//! - The table belongs to one registrar; nothing is global
//! - No update or delete: descriptors live as long as the registrar

use axum::{http::Method, routing::MethodFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::validation::RouteSchema;

/// HTTP verb a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Verb {
    pub const ALL: [Verb; 5] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete, Verb::Patch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
            Verb::Patch => "patch",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
            Verb::Patch => Method::PATCH,
        }
    }

    pub fn method_filter(&self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Delete => MethodFilter::DELETE,
            Verb::Patch => MethodFilter::PATCH,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata recorded for one registered route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    verb: Verb,
    url: String,
    operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<RouteSchema>,
    is_public: bool,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl RouteDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        verb: Verb,
        url: String,
        operation_id: String,
        schema: Option<RouteSchema>,
        is_public: bool,
        tags: Vec<String>,
        summary: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            verb,
            url,
            operation_id,
            schema,
            is_public,
            tags,
            summary,
            description,
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Normalised url pattern (`/users/{id}`).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn schema(&self) -> Option<&RouteSchema> {
        self.schema.as_ref()
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Every route registered on one registrar.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteDescriptor>,
    index: HashMap<(Verb, String), usize>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, verb: Verb, url: &str) -> bool {
        self.index.contains_key(&(verb, url.to_string()))
    }

    pub fn get(&self, verb: Verb, url: &str) -> Option<&RouteDescriptor> {
        self.index
            .get(&(verb, url.to_string()))
            .map(|&i| &self.entries[i])
    }

    /// Record a descriptor. Returns it back if `(verb, url)` is taken.
    pub(crate) fn insert(&mut self, descriptor: RouteDescriptor) -> Result<(), RouteDescriptor> {
        let key = (descriptor.verb, descriptor.url.clone());
        if self.index.contains_key(&key) {
            return Err(descriptor);
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(descriptor);
        Ok(())
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.entries.iter()
    }

    pub fn by_verb(&self, verb: Verb) -> impl Iterator<Item = &RouteDescriptor> {
        self.entries.iter().filter(move |d| d.verb == verb)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
