//! Declarative route registration.
//!
//! # Responsibilities
//! - Accept one [`RouteDefinition`] per verb registration
//! - Refuse duplicate and conflicting patterns before touching the router
//! - Compile schemas into validator stages (fail fast at startup)
//! - Compose and install the route pipeline
//! - Serve schema introspection and API documentation
//!
//! # Design Decisions
//! - The route table and router belong to the registrar instance
//! - Registration takes `&mut self`; request handling only sees the
//!   immutable pipelines built here
//! - Every installed `(method, url)` is tracked, including the `OPTIONS`
//!   and documentation endpoints, so no registration can make axum panic

use axum::{
    http::{header, Method},
    response::Html,
    routing::{on, MethodFilter, MethodRouter},
    Json, Router,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::docs::{self, generate_swagger_html, OpenApiDocument};
use crate::http::error::RouteError;
use crate::http::middleware::{handler, BoxedMiddleware};
use crate::http::pipeline::{Pipeline, PipelineBuilder};
use crate::observability::RequestLogger;
use crate::routing::definition::RouteDefinition;
use crate::routing::descriptor::{RouteDescriptor, RouteTable, Verb};
use crate::routing::error::RegistrarError;
use crate::routing::options::RegistrarOptions;
use crate::routing::path;
use crate::validation::{RequestValidator, ResponseValidator, RouteSchema};

/// Verbs answered by the schema introspection endpoint.
const INTROSPECTED_VERBS: [Verb; 3] = [Verb::Get, Verb::Post, Verb::Put];

/// Registers routes on an axum [`Router`] and keeps their metadata.
pub struct Registrar {
    app: Router,
    routes: RouteTable,
    options: RegistrarOptions,
    installed: HashSet<(Method, String)>,
    patterns: Vec<String>,
}

impl Registrar {
    pub fn new(app: Router, options: RegistrarOptions) -> Self {
        Self {
            app,
            routes: RouteTable::new(),
            options,
            installed: HashSet::new(),
            patterns: Vec::new(),
        }
    }

    pub fn get(&mut self, definition: RouteDefinition) -> Result<(), RegistrarError> {
        self.route(Verb::Get, definition)
    }

    pub fn post(&mut self, definition: RouteDefinition) -> Result<(), RegistrarError> {
        self.route(Verb::Post, definition)
    }

    pub fn put(&mut self, definition: RouteDefinition) -> Result<(), RegistrarError> {
        self.route(Verb::Put, definition)
    }

    pub fn delete(&mut self, definition: RouteDefinition) -> Result<(), RegistrarError> {
        self.route(Verb::Delete, definition)
    }

    pub fn patch(&mut self, definition: RouteDefinition) -> Result<(), RegistrarError> {
        self.route(Verb::Patch, definition)
    }

    /// Register `definition` for `verb`.
    pub fn route(&mut self, verb: Verb, definition: RouteDefinition) -> Result<(), RegistrarError> {
        let RouteDefinition {
            url: raw_url,
            operation_id,
            pre_handlers,
            handlers,
            schema,
            is_public,
            tags,
            summary,
            description,
            warn_on_request_validation_error,
        } = definition;

        let url = normalize(&raw_url)?;
        if operation_id.trim().is_empty() {
            return Err(RegistrarError::MissingOperationId {
                method: verb.to_string(),
                url,
            });
        }
        if handlers.is_empty() {
            return Err(RegistrarError::MissingHandlers {
                method: verb.to_string(),
                url,
            });
        }
        self.ensure_free(&verb.method(), &url)?;

        let request_validator = match schema.as_ref().and_then(|s| s.request.as_ref()) {
            Some(request) => Some(
                RequestValidator::compile(
                    request,
                    warn_on_request_validation_error,
                    self.options.max_body_bytes,
                )
                .map_err(|(part, source)| RegistrarError::InvalidSchema {
                    operation_id: operation_id.clone(),
                    location: format!("request {}", part),
                    source,
                })?,
            ),
            None => None,
        };

        let response_validator = match schema.as_ref().and_then(|s| s.responses.as_ref()) {
            Some(responses) => Some(ResponseValidator::compile(responses).map_err(
                |(status, source)| RegistrarError::InvalidSchema {
                    operation_id: operation_id.clone(),
                    location: format!("response {}", status),
                    source,
                },
            )?),
            None => None,
        };

        let descriptor = RouteDescriptor::new(
            verb,
            url.clone(),
            operation_id.clone(),
            schema,
            is_public,
            tags,
            summary,
            description,
        );
        self.routes
            .insert(descriptor)
            .map_err(|_| RegistrarError::duplicate(verb.as_str(), url.as_str()))?;

        let mut builder = self.base_pipeline(&url).pre_handlers(pre_handlers);
        if let Some(validator) = request_validator {
            builder = builder.request_validator(Arc::new(validator));
        }
        if self.options.validate_responses {
            if let Some(validator) = response_validator {
                builder = builder.response_validator(Arc::new(validator));
            }
        }
        let builder = builder.handlers(handlers);

        tracing::debug!(
            method = %verb,
            route = %url,
            operation_id = %operation_id,
            stages = ?builder.stages(),
            "Route registered"
        );

        let pipeline = self.finish(builder, verb.method(), &url);
        self.install(verb.method(), &url, pipeline.into_method_router(verb.method_filter()));
        Ok(())
    }

    /// Install `OPTIONS url`, answering with the request schemas of `schemas`.
    pub fn schema(
        &mut self,
        url: &str,
        schemas: &BTreeMap<Verb, RouteSchema>,
    ) -> Result<(), RegistrarError> {
        let url = normalize(url)?;
        self.ensure_free(&Method::OPTIONS, &url)?;

        let answer = Arc::new(introspection(schemas));
        let endpoint = on(MethodFilter::OPTIONS, move || {
            let answer = Arc::clone(&answer);
            async move { Json(answer.as_ref().clone()) }
        });

        tracing::debug!(route = %url, "Schema introspection registered");
        self.install(Method::OPTIONS, &url, endpoint);
        Ok(())
    }

    /// OpenAPI document for every route registered so far.
    pub fn to_swagger(&self) -> OpenApiDocument {
        docs::generate(&self.routes, &self.options.swagger)
    }

    /// Mount the documentation UI at `path` and its document at
    /// `path/openapi.json`, behind the swagger pre-handlers.
    pub fn serve_swagger(&mut self, path: &str) -> Result<(), RegistrarError> {
        let ui_path = normalize(path)?;
        let json_path = path::join(&ui_path, "openapi.json");
        self.ensure_free(&Method::GET, &ui_path)?;
        self.ensure_free(&Method::GET, &json_path)?;

        let document = self.to_swagger();
        let json: Arc<str> = match document.to_json_string() {
            Ok(json) => json.into(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize OpenAPI document");
                "{}".into()
            }
        };
        let html: Arc<str> = generate_swagger_html(&document.info.title, &json_path).into();

        let ui = handler(move |_req| {
            let html = Arc::clone(&html);
            async move { Ok::<_, RouteError>(Html(html.to_string())) }
        });
        let spec = handler(move |_req| {
            let json = Arc::clone(&json);
            async move {
                Ok::<_, RouteError>((
                    [(header::CONTENT_TYPE, "application/json")],
                    json.to_string(),
                ))
            }
        });

        for (route, terminal) in [(ui_path.clone(), ui), (json_path.clone(), spec)] {
            let builder = self
                .base_pipeline(&route)
                .pre_handlers(self.options.swagger.pre_handlers.iter().cloned())
                .handlers([terminal]);
            let pipeline = self.finish(builder, Method::GET, &route);
            self.install(Method::GET, &route, pipeline.into_method_router(MethodFilter::GET));
        }

        tracing::info!(
            path = %ui_path,
            document = %json_path,
            operations = document.operation_count(),
            "API documentation mounted"
        );
        Ok(())
    }

    /// Routes registered so far.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn app(&self) -> &Router {
        &self.app
    }

    pub fn options(&self) -> &RegistrarOptions {
        &self.options
    }

    /// Hand the router over for serving.
    pub fn into_router(self) -> Router {
        self.app
    }

    fn base_pipeline(&self, route: &str) -> PipelineBuilder {
        let builder = Pipeline::builder();
        if self.options.log_requests {
            builder.request_logger(Arc::new(RequestLogger::new(route)) as BoxedMiddleware)
        } else {
            builder
        }
    }

    fn finish(&self, builder: PipelineBuilder, method: Method, route: &str) -> Pipeline {
        builder.build(
            method,
            route,
            Arc::clone(&self.options.correlation_id_extractor),
            Arc::clone(&self.options.error_handler),
        )
    }

    fn ensure_free(&self, method: &Method, url: &str) -> Result<(), RegistrarError> {
        if self.installed.contains(&(method.clone(), url.to_string())) {
            return Err(RegistrarError::duplicate(
                method.as_str().to_lowercase(),
                url,
            ));
        }
        match self.patterns.iter().find(|existing| path::conflicts(existing, url)) {
            Some(existing) => Err(RegistrarError::ConflictingRoute {
                url: url.to_string(),
                existing: existing.clone(),
            }),
            None => Ok(()),
        }
    }

    fn install(&mut self, method: Method, url: &str, endpoint: MethodRouter) {
        self.app = std::mem::take(&mut self.app).route(url, endpoint);
        if !self.patterns.iter().any(|existing| existing == url) {
            self.patterns.push(url.to_string());
        }
        self.installed.insert((method, url.to_string()));
    }
}

/// Introspection answer: request part schemas for each of `get`, `post`, `put`.
pub fn introspection(schemas: &BTreeMap<Verb, RouteSchema>) -> Value {
    let mut answer = Map::new();
    for verb in INTROSPECTED_VERBS {
        if let Some(request) = schemas.get(&verb).and_then(|s| s.request.as_ref()) {
            answer.insert(verb.as_str().to_string(), Value::Object(request.to_json_schema()));
        }
    }
    Value::Object(answer)
}

fn normalize(url: &str) -> Result<String, RegistrarError> {
    path::normalize(url).map_err(|err| RegistrarError::InvalidUrl {
        url: url.to_string(),
        reason: err.reason(),
    })
}
