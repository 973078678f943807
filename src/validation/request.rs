//! Request validator stage.
//!
//! # Responsibilities
//! - Collect path params, query string, headers and JSON body as JSON values
//! - Validate each part against its compiled schema
//! - Reject with 400 or, in warn-only mode, log and let the request through
//!
//! # Design Decisions
//! - Params, query and header values arrive as strings; they are coerced to
//!   the `integer`, `number` or `boolean` type the schema declares for them
//! - The body is buffered only when a body schema exists, then handed on intact
//! - An empty body validates as `null`

use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Query, RawPathParams},
    http::{request::Parts, Request},
};
use http_body_util::LengthLimitError;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::http::error::{FieldError, RouteError, RouteResult};
use crate::http::middleware::{BoxFuture, Middleware, Next};
use crate::http::request::CorrelationIdExt;
use crate::validation::schema::{CompiledSchema, RequestPart, RequestSchema, SchemaError};

/// Validates incoming requests against a [`RequestSchema`].
#[derive(Clone, Debug)]
pub struct RequestValidator {
    inner: Arc<RequestValidatorInner>,
}

#[derive(Debug)]
struct RequestValidatorInner {
    parts: Vec<(RequestPart, CompiledSchema)>,
    warn_only: bool,
    max_body_bytes: usize,
}

impl RequestValidator {
    /// Compile every part of `schema`. Fails on the first invalid part.
    pub fn compile(
        schema: &RequestSchema,
        warn_only: bool,
        max_body_bytes: usize,
    ) -> Result<Self, (RequestPart, SchemaError)> {
        let parts = schema
            .iter()
            .map(|(part, schema)| {
                CompiledSchema::compile(schema)
                    .map(|compiled| (part, compiled))
                    .map_err(|err| (part, err))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            inner: Arc::new(RequestValidatorInner {
                parts,
                warn_only,
                max_body_bytes,
            }),
        })
    }

    pub fn is_warn_only(&self) -> bool {
        self.inner.warn_only
    }

    fn schema_for(&self, part: RequestPart) -> Option<&CompiledSchema> {
        self.inner
            .parts
            .iter()
            .find(|(p, _)| *p == part)
            .map(|(_, schema)| schema)
    }

    /// Validate `req`, returning it (body restored) with every violation found.
    pub async fn inspect(&self, req: Request<Body>) -> Result<(Request<Body>, Vec<FieldError>), RouteError> {
        let (mut parts, body) = req.into_parts();
        let mut violations = Vec::new();

        for (part, schema) in &self.inner.parts {
            let instance = match part {
                RequestPart::Params => path_params(&mut parts, schema.source()).await,
                RequestPart::Query => query_params(&parts, schema.source()),
                RequestPart::Headers => header_values(&parts, schema.source()),
                RequestPart::Body => continue,
            };
            violations.extend(
                schema
                    .violations(&instance)
                    .into_iter()
                    .map(|message| FieldError::new(*part, message)),
            );
        }

        let body = match self.schema_for(RequestPart::Body) {
            Some(schema) => {
                let bytes = to_bytes(body, self.inner.max_body_bytes)
                    .await
                    .map_err(|err| body_error(err, self.inner.max_body_bytes))?;

                let instance = if bytes.is_empty() {
                    Ok(Value::Null)
                } else {
                    serde_json::from_slice::<Value>(&bytes)
                };

                match instance {
                    Ok(instance) => violations.extend(
                        schema
                            .violations(&instance)
                            .into_iter()
                            .map(|message| FieldError::new(RequestPart::Body, message)),
                    ),
                    Err(err) => violations.push(FieldError::new(
                        RequestPart::Body,
                        format!("body is not valid JSON: {}", err),
                    )),
                }

                Body::from(bytes)
            }
            None => body,
        };

        Ok((Request::from_parts(parts, body), violations))
    }
}

impl Middleware for RequestValidator {
    fn call(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, RouteResult> {
        let validator = self.clone();
        Box::pin(async move {
            let (req, violations) = validator.inspect(req).await?;

            if !violations.is_empty() {
                if !validator.is_warn_only() {
                    return Err(RouteError::validation(violations));
                }

                let request_id = req
                    .correlation_id()
                    .map(|id| id.to_string())
                    .unwrap_or_default();
                for violation in &violations {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %req.method(),
                        path = %req.uri().path(),
                        part = %violation.part,
                        violation = %violation.message,
                        "Request validation failed, continuing"
                    );
                }
            }

            next.run(req).await
        })
    }
}

/// 413 when the body hit the size limit, a plain body error otherwise.
fn body_error(err: axum::Error, limit: usize) -> RouteError {
    let inner = err.into_inner();
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(inner.as_ref());
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return RouteError::payload_too_large(limit);
        }
        source = err.source();
    }
    RouteError::from(axum::Error::new(inner))
}

async fn path_params(parts: &mut Parts, schema: &Value) -> Value {
    let mut object = Map::new();
    if let Ok(params) = RawPathParams::from_request_parts(parts, &()).await {
        for (name, raw) in &params {
            object.insert(name.to_string(), coerce(schema, name, raw));
        }
    }
    Value::Object(object)
}

fn query_params(parts: &Parts, schema: &Value) -> Value {
    let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();

    let mut object = Map::new();
    for (name, raw) in pairs {
        let value = coerce(schema, &name, &raw);
        match object.get_mut(&name) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                let value = if declared_type(schema, &name) == Some("array") {
                    Value::Array(vec![value])
                } else {
                    value
                };
                object.insert(name, value);
            }
        }
    }
    Value::Object(object)
}

fn header_values(parts: &Parts, schema: &Value) -> Value {
    let mut object = Map::new();
    for (name, value) in &parts.headers {
        if let Ok(raw) = value.to_str() {
            object.insert(name.as_str().to_string(), coerce(schema, name.as_str(), raw));
        }
    }
    Value::Object(object)
}

/// Type declared for `properties.<name>` in an object schema.
fn declared_type<'a>(schema: &'a Value, name: &str) -> Option<&'a str> {
    schema
        .get("properties")
        .and_then(|props| props.get(name))
        .and_then(|prop| prop.get("type"))
        .and_then(Value::as_str)
}

fn coerce(schema: &Value, name: &str, raw: &str) -> Value {
    let target = match declared_type(schema, name) {
        Some("array") => schema
            .get("properties")
            .and_then(|props| props.get(name))
            .and_then(|prop| prop.get("items"))
            .and_then(|items| items.get("type"))
            .and_then(Value::as_str),
        other => other,
    };

    match target {
        Some("integer") => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("number") => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Some("boolean") => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}
