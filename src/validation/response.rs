//! Response validator stage.
//!
//! Observational only: the response produced downstream is inspected and
//! forwarded unchanged, whatever the outcome. Only JSON responses whose
//! status has a schema are buffered.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request},
    response::Response,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::http::error::RouteResult;
use crate::http::middleware::{BoxFuture, Middleware, Next};
use crate::http::request::CorrelationIdExt;
use crate::validation::schema::{CompiledSchema, ResponseSchemas, SchemaError};

/// Checks outgoing JSON payloads against per-status schemas.
#[derive(Clone, Debug)]
pub struct ResponseValidator {
    schemas: Arc<BTreeMap<u16, CompiledSchema>>,
}

impl ResponseValidator {
    pub fn compile(schemas: &ResponseSchemas) -> Result<Self, (u16, SchemaError)> {
        let schemas = schemas
            .iter()
            .map(|(status, schema)| {
                CompiledSchema::compile(schema)
                    .map(|compiled| (status, compiled))
                    .map_err(|err| (status, err))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            schemas: Arc::new(schemas),
        })
    }

    /// Violations of `payload` for `status`; `None` when the status has no schema.
    pub fn check(&self, status: u16, payload: &Value) -> Option<Vec<String>> {
        self.schemas
            .get(&status)
            .map(|schema| schema.violations(payload))
    }
}

impl Middleware for ResponseValidator {
    fn call(&self, req: Request<Body>, next: Next) -> BoxFuture<'static, RouteResult> {
        let validator = self.clone();
        let request_id = req
            .correlation_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        Box::pin(async move {
            let response = next.run(req).await?;
            let status = response.status().as_u16();

            if !validator.schemas.contains_key(&status) || !is_json(response.headers()) {
                return Ok(response);
            }

            let (parts, body) = response.into_parts();
            let bytes = to_bytes(body, usize::MAX).await?;

            match serde_json::from_slice::<Value>(&bytes) {
                Ok(payload) => {
                    let violations = validator.check(status, &payload).unwrap_or_default();
                    for message in &violations {
                        tracing::warn!(
                            request_id = %request_id,
                            method = %method,
                            path = %path,
                            status,
                            violation = %message,
                            "Response validation failed"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        status,
                        error = %err,
                        "Response body is not valid JSON"
                    );
                }
            }

            Ok(Response::from_parts(parts, Body::from(bytes)))
        })
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}
