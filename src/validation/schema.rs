//! Schema descriptors attached to routes.
//!
//! A request schema maps each [`RequestPart`] to a JSON Schema; a response
//! schema maps status codes to JSON Schemas. Descriptors are plain JSON so
//! they double as their own JSON-Schema translation for documentation and
//! introspection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Part of an incoming request that a schema applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPart {
    Params,
    Query,
    Headers,
    Body,
}

impl RequestPart {
    pub const ALL: [RequestPart; 4] = [
        RequestPart::Params,
        RequestPart::Query,
        RequestPart::Headers,
        RequestPart::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPart::Params => "params",
            RequestPart::Query => "query",
            RequestPart::Headers => "headers",
            RequestPart::Body => "body",
        }
    }
}

impl fmt::Display for RequestPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request shape: one JSON Schema per request part.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestSchema {
    parts: BTreeMap<RequestPart, Value>,
}

impl RequestSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(mut self, part: RequestPart, schema: Value) -> Self {
        self.parts.insert(part, schema);
        self
    }

    pub fn params(self, schema: Value) -> Self {
        self.part(RequestPart::Params, schema)
    }

    pub fn query(self, schema: Value) -> Self {
        self.part(RequestPart::Query, schema)
    }

    pub fn headers(self, schema: Value) -> Self {
        self.part(RequestPart::Headers, schema)
    }

    pub fn body(self, schema: Value) -> Self {
        self.part(RequestPart::Body, schema)
    }

    pub fn get(&self, part: RequestPart) -> Option<&Value> {
        self.parts.get(&part)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RequestPart, &Value)> {
        self.parts.iter().map(|(part, schema)| (*part, schema))
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// JSON-Schema translation keyed by part name.
    pub fn to_json_schema(&self) -> Map<String, Value> {
        self.parts
            .iter()
            .map(|(part, schema)| (part.as_str().to_string(), schema.clone()))
            .collect()
    }
}

/// Response shapes keyed by status code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseSchemas {
    by_status: BTreeMap<u16, Value>,
}

impl ResponseSchemas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: u16, schema: Value) -> Self {
        self.by_status.insert(status, schema);
        self
    }

    pub fn get(&self, status: u16) -> Option<&Value> {
        self.by_status.get(&status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &Value)> {
        self.by_status.iter().map(|(status, schema)| (*status, schema))
    }

    pub fn is_empty(&self) -> bool {
        self.by_status.is_empty()
    }
}

/// Request and response shapes of one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<ResponseSchemas>,
}

impl RouteSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(mut self, request: RequestSchema) -> Self {
        self.request = Some(request);
        self
    }

    pub fn responses(mut self, responses: ResponseSchemas) -> Self {
        self.responses = Some(responses);
        self
    }
}

/// A JSON Schema failed to compile.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct SchemaError(pub String);

/// A compiled JSON Schema, cheap to clone.
#[derive(Clone)]
pub struct CompiledSchema {
    source: Arc<Value>,
    validator: Arc<jsonschema::Validator>,
}

impl CompiledSchema {
    pub fn compile(schema: &Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| SchemaError(e.to_string()))?;
        Ok(Self {
            source: Arc::new(schema.clone()),
            validator: Arc::new(validator),
        })
    }

    /// Every violation of `instance`, as messages.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        self.validator
            .iter_errors(instance)
            .map(|err| err.to_string())
            .collect()
    }

    pub fn source(&self) -> &Value {
        &self.source
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_schema_json_translation() {
        let schema = RequestSchema::new()
            .body(json!({ "type": "object", "required": ["name"] }))
            .params(json!({ "type": "object" }));

        let translated = schema.to_json_schema();
        assert_eq!(translated.len(), 2);
        assert_eq!(translated["body"]["required"], json!(["name"]));
        assert_eq!(serde_json::to_value(&schema).unwrap(), Value::Object(translated));
    }

    #[test]
    fn test_compiled_schema_reports_violations() {
        let compiled = CompiledSchema::compile(&json!({
            "type": "object",
            "properties": { "qty": { "type": "integer", "minimum": 1 } },
            "required": ["qty"]
        }))
        .unwrap();

        assert!(compiled.violations(&json!({ "qty": 2 })).is_empty());
        assert_eq!(compiled.violations(&json!({ "qty": 0 })).len(), 1);
        assert!(!compiled.violations(&json!({})).is_empty());
    }

    #[test]
    fn test_invalid_schema_fails_to_compile() {
        let err = CompiledSchema::compile(&json!({ "type": "no-such-type", "pattern": "(unclosed" })).unwrap_err();
        assert!(!err.0.is_empty());
    }

    #[test]
    fn test_response_schemas_by_status() {
        let schemas = ResponseSchemas::new()
            .status(200, json!({ "type": "object" }))
            .status(404, json!({ "type": "string" }));
        assert!(schemas.get(200).is_some());
        assert!(schemas.get(500).is_none());
        assert_eq!(serde_json::to_value(&schemas).unwrap()["404"]["type"], "string");
    }
}
