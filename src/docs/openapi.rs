//! OpenAPI document types and generation.
//!
//! # Responsibilities
//! - Describe an OpenAPI 3.0 document with serde types
//! - Turn a route table plus base properties into a document
//!
//! # Design Decisions
//! - Generation is a pure function of its inputs
//! - Paths keep registration order; every other map is sorted
//! - Request and response bodies live in `components.schemas` and are
//!   referenced by `$ref`; params, query and headers become parameters

use axum::http::StatusCode;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::docs::config::SwaggerBaseProperties;
use crate::routing::path::param_names;
use crate::routing::{RouteDescriptor, RouteTable, Verb};
use crate::validation::RequestPart;

pub const OPENAPI_VERSION: &str = "3.0.3";

/// Security requirement object: scheme name to scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// API information for the OpenAPI document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ApiInfo {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Default for ApiInfo {
    fn default() -> Self {
        Self::new("API", "1.0.0")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }
}

/// Map that serializes in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V> OrderedMap<V> {
    /// Entry for `key`, inserted with `V::default()` at the end when absent.
    pub fn entry_or_default(&mut self, key: &str) -> &mut V
    where
        V: Default,
    {
        let pos = match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => pos,
            None => {
                self.entries.push((key.to_string(), V::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Path item in the OpenAPI document.
#[derive(Debug, Clone, Serialize, Default)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, verb: Verb) -> Option<&Operation> {
        match verb {
            Verb::Get => self.get.as_ref(),
            Verb::Post => self.post.as_ref(),
            Verb::Put => self.put.as_ref(),
            Verb::Delete => self.delete.as_ref(),
            Verb::Patch => self.patch.as_ref(),
        }
    }

    fn slot(&mut self, verb: Verb) -> &mut Option<Operation> {
        match verb {
            Verb::Get => &mut self.get,
            Verb::Post => &mut self.post,
            Verb::Put => &mut self.put,
            Verb::Delete => &mut self.delete,
            Verb::Patch => &mut self.patch,
        }
    }
}

/// Operation (endpoint) in the OpenAPI document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, ResponseSpec>,
    /// `Some(vec![])` marks a public operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: &'static str,
    pub required: bool,
    pub schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MediaType {
    pub schema: SchemaRef,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct ResponseSpec {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// Schema reference or inline schema.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SchemaRef {
    Ref {
        #[serde(rename = "$ref")]
        reference: String,
    },
    Inline(Value),
}

impl SchemaRef {
    pub fn component(name: &str) -> Self {
        SchemaRef::Ref {
            reference: format!("#/components/schemas/{}", name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, Value>,
}

impl Components {
    fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.security_schemes.is_empty()
    }
}

/// A complete OpenAPI document.
#[derive(Debug, Clone, Serialize)]
pub struct OpenApiDocument {
    pub openapi: &'static str,
    pub info: ApiInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub paths: OrderedMap<PathItem>,
    #[serde(skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

impl OpenApiDocument {
    pub fn operation(&self, verb: Verb, url: &str) -> Option<&Operation> {
        self.paths.get(url).and_then(|item| item.operation(verb))
    }

    /// Number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths
            .entries
            .iter()
            .map(|(_, item)| Verb::ALL.iter().filter(|v| item.operation(**v).is_some()).count())
            .sum()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Pretty JSON text, paths in registration order.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the document for `routes`.
pub fn generate(routes: &RouteTable, base: &SwaggerBaseProperties) -> OpenApiDocument {
    let mut paths: OrderedMap<PathItem> = OrderedMap::default();
    let mut components = Components {
        schemas: BTreeMap::new(),
        security_schemes: base.security_schemes.clone(),
    };

    for route in routes.iter() {
        let operation = operation_for(route, &mut components.schemas);
        *paths.entry_or_default(route.url()).slot(route.verb()) = Some(operation);
    }

    OpenApiDocument {
        openapi: OPENAPI_VERSION,
        info: base.info.clone(),
        servers: base.servers.clone(),
        tags: base.tags.clone(),
        paths,
        components,
        security: base.security.clone(),
    }
}

fn operation_for(route: &RouteDescriptor, schemas: &mut BTreeMap<String, Value>) -> Operation {
    let request = route.schema().and_then(|s| s.request.as_ref());
    let responses = route.schema().and_then(|s| s.responses.as_ref());

    let mut parameters = path_parameters(route.url(), request.and_then(|r| r.get(RequestPart::Params)));
    if let Some(request) = request {
        for (part, location) in [(RequestPart::Query, "query"), (RequestPart::Headers, "header")] {
            if let Some(schema) = request.get(part) {
                parameters.extend(object_parameters(schema, location));
            }
        }
    }

    let request_body = request.and_then(|r| r.get(RequestPart::Body)).map(|schema| {
        let name = format!("{}Body", route.operation_id());
        schemas.insert(name.clone(), schema.clone());
        RequestBody {
            required: true,
            content: json_content(&name),
        }
    });

    let responses = match responses {
        Some(responses) if !responses.is_empty() => responses
            .iter()
            .map(|(status, schema)| {
                let name = format!("{}Response{}", route.operation_id(), status);
                schemas.insert(name.clone(), schema.clone());
                (
                    status.to_string(),
                    ResponseSpec {
                        description: status_description(status),
                        content: Some(json_content(&name)),
                    },
                )
            })
            .collect(),
        _ => BTreeMap::from([(
            "200".to_string(),
            ResponseSpec {
                description: "Successful response".to_string(),
                content: None,
            },
        )]),
    };

    Operation {
        operation_id: route.operation_id().to_string(),
        summary: route.summary().map(str::to_string),
        description: route.description().map(str::to_string),
        tags: route.tags().to_vec(),
        parameters,
        request_body,
        responses,
        security: route.is_public().then(Vec::new),
    }
}

fn path_parameters(url: &str, params: Option<&Value>) -> Vec<Parameter> {
    param_names(url)
        .into_iter()
        .map(|name| Parameter {
            name: name.to_string(),
            location: "path",
            required: true,
            schema: params
                .and_then(|p| p.get("properties"))
                .and_then(|props| props.get(name))
                .cloned()
                .unwrap_or_else(|| json!({ "type": "string" })),
        })
        .collect()
}

fn object_parameters(schema: &Value, location: &'static str) -> Vec<Parameter> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    schema
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, prop)| Parameter {
                    name: name.clone(),
                    location,
                    required: required.contains(&name.as_str()),
                    schema: prop.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn json_content(component: &str) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(
        "application/json".to_string(),
        MediaType {
            schema: SchemaRef::component(component),
        },
    )])
}

fn status_description(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Response")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteDescriptor;
    use crate::validation::{RequestSchema, ResponseSchemas, RouteSchema};

    fn table(routes: Vec<RouteDescriptor>) -> RouteTable {
        let mut table = RouteTable::new();
        for route in routes {
            table.insert(route).unwrap();
        }
        table
    }

    fn route(verb: Verb, url: &str, id: &str, schema: Option<RouteSchema>, public: bool) -> RouteDescriptor {
        RouteDescriptor::new(
            verb,
            url.to_string(),
            id.to_string(),
            schema,
            public,
            vec!["items".to_string()],
            Some(format!("{} summary", id)),
            None,
        )
    }

    #[test]
    fn test_paths_follow_registration_order() {
        let routes = table(vec![
            route(Verb::Get, "/zeta", "zeta", None, false),
            route(Verb::Get, "/alpha", "alpha", None, false),
            route(Verb::Post, "/zeta", "createZeta", None, false),
        ]);
        let doc = generate(&routes, &SwaggerBaseProperties::default());

        assert_eq!(doc.paths.keys().collect::<Vec<_>>(), vec!["/zeta", "/alpha"]);
        assert_eq!(doc.operation_count(), 3);

        let text = doc.to_json_string().unwrap();
        assert!(text.find("/zeta").unwrap() < text.find("/alpha").unwrap());
    }

    #[test]
    fn test_bodies_become_components() {
        let schema = RouteSchema::new()
            .request(RequestSchema::new().body(json!({ "type": "object", "required": ["name"] })))
            .responses(ResponseSchemas::new().status(201, json!({ "type": "object" })));
        let routes = table(vec![route(Verb::Post, "/items", "createItem", Some(schema), false)]);
        let json = generate(&routes, &SwaggerBaseProperties::default()).to_json();

        let op = &json["paths"]["/items"]["post"];
        assert_eq!(
            op["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/createItemBody"
        );
        assert_eq!(op["responses"]["201"]["description"], "Created");
        assert_eq!(
            json["components"]["schemas"]["createItemBody"]["required"],
            json!(["name"])
        );
        assert!(json["components"]["schemas"]["createItemResponse201"].is_object());
    }

    #[test]
    fn test_parameters_from_url_and_schemas() {
        let schema = RouteSchema::new().request(
            RequestSchema::new()
                .params(json!({ "type": "object", "properties": { "id": { "type": "integer" } } }))
                .query(json!({
                    "type": "object",
                    "properties": { "limit": { "type": "integer" }, "q": { "type": "string" } },
                    "required": ["q"]
                })),
        );
        let routes = table(vec![route(Verb::Get, "/items/{id}", "getItem", Some(schema), false)]);
        let doc = generate(&routes, &SwaggerBaseProperties::default());
        let params = &doc.operation(Verb::Get, "/items/{id}").unwrap().parameters;

        let summary: Vec<_> = params
            .iter()
            .map(|p| (p.name.as_str(), p.location, p.required))
            .collect();
        assert_eq!(
            summary,
            vec![("id", "path", true), ("limit", "query", false), ("q", "query", true)]
        );
        assert_eq!(params[0].schema, json!({ "type": "integer" }));
    }

    #[test]
    fn test_public_routes_clear_security() {
        let base = SwaggerBaseProperties::default()
            .security_scheme("bearer", json!({ "type": "http", "scheme": "bearer" }))
            .security(BTreeMap::from([("bearer".to_string(), Vec::new())]));
        let routes = table(vec![
            route(Verb::Get, "/health", "health", None, true),
            route(Verb::Get, "/items", "listItems", None, false),
        ]);
        let json = generate(&routes, &base).to_json();

        assert_eq!(json["paths"]["/health"]["get"]["security"], json!([]));
        assert!(json["paths"]["/items"]["get"].get("security").is_none());
        assert_eq!(json["security"], json!([{ "bearer": [] }]));
        assert_eq!(json["components"]["securitySchemes"]["bearer"]["scheme"], "bearer");
    }

    #[test]
    fn test_default_response_when_no_schema() {
        let routes = table(vec![route(Verb::Delete, "/items/{id}", "deleteItem", None, false)]);
        let json = generate(&routes, &SwaggerBaseProperties::default()).to_json();
        assert_eq!(
            json["paths"]["/items/{id}"]["delete"]["responses"]["200"]["description"],
            "Successful response"
        );
        assert_eq!(json["openapi"], OPENAPI_VERSION);
        assert!(json.get("components").is_none());
    }
}
