//! OpenAPI generation and the served documentation.

use axum::{
    http::{Method, StatusCode},
    Router,
};
use routekeeper::docs::{ApiInfo, Server, SwaggerBaseProperties};
use routekeeper::{
    from_fn, Next, Registrar, RegistrarOptions, RequestSchema, RouteDefinition, RouteError,
    RouteSchema, Verb,
};
use serde_json::json;

mod common;
use common::{request, send};

fn ok(id: &str, url: &str) -> RouteDefinition {
    RouteDefinition::new(url, id).handle(|_req| async { Ok::<_, RouteError>("ok") })
}

fn inventory(options: RegistrarOptions) -> Registrar {
    let mut registrar = Registrar::new(Router::new(), options);
    registrar
        .get(ok("listItems", "/items").tags(["items"]).summary("List items"))
        .unwrap();
    registrar
        .post(
            ok("createItem", "/items")
                .tags(["items", "write"])
                .summary("Create an item")
                .description("Adds an item to the inventory")
                .schema(RouteSchema::new().request(RequestSchema::new().body(json!({
                    "type": "object",
                    "required": ["name"]
                })))),
        )
        .unwrap();
    registrar.get(ok("getItem", "/items/:id")).unwrap();
    registrar.delete(ok("deleteItem", "/items/:id")).unwrap();
    registrar
        .get(ok("health", "/health").public(true))
        .unwrap();
    registrar
}

#[test]
fn test_one_operation_per_registration() {
    let registrar = inventory(RegistrarOptions::default());
    let doc = registrar.to_swagger();

    assert_eq!(doc.operation_count(), registrar.routes().len());
    for route in registrar.routes().iter() {
        let op = doc.operation(route.verb(), route.url()).unwrap();
        assert_eq!(op.operation_id, route.operation_id());
        assert_eq!(op.tags, route.tags());
        assert_eq!(op.summary.as_deref(), route.summary());
        assert_eq!(op.description.as_deref(), route.description());
    }

    let create = doc.operation(Verb::Post, "/items").unwrap();
    assert_eq!(create.tags, vec!["items", "write"]);
    assert_eq!(create.description.as_deref(), Some("Adds an item to the inventory"));
    assert!(doc.operation(Verb::Put, "/items").is_none());
}

#[test]
fn test_generation_is_deterministic() {
    let a = inventory(RegistrarOptions::default()).to_swagger();
    let b = inventory(RegistrarOptions::default()).to_swagger();
    assert_eq!(a.to_json_string().unwrap(), b.to_json_string().unwrap());
}

#[test]
fn test_base_properties_are_merged() {
    let swagger = SwaggerBaseProperties::new(ApiInfo::new("Inventory", "2.1.0").description("Stock"))
        .server(Server::new("https://api.example.com"));
    let doc = inventory(RegistrarOptions::default().swagger(swagger)).to_swagger().to_json();

    assert_eq!(doc["info"]["title"], "Inventory");
    assert_eq!(doc["info"]["version"], "2.1.0");
    assert_eq!(doc["servers"][0]["url"], "https://api.example.com");
    assert_eq!(doc["paths"]["/items/{id}"]["get"]["parameters"][0]["name"], "id");
    assert_eq!(doc["paths"]["/health"]["get"]["security"], json!([]));
}

#[tokio::test]
async fn test_serve_swagger_mounts_ui_and_document() {
    let mut registrar = inventory(RegistrarOptions::default());
    let expected = registrar.to_swagger().to_json();
    registrar.serve_swagger("/docs").unwrap();
    let router = registrar.into_router();

    let ui = send(&router, request(Method::GET, "/docs", None)).await;
    assert_eq!(ui.status, StatusCode::OK);
    assert!(ui.headers["content-type"].to_str().unwrap().starts_with("text/html"));
    assert!(ui.text().contains("/docs/openapi.json"));

    let document = send(&router, request(Method::GET, "/docs/openapi.json", None)).await;
    assert_eq!(document.status, StatusCode::OK);
    assert_eq!(document.headers["content-type"], "application/json");
    assert_eq!(document.json(), expected);
}

#[tokio::test]
async fn test_swagger_pre_handlers_guard_docs() {
    let guard = from_fn(|req: axum::http::Request<axum::body::Body>, next: Next| async move {
        match req.headers().get("authorization") {
            Some(value) if value == "Bearer docs" => next.run(req).await,
            _ => Err(RouteError::new(StatusCode::UNAUTHORIZED, "docs require a token")),
        }
    });
    let swagger = SwaggerBaseProperties::default().pre_handler(guard);
    let mut registrar = inventory(RegistrarOptions::default().swagger(swagger));
    registrar.serve_swagger("/docs").unwrap();
    let router = registrar.into_router();

    let denied = send(&router, request(Method::GET, "/docs/openapi.json", None)).await;
    assert_eq!(denied.status, StatusCode::UNAUTHORIZED);
    assert_eq!(denied.json()["error"]["stage"], "pre_handler");

    let mut req = request(Method::GET, "/docs/openapi.json", None);
    req.headers_mut().insert("authorization", "Bearer docs".parse().unwrap());
    assert_eq!(send(&router, req).await.status, StatusCode::OK);

    // Routes outside the docs path are not guarded.
    assert_eq!(
        send(&router, request(Method::GET, "/health", None)).await.status,
        StatusCode::OK
    );
}
