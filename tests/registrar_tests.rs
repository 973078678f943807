//! Registration behaviour of the route registrar.

use axum::{
    body::Body,
    extract::{FromRequestParts, Path},
    http::{Method, Request, StatusCode},
    Router,
};
use routekeeper::{
    Registrar, RegistrarError, RegistrarOptions, RequestSchema, RouteDefinition, RouteError,
    RouteSchema, Verb,
};
use serde_json::json;
use std::collections::BTreeMap;

mod common;
use common::{request, send};

fn answer(body: &'static str) -> impl Fn(Request<Body>) -> std::future::Ready<Result<&'static str, RouteError>> + Clone {
    move |_req| std::future::ready(Ok(body))
}

#[tokio::test]
async fn test_duplicate_route_for_every_verb() {
    for verb in Verb::ALL {
        let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
        registrar
            .route(verb, RouteDefinition::new("/things", "first").handle(answer("first")))
            .unwrap();

        let err = registrar
            .route(verb, RouteDefinition::new("/things", "second").handle(answer("second")))
            .unwrap_err();
        assert!(err.is_duplicate(), "{verb}: {err}");
        assert_eq!(
            err.to_string(),
            format!("Route already defined: ({}) /things", verb)
        );

        // The first registration still answers.
        let router = registrar.into_router();
        let res = send(&router, request(verb.method(), "/things", None)).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.text(), "first");
    }
}

#[tokio::test]
async fn test_verbs_share_a_url() {
    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    registrar.get(RouteDefinition::new("/things", "listThings").handle(answer("list"))).unwrap();
    registrar.post(RouteDefinition::new("/things", "createThing").handle(answer("create"))).unwrap();

    assert_eq!(registrar.routes().len(), 2);
    let router = registrar.into_router();

    assert_eq!(send(&router, request(Method::GET, "/things", None)).await.text(), "list");
    assert_eq!(send(&router, request(Method::POST, "/things", None)).await.text(), "create");
    assert_eq!(
        send(&router, request(Method::PUT, "/things", None)).await.status,
        StatusCode::METHOD_NOT_ALLOWED
    );
}

#[tokio::test]
async fn test_catch_all_next_to_param_is_refused() {
    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    registrar.get(RouteDefinition::new("/items/:id", "getItem").handle(answer("item"))).unwrap();
    registrar.get(RouteDefinition::new("/items/latest", "latestItem").handle(answer("latest"))).unwrap();

    let err = registrar
        .post(RouteDefinition::new("/items/*rest", "postAnything").handle(answer("rest")))
        .unwrap_err();
    assert!(matches!(err, RegistrarError::ConflictingRoute { .. }), "{err}");
    assert!(!registrar.routes().contains(Verb::Post, "/items/{*rest}"));

    let router = registrar.into_router();
    assert_eq!(send(&router, request(Method::GET, "/items/7", None)).await.text(), "item");
    assert_eq!(send(&router, request(Method::GET, "/items/latest", None)).await.text(), "latest");
}

#[tokio::test]
async fn test_express_style_params_reach_handler() {
    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    registrar
        .get(RouteDefinition::new("/users/:user_id/posts/:post_id", "getPost").handle(
            |req: Request<Body>| async move {
                let (mut parts, _) = req.into_parts();
                let Path((user, post)) = Path::<(u32, u32)>::from_request_parts(&mut parts, &())
                    .await
                    .map_err(|r| RouteError::bad_request(r.body_text()))?;
                Ok::<_, RouteError>(format!("{user}/{post}"))
            },
        ))
        .unwrap();

    let descriptor = registrar.routes().iter().next().unwrap();
    assert_eq!(descriptor.url(), "/users/{user_id}/posts/{post_id}");

    let router = registrar.into_router();
    let res = send(&router, request(Method::GET, "/users/7/posts/42", None)).await;
    assert_eq!(res.text(), "7/42");
}

#[tokio::test]
async fn test_descriptor_keeps_metadata() {
    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    let schema = RouteSchema::new().request(RequestSchema::new().body(json!({ "type": "object" })));
    registrar
        .patch(
            RouteDefinition::new("/things/{id}", "patchThing")
                .public(true)
                .tags(["things", "admin"])
                .summary("Patch a thing")
                .description("Partial update")
                .schema(schema.clone())
                .handle(answer("patched")),
        )
        .unwrap();

    let d = registrar.routes().get(Verb::Patch, "/things/{id}").unwrap();
    assert_eq!(d.operation_id(), "patchThing");
    assert!(d.is_public());
    assert_eq!(d.tags(), ["things".to_string(), "admin".to_string()]);
    assert_eq!(d.summary(), Some("Patch a thing"));
    assert_eq!(d.description(), Some("Partial update"));
    assert_eq!(d.schema(), Some(&schema));
}

#[tokio::test]
async fn test_schema_introspection_endpoint() {
    let post_request = RequestSchema::new()
        .body(json!({ "type": "object", "required": ["name"] }))
        .headers(json!({ "type": "object", "required": ["x-tenant"] }));
    let put_request = RequestSchema::new().params(json!({ "type": "object" }));

    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    registrar.get(RouteDefinition::new("/things", "listThings").handle(answer("list"))).unwrap();
    registrar
        .schema(
            "/things",
            &BTreeMap::from([
                (Verb::Get, RouteSchema::new()),
                (Verb::Post, RouteSchema::new().request(post_request.clone())),
                (Verb::Put, RouteSchema::new().request(put_request.clone())),
                (Verb::Patch, RouteSchema::new().request(put_request)),
            ]),
        )
        .unwrap();

    let router = registrar.into_router();
    let res = send(&router, request(Method::OPTIONS, "/things", None)).await;
    assert_eq!(res.status, StatusCode::OK);

    let body = res.json();
    assert_eq!(body["post"], serde_json::to_value(&post_request).unwrap());
    assert_eq!(body["put"]["params"], json!({ "type": "object" }));
    assert!(body.get("get").is_none());
    assert!(body.get("patch").is_none());

    // GET on the same url is untouched.
    assert_eq!(send(&router, request(Method::GET, "/things", None)).await.text(), "list");
}
