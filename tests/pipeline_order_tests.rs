//! Stage order of registered routes.

use axum::{
    http::{Method, StatusCode},
    Router,
};
use routekeeper::{
    from_fn, Next, Registrar, RegistrarOptions, RequestSchema, ResponseSchemas, RouteDefinition,
    RouteSchema,
};
use serde_json::json;

mod common;
use common::{capture_logs, request, send, Trace};

const STAGE_EVENTS: [&str; 7] = [
    "Request started",
    "pre-1",
    "pre-2",
    "Request validation failed, continuing",
    "handler",
    "Response validation failed",
    "Request completed",
];

#[tokio::test]
async fn test_every_optional_stage_runs_in_order() {
    let trace = Trace::default();
    let options = RegistrarOptions::default()
        .log_requests(true)
        .validate_responses(true);
    let mut registrar = Registrar::new(Router::new(), options);

    // Stages supplied out of order; the registrar fixes the order.
    registrar
        .post(
            RouteDefinition::new("/orders", "createOrder")
                .warn_on_request_validation_error(true)
                .schema(
                    RouteSchema::new()
                        .responses(ResponseSchemas::new().status(200, json!({
                            "type": "object",
                            "required": ["id"]
                        })))
                        .request(RequestSchema::new().body(json!({
                            "type": "object",
                            "required": ["sku"]
                        }))),
                )
                .handler(trace.handler("handler", json!({ "no_id": true })))
                .pre_handler(trace.pre_handler("pre-1"))
                .pre_handler(trace.pre_handler("pre-2")),
        )
        .unwrap();
    let router = registrar.into_router();

    let _guard = capture_logs(&trace);
    let res = send(&router, request(Method::POST, "/orders", Some(json!({ "qty": 1 })))).await;

    // Warn-only validation and observational response validation both let it through.
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({ "no_id": true }));

    let observed: Vec<String> = trace
        .entries()
        .into_iter()
        .filter(|e| STAGE_EVENTS.contains(&e.as_str()))
        .collect();
    assert_eq!(observed, STAGE_EVENTS);
}

#[tokio::test]
async fn test_pre_handlers_run_before_request_validation() {
    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    registrar
        .get(
            RouteDefinition::new("/tenants/current", "currentTenant")
                .schema(RouteSchema::new().request(RequestSchema::new().headers(json!({
                    "type": "object",
                    "required": ["x-tenant"]
                }))))
                // Supplies the header the validator requires.
                .pre_handler(from_fn(|mut req, next: Next| async move {
                    req.headers_mut().insert("x-tenant", "acme".parse().unwrap());
                    next.run(req).await
                }))
                .handle(|req| async move {
                    let tenant = req.headers()["x-tenant"].to_str().unwrap_or_default().to_string();
                    Ok::<_, routekeeper::RouteError>(tenant)
                }),
        )
        .unwrap();
    let router = registrar.into_router();

    let res = send(&router, request(Method::GET, "/tenants/current", None)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "acme");
}

#[tokio::test]
async fn test_rejected_request_skips_later_stages() {
    let trace = Trace::default();
    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    registrar
        .post(
            RouteDefinition::new("/orders", "createOrder")
                .pre_handler(trace.pre_handler("pre"))
                .schema(RouteSchema::new().request(RequestSchema::new().body(json!({
                    "type": "object",
                    "required": ["sku"]
                }))))
                .handler(trace.handler("handler", json!({}))),
        )
        .unwrap();
    let router = registrar.into_router();

    let res = send(&router, request(Method::POST, "/orders", Some(json!({})))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(trace.entries(), vec!["pre".to_string()]);
}

#[tokio::test]
async fn test_handlers_chain_in_order() {
    let trace = Trace::default();
    let first = trace.clone();
    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::default());
    registrar
        .get(
            RouteDefinition::new("/chain", "chain")
                .handler(from_fn(move |req, next: Next| {
                    first.push("handler-1");
                    next.run(req)
                }))
                .handler(trace.handler("handler-2", json!("done"))),
        )
        .unwrap();
    let router = registrar.into_router();

    let res = send(&router, request(Method::GET, "/chain", None)).await;
    assert_eq!(res.json(), json!("done"));
    assert_eq!(trace.entries(), vec!["handler-1", "handler-2"]);
}
