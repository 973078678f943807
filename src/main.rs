//! routekeeper demo service.
//!
//! Registers a small validated item API, a schema introspection endpoint and
//! the API documentation, then serves them until SIGTERM or Ctrl+C.

use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Path},
    http::{Request, StatusCode},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use routekeeper::config::{load_config, RegistrarConfig};
use routekeeper::lifecycle::{forward_signals, Shutdown};
use routekeeper::observability::init_logging;
use routekeeper::{
    from_fn, HttpServer, Next, Registrar, RegistrarOptions, RequestSchema, ResponseSchemas,
    RouteDefinition, RouteError, RouteSchema, Verb,
};

#[derive(Parser)]
#[command(name = "routekeeper")]
#[command(about = "Demo service for the routekeeper route registrar", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Item {
    id: u64,
    name: String,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct NewItem {
    name: String,
    quantity: u32,
}

#[derive(Default)]
struct Store {
    next_id: AtomicU64,
    items: RwLock<HashMap<u64, Item>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RegistrarConfig::default(),
    };

    init_logging(&config.observability);
    tracing::info!("routekeeper v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.server.bind_address,
        request_timeout_secs = config.server.request_timeout_secs,
        validate_responses = config.validation.validate_responses,
        log_requests = config.observability.log_requests,
        "Configuration loaded"
    );

    let mut registrar = Registrar::new(Router::new(), RegistrarOptions::from_config(&config));
    register_routes(&mut registrar, Arc::new(Store::default()))?;
    registrar.serve_swagger(&config.swagger.docs_path)?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    forward_signals(Arc::clone(&shutdown));

    HttpServer::new(registrar.into_router(), &config.server)
        .run(listener, receiver)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn item_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["id", "name", "quantity"],
        "properties": {
            "id": { "type": "integer" },
            "name": { "type": "string" },
            "quantity": { "type": "integer", "minimum": 0 }
        }
    })
}

fn create_item_schema() -> RouteSchema {
    RouteSchema::new()
        .request(RequestSchema::new().body(json!({
            "type": "object",
            "required": ["name", "quantity"],
            "additionalProperties": false,
            "properties": {
                "name": { "type": "string", "minLength": 1 },
                "quantity": { "type": "integer", "minimum": 0 }
            }
        })))
        .responses(ResponseSchemas::new().status(201, item_schema()))
}

fn id_params() -> RequestSchema {
    RequestSchema::new().params(json!({
        "type": "object",
        "required": ["id"],
        "properties": { "id": { "type": "integer", "minimum": 1 } }
    }))
}

fn register_routes(registrar: &mut Registrar, store: Arc<Store>) -> Result<(), Box<dyn std::error::Error>> {
    registrar.get(
        RouteDefinition::new("/health", "health")
            .public(true)
            .tag("system")
            .summary("Liveness probe")
            .handle(|_req| async { Ok::<_, RouteError>(Json(json!({ "status": "ok" }))) }),
    )?;

    let list_store = Arc::clone(&store);
    registrar.get(
        RouteDefinition::new("/items", "listItems")
            .tag("items")
            .summary("List items")
            .schema(
                RouteSchema::new()
                    .request(RequestSchema::new().query(json!({
                        "type": "object",
                        "properties": { "limit": { "type": "integer", "minimum": 1, "maximum": 100 } }
                    })))
                    .responses(ResponseSchemas::new().status(200, json!({ "type": "array", "items": item_schema() }))),
            )
            .handle(move |req: Request<Body>| {
                let store = Arc::clone(&list_store);
                async move {
                    let limit = req
                        .uri()
                        .query()
                        .and_then(|q| q.split('&').find_map(|kv| kv.strip_prefix("limit=")))
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(100);
                    let items = store.items.read().await;
                    let mut list: Vec<Item> = items.values().cloned().collect();
                    list.sort_by_key(|item| item.id);
                    list.truncate(limit);
                    Ok::<_, RouteError>(Json(list))
                }
            }),
    )?;

    let create_store = Arc::clone(&store);
    registrar.post(
        RouteDefinition::new("/items", "createItem")
            .tag("items")
            .summary("Create an item")
            .schema(create_item_schema())
            .handle(move |req: Request<Body>| {
                let store = Arc::clone(&create_store);
                async move {
                    let bytes = to_bytes(req.into_body(), usize::MAX).await?;
                    let new: NewItem = serde_json::from_slice(&bytes)?;
                    let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                    let item = Item {
                        id,
                        name: new.name,
                        quantity: new.quantity,
                    };
                    store.items.write().await.insert(id, item.clone());
                    tracing::info!(item_id = id, "Item created");
                    Ok::<_, RouteError>((StatusCode::CREATED, Json(item)))
                }
            }),
    )?;

    let get_store = Arc::clone(&store);
    registrar.get(
        RouteDefinition::new("/items/:id", "getItem")
            .tag("items")
            .summary("Fetch one item")
            .schema(
                RouteSchema::new()
                    .request(id_params())
                    .responses(ResponseSchemas::new().status(200, item_schema())),
            )
            .handle(move |req: Request<Body>| {
                let store = Arc::clone(&get_store);
                async move {
                    let id = item_id(req).await?;
                    let items = store.items.read().await;
                    let item = items
                        .get(&id)
                        .cloned()
                        .ok_or_else(|| RouteError::not_found(format!("item {} not found", id)))?;
                    Ok::<_, RouteError>(Json(item))
                }
            }),
    )?;

    let delete_store = Arc::clone(&store);
    registrar.delete(
        RouteDefinition::new("/items/:id", "deleteItem")
            .tag("items")
            .summary("Delete an item")
            .description("Requires the `x-admin` header.")
            .pre_handler(from_fn(|req: Request<Body>, next: Next| async move {
                if req.headers().contains_key("x-admin") {
                    next.run(req).await
                } else {
                    Err(RouteError::new(StatusCode::FORBIDDEN, "admin header required"))
                }
            }))
            .schema(RouteSchema::new().request(id_params()))
            .handle(move |req: Request<Body>| {
                let store = Arc::clone(&delete_store);
                async move {
                    let id = item_id(req).await?;
                    match store.items.write().await.remove(&id) {
                        Some(_) => Ok(StatusCode::NO_CONTENT),
                        None => Err(RouteError::not_found(format!("item {} not found", id))),
                    }
                }
            }),
    )?;

    registrar.schema(
        "/items",
        &BTreeMap::from([
            (Verb::Get, RouteSchema::new()),
            (Verb::Post, create_item_schema()),
        ]),
    )?;

    Ok(())
}

async fn item_id(req: Request<Body>) -> Result<u64, RouteError> {
    let (mut parts, _) = req.into_parts();
    let Path(id) = Path::<u64>::from_request_parts(&mut parts, &())
        .await
        .map_err(|rejection| RouteError::bad_request(rejection.body_text()))?;
    Ok(id)
}
