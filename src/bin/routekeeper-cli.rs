use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;

const VERBS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

#[derive(Parser)]
#[command(name = "routekeeper-cli")]
#[command(about = "Inspect the routes and documentation of a running routekeeper service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Where the service mounted its documentation.
    #[arg(short, long, default_value = "/docs")]
    docs_path: String,

    /// Bearer token, for documentation behind an auth pre-handler.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the OpenAPI document
    Swagger,
    /// List documented operations
    Routes,
    /// Print the request schemas answered by OPTIONS <path>
    Schema {
        /// Route path, e.g. /items
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let base = cli.url.trim_end_matches('/');
    let document_url = format!("{}{}/openapi.json", base, cli.docs_path.trim_end_matches('/'));

    match cli.command {
        Commands::Swagger => {
            let res = client.get(&document_url).headers(headers).send().await?;
            if let Some(json) = read_json(res).await? {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
        Commands::Routes => {
            let res = client.get(&document_url).headers(headers).send().await?;
            if let Some(json) = read_json(res).await? {
                print_routes(&json);
            }
        }
        Commands::Schema { path } => {
            let res = client
                .request(Method::OPTIONS, format!("{}{}", base, path))
                .headers(headers)
                .send()
                .await?;
            if let Some(json) = read_json(res).await? {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
    }

    Ok(())
}

async fn read_json(res: reqwest::Response) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(None);
    }

    Ok(Some(res.json().await?))
}

fn print_routes(document: &Value) {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        eprintln!("Error: document has no paths");
        return;
    };

    for (path, item) in paths {
        for verb in VERBS {
            if let Some(op) = item.get(verb) {
                let id = op.get("operationId").and_then(Value::as_str).unwrap_or("-");
                let public = op
                    .get("security")
                    .and_then(Value::as_array)
                    .map(|s| s.is_empty())
                    .unwrap_or(false);
                println!(
                    "{:<7} {:<40} {}{}",
                    verb.to_uppercase(),
                    path,
                    id,
                    if public { " (public)" } else { "" }
                );
            }
        }
    }
}
