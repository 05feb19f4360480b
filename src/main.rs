//! versioned-router
//!
//! Serves a route table described in TOML, or inspects it offline.
//!
//! ```text
//! versioned-router serve   --config router.toml
//! versioned-router resolve --config router.toml GET /users/7 --api-version 2.x
//! versioned-router routes  --config router.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use versioned_router::config::{build_router, load_config};
use versioned_router::http::{BoxHandler, HandlerResponse, RequestContext};
use versioned_router::lifecycle::startup;
use versioned_router::{Method, Router};

#[derive(Parser)]
#[command(name = "versioned-router")]
#[command(about = "HTTP request router with versioned routes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the configured routes over HTTP
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Resolve one request offline and print the outcome as JSON
    Resolve {
        #[arg(short, long)]
        config: PathBuf,
        /// Request method (e.g. GET)
        method: String,
        /// Request target, optionally with a query string
        path: String,
        /// Requested API version
        #[arg(long)]
        api_version: Option<String>,
    },
    /// List the compiled route table
    Routes {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Serialize)]
struct RouteSummary<'a> {
    method: &'a str,
    kind: &'static str,
    form: &'a str,
    source: &'a str,
    sibling: bool,
    base: bool,
    versions: Vec<&'a str>,
}

fn load_router(path: &PathBuf) -> Result<Router<BoxHandler>, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    Ok(build_router(&config)?)
}

fn resolve(
    router: &Router<BoxHandler>,
    method: &str,
    url: &str,
    version: Option<&str>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let method: Method = method.parse()?;
    let lookup = router.lookup(method, url, version);
    let source = lookup.source;

    let response = match lookup.handler {
        Some(handler) => {
            let ctx = RequestContext::new(method, url, version, lookup.params.clone());
            handler.call(&ctx)
        }
        None => HandlerResponse::not_found(),
    };

    Ok(json!({
        "method": method.as_str(),
        "url": url,
        "version": version,
        "source": source.as_str(),
        "params": lookup.params,
        "status": response.status.as_u16(),
        "content_type": response.content_type,
        "body": response.body,
    }))
}

fn list_routes(router: &Router<BoxHandler>) -> Result<String, serde_json::Error> {
    let summaries: Vec<RouteSummary<'_>> = router
        .routes()
        .map(|route| RouteSummary {
            method: route.method().as_str(),
            kind: if route.is_exact() { "exact" } else { "pattern" },
            form: route.form().as_str(),
            source: route.source(),
            sibling: route.is_sibling(),
            base: route.handlers().base().is_some(),
            versions: route
                .handlers()
                .versions()
                .map(|v| v.keys().collect())
                .unwrap_or_default(),
        })
        .collect();
    serde_json::to_string_pretty(&summaries)
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Serve { config } => startup::run(&config).await?,
        Commands::Resolve {
            config,
            method,
            path,
            api_version,
        } => {
            let router = load_router(&config)?;
            let report = resolve(&router, &method, &path, api_version.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Routes { config } => {
            let router = load_router(&config)?;
            println!("{}", list_routes(&router)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
