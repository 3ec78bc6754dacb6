//! LAS command-line client
//!
//! Issues one raw API call and prints the JSON response:
//!
//! ```text
//! las [--config PATH] [--profile NAME] <METHOD> <PATH> [JSON_BODY]
//! ```
//!
//! Credentials come from `--profile` in `~/.lucidtech/credentials.cfg`, or from
//! the environment and default profile when no profile is named.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use las_auth::CredentialsResolver;
use las_client::Client;
use reqwest::Method;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Settings;

/// Call the Lucidtech document API and print the JSON response.
#[derive(Parser, Debug)]
#[command(name = "las", version, about)]
struct Args {
    /// Settings file (also via LAS_CONFIG_PATH)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Profile section in ~/.lucidtech/credentials.cfg
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// HTTP method, case-insensitive
    #[arg(value_name = "METHOD", value_parser = parse_method)]
    method: Method,

    /// Path relative to the API endpoint, e.g. /documents
    #[arg(value_name = "PATH")]
    path: String,

    /// Request body as JSON
    #[arg(value_name = "JSON_BODY", value_parser = parse_body)]
    body: Option<Value>,
}

fn parse_method(raw: &str) -> Result<Method, String> {
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .map_err(|e| format!("invalid method {raw}: {e}"))
}

fn parse_body(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}

async fn run(args: Args) -> Result<Value> {
    let (config_path, explicit) = Settings::resolve_path(args.config.as_deref());
    let settings = if explicit {
        Settings::load(&config_path)
    } else {
        Settings::load_or_default(&config_path)
    }
    .with_context(|| format!("failed to load settings from {}", config_path.display()))?;

    let mut resolver = CredentialsResolver::new();
    if let Some(profile) = &args.profile {
        resolver = resolver.profile(profile);
    }
    let credentials = resolver.resolve().context("failed to resolve credentials")?;
    info!(kind = credentials.kind(), endpoint = %credentials.api_endpoint(), "credentials resolved");

    let mut builder = Client::builder()
        .credentials(credentials)
        .timeout(settings.timeout())
        .rate_limit_policy(settings.rate_limit_policy())
        .transient_policy(settings.transient_policy());
    if let Some(endpoint) = &settings.api_endpoint {
        builder = builder.endpoint(endpoint);
    }
    let client = builder.build().context("failed to build client")?;

    let value = client
        .execute(args.method.clone(), &args.path, args.body, None)
        .await
        .with_context(|| format!("{} {} failed", args.method, args.path))?;
    Ok(value)
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout carries only the response
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let result = run(args).await;

    match result.and_then(|value| serde_json::to_string_pretty(&value).context("encoding response")) {
        Ok(pretty) => println!("{pretty}"),
        Err(e) => {
            error!(error = %format!("{e:#}"), "request failed");
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
