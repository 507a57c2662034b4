//! CLI client: resolves a key's primary via the controller, then talks to
//! the node directly.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "replikv")]
#[command(about = "replikv distributed key-value store CLI")]
#[command(version)]
struct Cli {
    /// Controller URL
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    controller: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a value (JSON) under a key
    Put {
        key: String,
        /// JSON value, e.g. '"bar"' or '{"a":1}'
        value: String,
    },

    /// Fetch a key from its primary
    Get { key: String },

    /// Show the cluster registry snapshot
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let http = reqwest::Client::new();

    match cli.command {
        Commands::Put { key, value } => {
            let value: Value =
                serde_json::from_str(&value).context("value must be valid JSON")?;
            let primary = resolve_primary(&http, &cli.controller, &key).await?;

            let resp: Value = http
                .put(format!("{}/kv/{}", primary, key))
                .json(&serde_json::json!({ "value": value }))
                .send()
                .await?
                .json()
                .await?;

            println!(
                "{} (replicas_written: {})",
                resp["status"].as_str().unwrap_or("?"),
                resp["replicas_written"]
            );
        }

        Commands::Get { key } => {
            let primary = resolve_primary(&http, &cli.controller, &key).await?;
            let resp = http.get(format!("{}/kv/{}", primary, key)).send().await?;

            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                bail!("key not found: {}", key);
            }
            let body: Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body["value"])?);
        }

        Commands::Status => {
            let body: Value = http
                .get(format!("{}/status", cli.controller))
                .send()
                .await?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

async fn resolve_primary(http: &reqwest::Client, controller: &str, key: &str) -> Result<String> {
    let resp = http
        .get(format!("{}/partition/{}", controller, key))
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
        bail!("no available node for key: {}", key);
    }

    let body: Value = resp.json().await?;
    body["primary_address"]
        .as_str()
        .map(|s| s.to_string())
        .context("controller returned no primary_address")
}
