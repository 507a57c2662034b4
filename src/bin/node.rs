use anyhow::Result;
use clap::Parser;
use replikv::{ClusterConfig, NodeServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "replikv-node")]
#[command(about = "replikv storage node - local store, replication, reseeding")]
#[command(version)]
struct Args {
    /// Node ID in [0, node_count)
    #[arg(short, long)]
    id: u32,

    /// Optional TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the node's store file
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &args.config {
        Some(path) => ClusterConfig::from_file(path)?,
        None => ClusterConfig::default(),
    };

    tokio::fs::create_dir_all(&args.data_dir).await?;

    NodeServer::new(config, args.id, args.data_dir).serve().await?;

    Ok(())
}
