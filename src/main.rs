//! Standalone asset server.
//!
//! Loads a TOML configuration, builds the route registry from its
//! declarative routes and serves compiled assets until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use asset_server::config::load_config;
use asset_server::observability::{logging, metrics};
use asset_server::{AssetServer, HttpServer, Shutdown, TransformCatalog};

#[derive(Parser, Debug)]
#[command(name = "asset-server", version, about = "Serve and compile assets on demand")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("asset-server v{} starting", env!("CARGO_PKG_VERSION"));

    let options = config.options();
    tracing::info!(
        root = %options.root.display(),
        cache = %options.cache_root.display(),
        production = options.production,
        strict = options.strict,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let assets = Arc::new(AssetServer::from_config(&config, &TransformCatalog::builtin())?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.listener.clone(), assets);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
