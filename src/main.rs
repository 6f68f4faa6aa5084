//! RPC route table CLI.
//!
//! Loads a router config, builds the per-server route tables and answers
//! questions about them.
//!
//! ```text
//! rpc-router --config routes.toml routes [--server jsonrpc-http]
//! rpc-router --config routes.toml resolve --server jsonrpc-http /user/getProfile
//! rpc-router --config routes.toml watch
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use serde_json::json;

use rpc_router::config::load_config;
use rpc_router::config::watcher::ConfigWatcher;
use rpc_router::observability::logging::init_logging;
use rpc_router::routing::{DispatcherFactory, RouterHandle, SERVICE_VERB};

#[derive(Parser)]
#[command(name = "rpc-router")]
#[command(about = "Inspect and resolve RPC service routes", long_about = None)]
struct Cli {
    /// Router config file (TOML).
    #[arg(short, long, default_value = "config/routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered routes
    Routes {
        /// Only show this server
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Resolve a path and print the outcome with its middleware chain
    Resolve {
        #[arg(short, long, default_value = rpc_router::routing::descriptor::DEFAULT_SERVER)]
        server: String,
        #[arg(short, long, default_value = SERVICE_VERB)]
        verb: String,
        path: String,
    },
    /// Keep routes in sync with the config file until Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.observability)?;

    tracing::info!(
        path = ?cli.config,
        services = config.services.len(),
        routes = config.routes.len(),
        "Configuration loaded"
    );

    let factory = DispatcherFactory::from_config(&config)?;

    match cli.command {
        Commands::Routes { server } => {
            let servers = match server {
                Some(name) => vec![name],
                None => factory.server_names(),
            };
            for name in servers {
                for route in factory.routes(&name) {
                    let chain = factory.middlewares_for(&name, &route.verb, &route.path);
                    println!(
                        "{}\t{}\t{}\t{}\t[{}]",
                        name,
                        route.verb,
                        route.path,
                        route.handler,
                        chain.join(", ")
                    );
                }
            }
        }
        Commands::Resolve { server, verb, path } => {
            let resolution = factory.resolve(&server, &verb, &path);
            let chain = factory.middlewares_for(&server, &verb, &path);
            let out = json!({
                "server": server,
                "verb": verb,
                "path": path,
                "resolution": resolution,
                "middlewares": chain,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Watch => watch(cli.config, factory).await?,
    }

    Ok(())
}

async fn watch(path: PathBuf, factory: DispatcherFactory) -> Result<(), Box<dyn std::error::Error>> {
    let handle = Arc::new(RouterHandle::new(factory));
    let _watcher = ConfigWatcher::new(&path, Arc::clone(&handle)).start()?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    let servers = handle.load().server_names();
    tracing::info!(servers = ?servers, "Watch stopped");
    Ok(())
}
