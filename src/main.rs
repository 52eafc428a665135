//! registration-watch
//!
//! ```text
//!                   ┌──────────────────────────┐
//!   monitor page ──▶│ relay   (:3001)          │──▶ third-party registration page
//!        │          │ ?url=… → GET → stream    │
//!        │          └──────────────────────────┘
//!        │          ┌──────────────────────────┐
//!        └─────────▶│ serve   (:8080)          │
//!                   │ files + /__mock/state    │
//!                   │ designated doc rewritten │
//!                   └──────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use registration_watch::config::{load_config, AppConfig};
use registration_watch::lifecycle::{signals, Shutdown};
use registration_watch::observability::{logging, metrics};
use registration_watch::{ContentServer, RelayServer, StateCell};

#[derive(Parser)]
#[command(name = "registration-watch")]
#[command(about = "CORS relay proxy and mock content server for registration monitoring", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the CORS relay proxy
    Relay {
        /// Listen address, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Run the static content server with the mock registration state
    Serve {
        /// Listen address, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,

        /// Directory to serve, overriding the config file
        #[arg(short, long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("registration-watch v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_ctrl_c(shutdown.clone());

    match cli.command {
        Commands::Relay { bind } => {
            let mut relay = config.relay;
            if let Some(bind) = bind {
                relay.bind_address = bind;
            }
            let listener = TcpListener::bind(&relay.bind_address).await?;
            let server = RelayServer::new(relay)?;
            server.run(listener, shutdown.subscribe()).await?;
        }
        Commands::Serve { bind, root } => {
            let mut content = config.content;
            if let Some(bind) = bind {
                content.bind_address = bind;
            }
            if let Some(root) = root {
                content.root = root;
            }
            let listener = TcpListener::bind(&content.bind_address).await?;
            let server = ContentServer::new(content, Arc::new(StateCell::default()));
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
