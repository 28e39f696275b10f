//! routegraph server.
//!
//! Loads configuration, registers the sample application through its
//! manifest and serves it. In development mode the registry devtool is
//! mounted alongside.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use routegraph::config::{load_config, AppConfig};
use routegraph::lifecycle::{spawn_signal_listener, Shutdown};
use routegraph::observability::{logging, metrics};
use routegraph::{demo, AxumDispatcher, HttpServer, RegistrationContext};

#[derive(Parser)]
#[command(name = "routegraph")]
#[command(about = "Serve a registered route tree", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "routegraph starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        mode = ?config.mode,
        request_timeout_secs = config.timeouts.request_secs,
        devtool = config.devtool_active(),
        "Configuration loaded"
    );

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

    let mut ctx = RegistrationContext::new(AxumDispatcher::new());
    ctx.set_config(&config)?;
    let modules = demo::manifest().load(&mut ctx)?;
    tracing::info!(modules, "Manifest loaded");
    tracing::debug!("Registry outline:\n{}", ctx.snapshot().outline());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(&shutdown);

    let server = HttpServer::new(config, ctx)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
