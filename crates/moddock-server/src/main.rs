//! moddock server - HTTP front end for the module registry and store.
//!
//! Serves JSON over HTTP on top of the moddock-core library: zip uploads,
//! module listing and inspection, store promotion and deletion.

mod handlers;
mod server;

use anyhow::Result;
use clap::Parser;
use moddock_core::config::UploadConfig;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "moddock-server")]
#[command(about = "HTTP server for the moddock module registry")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Data root holding uploads/, modules/ and store/
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Largest accepted request body, in MiB (default: 500)
    #[arg(long)]
    max_upload_mb: Option<usize>,
}

fn default_data_root() -> Result<PathBuf> {
    match dirs::data_dir() {
        Some(dir) => Ok(dir.join("moddock")),
        None => Ok(std::env::current_dir()?.join("moddock-data")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG overrides the default level
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting moddock server");

    let data_root = match args.data_root {
        Some(path) => path,
        None => default_data_root()?,
    };
    info!("Data root: {}", data_root.display());

    let manager = moddock_core::ModuleManager::new(&data_root)?;

    let max_upload_bytes = args
        .max_upload_mb
        .map(|mb| mb.saturating_mul(1024 * 1024))
        .unwrap_or(UploadConfig::MAX_UPLOAD_BYTES);
    let addr = server::start_server(manager, &args.host, args.port, max_upload_bytes).await?;

    // Port line read by process-level tests when started with --port 0
    println!("MODDOCK_PORT={}", addr.port());

    info!("moddock server running on http://{}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
