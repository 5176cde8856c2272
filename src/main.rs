use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use taskboard::{server, TaskManager};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Task tracker with an HTTP API")]
struct Args {
    /// Port for the HTTP server.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Persist the board to this file; loaded on startup when it already
    /// exists. Without it the board lives in memory only.
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskboard=info,tower_http=warn")),
        )
        .init();

    let args = Args::parse();

    let manager = match &args.data_file {
        Some(path) if path.exists() => {
            info!("loading board from {}", path.display());
            TaskManager::load(path)?
        }
        Some(path) => {
            info!("starting empty board backed by {}", path.display());
            TaskManager::file_backed(path)
        }
        None => {
            info!("starting in-memory board");
            TaskManager::in_memory()
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    server::serve(manager, addr).await
}
