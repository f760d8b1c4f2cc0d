//! Quill server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), overlays any
//! `QUILL_*` environment variables, opens the SQLite store and serves the
//! notes API over HTTP. Accounts are created through `POST /api/auth/register`.

use std::path::PathBuf;

use anyhow::Context as _;
use axum::{ServiceExt, extract::Request};
use clap::Parser;
use quill_server::ServerConfig;
use quill_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Quill notes server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let config = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store_path = config.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = quill_server::service(&config, store);
  let address = config.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
    .await
    .context("server error")?;

  Ok(())
}
