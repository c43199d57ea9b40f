//! `armory` binary.
//!
//! ```text
//! armory --config armory.toml ingest [--replace]
//! armory --config armory.toml icons
//! armory --config armory.toml serve [--port 8080]
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use armory_ingest::IngestConfig;
use armory_store_fs::FsStore;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Armory unit data pipeline")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "armory.toml")]
  config: PathBuf,

  /// Override the configured store root.
  #[arg(long)]
  store_root: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Fetch the grid and merge every unit into the store.
  Ingest {
    /// Overwrite stored documents instead of merging into them.
    #[arg(long)]
    replace: bool,
  },
  /// Attach icon URLs to stored records.
  Icons,
  /// Serve the read API.
  Serve {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
  },
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

  let mut config =
    IngestConfig::load(Some(cli.config.as_path())).context("failed to load configuration")?;
  if let Some(root) = cli.store_root {
    config.store_root = root;
  }

  match cli.command {
    Command::Ingest { replace } => {
      if replace {
        config.merge = false;
      }
      let report = armory_ingest::ingest(&config).await.context("ingest failed")?;
      for skipped in &report.skipped {
        tracing::warn!(line = skipped.line, error = %skipped.error, "row not ingested");
      }
      if !report.batch.is_clean() {
        bail!("{} record(s) failed to persist", report.batch.failures.len());
      }
    }

    Command::Icons => {
      let source = config
        .icon_source()
        .context("no [icons] section in configuration")?;
      let store = FsStore::new(&config.store_root);
      armory_store_fs::attach_icons(&store, &source)
        .await
        .context("icon attachment failed")?;
    }

    Command::Serve { host, port } => {
      let store = Arc::new(FsStore::new(&config.store_root));
      let app = axum::Router::new()
        .nest("/api", armory_api::api_router(store))
        .layer(TraceLayer::new_for_http());

      let address = format!(
        "{}:{}",
        host.unwrap_or(config.server.host),
        port.unwrap_or(config.server.port)
      );
      tracing::info!("Listening on http://{address}");
      let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
      axum::serve(listener, app).await.context("server error")?;
    }
  }

  Ok(())
}
