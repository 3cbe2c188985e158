//! showcase-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `SHOWCASE_*` environment variables, opens the SQLite store and the blob
//! directory, and serves the portal over HTTP.
//!
//! # Maintenance commands
//!
//! ```text
//! showcase-server set-role --email ada@example.com --role admin
//! showcase-server seed-tags
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use showcase_api::AppState;
use showcase_core::{
  accounts,
  profile::Role,
  tag::{self, TagCategory},
};
use showcase_server::{ServerConfig, blob_fs::FsBlobStore};
use showcase_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Showcase submission portal server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the portal (the default).
  Serve,
  /// Change the role of an existing account.
  SetRole {
    #[arg(long)]
    email: String,
    /// admin, moderator or user.
    #[arg(long)]
    role:  Role,
  },
  /// Insert the built-in tags of every category that are not present yet.
  SeedTags,
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

  let server_cfg = ServerConfig::load(&cli.config).context("failed to load configuration")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::SetRole { email, role } => {
      let profile = accounts::set_role_by_email(&store, &email, role).await?;
      println!("{} is now {}", profile.email, profile.role);
      Ok(())
    }
    Command::SeedTags => {
      for category in TagCategory::all() {
        let report = tag::seed_defaults(&store, category).await?;
        println!(
          "{category}: {} added, {} already present, {} failed",
          report.added, report.skipped, report.failed
        );
      }
      Ok(())
    }
    Command::Serve => serve(server_cfg, store).await,
  }
}

async fn serve(server_cfg: ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let blob_dir = expand_tilde(&server_cfg.blob_dir);
  let blobs = FsBlobStore::open(&blob_dir)
    .await
    .with_context(|| format!("failed to open blob directory {blob_dir:?}"))?;

  let state = AppState {
    store:    Arc::new(store),
    blobs:    Arc::new(blobs),
    settings: Arc::new(server_cfg.portal_settings()),
  };

  let app = showcase_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
