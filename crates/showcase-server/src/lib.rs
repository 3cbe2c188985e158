//! HTTP server for the Showcase submission portal.
//!
//! Wires the JSON API from `showcase-api` under `/api`, serves stored blobs
//! from `/files/{*key}` and answers `/` with a small landing document, which
//! is also where callers turned away by the role guard end up.

pub mod blob_fs;
pub mod files;

use std::path::{Path, PathBuf};

use axum::{Json, Router, routing::get};
use chrono::Duration;
use serde::Deserialize;
use serde_json::{Value, json};
use showcase_api::{AppState, DEFAULT_MAX_UPLOAD_BYTES, PortalSettings, api_router};
use showcase_core::{accounts::AccountPolicy, blob::BlobStore, store::PortalStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SHOWCASE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub blob_dir:          PathBuf,
  pub session_ttl_hours: i64,
  /// Accounts registered with one of these emails start out as admins.
  pub admin_emails:      Vec<String>,
  pub max_upload_bytes:  usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_owned(),
      port:              8080,
      store_path:        PathBuf::from("showcase.db"),
      blob_dir:          PathBuf::from("blobs"),
      session_ttl_hours: 24,
      admin_emails:      Vec::new(),
      max_upload_bytes:  DEFAULT_MAX_UPLOAD_BYTES,
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("SHOWCASE")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("admin_emails"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn portal_settings(&self) -> PortalSettings {
    PortalSettings {
      accounts:         AccountPolicy {
        session_ttl:  Duration::hours(self.session_ttl_hours),
        admin_emails: self.admin_emails.clone(),
      },
      max_upload_bytes: self.max_upload_bytes,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, B>(state: AppState<S, B>) -> Router
where
  S: PortalStore + 'static,
  B: BlobStore + 'static,
{
  Router::new()
    .route("/", get(landing))
    .route("/files/{*key}", get(files::download::<S, B>))
    .with_state(state.clone())
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn landing() -> Json<Value> {
  Json(json!({
    "name": "showcase",
    "api": "/api",
    "gallery": "/api/gallery",
  }))
}
