//! JSON REST API for the Showcase submission portal.
//!
//! Exposes an axum [`Router`] backed by any [`PortalStore`] and [`BlobStore`].
//! TLS, static pages and blob downloads are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", showcase_api::api_router(state.clone()))
//! ```

pub mod account;
pub mod admin;
pub mod applications;
pub mod auth;
pub mod error;
pub mod gallery;
pub mod multipart;
pub mod submission;
pub mod tags;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{delete, get, patch, post, put},
};
use showcase_core::{accounts::AccountPolicy, blob::BlobStore, store::PortalStore};

pub use error::ApiError;

/// Request body ceiling when none is configured: five maximum-size
/// screenshots plus the form itself.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 52 * 1024 * 1024;

/// Portal-wide settings the handlers need at request time.
#[derive(Debug, Clone)]
pub struct PortalSettings {
  pub accounts:         AccountPolicy,
  pub max_upload_bytes: usize,
}

impl Default for PortalSettings {
  fn default() -> Self {
    Self {
      accounts:         AccountPolicy::default(),
      max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    }
  }
}

/// Shared state threaded through all axum handlers.
pub struct AppState<S, B> {
  pub store:    Arc<S>,
  pub blobs:    Arc<B>,
  pub settings: Arc<PortalSettings>,
}

// Manual impl: the derive would require `S: Clone` and `B: Clone`.
impl<S, B> Clone for AppState<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      blobs:    Arc::clone(&self.blobs),
      settings: Arc::clone(&self.settings),
    }
  }
}

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, B>(state: AppState<S, B>) -> Router<()>
where
  S: PortalStore + 'static,
  B: BlobStore + 'static,
{
  let body_limit = state.settings.max_upload_bytes;

  Router::new()
    // Accounts
    .route("/auth/register", post(account::register::<S, B>))
    .route("/auth/sign-in", post(account::sign_in::<S, B>))
    .route("/auth/sign-out", post(account::sign_out::<S, B>))
    .route("/me", get(account::me))
    // Gallery and own submission
    .route("/gallery", get(gallery::list::<S, B>))
    .route(
      "/submission",
      get(submission::get_own::<S, B>).put(submission::save::<S, B>),
    )
    // Tags
    .route("/tags/{category}", get(tags::list::<S, B>).post(tags::create::<S, B>))
    // Applications
    .route("/applications/{kind}", post(applications::file::<S, B>))
    // Admin
    .route("/admin/submissions", get(admin::list_submissions::<S, B>))
    .route("/admin/summary", get(admin::summary::<S, B>))
    .route(
      "/admin/submissions/{id}/placement",
      put(admin::set_placement::<S, B>),
    )
    .route(
      "/admin/submissions/{id}",
      delete(admin::delete_submission::<S, B>),
    )
    .route("/admin/users", get(admin::list_users::<S, B>))
    .route("/admin/users/{id}/role", put(admin::set_role::<S, B>))
    .route("/admin/tags/seed", post(admin::seed_tags::<S, B>))
    .route(
      "/admin/tags/{category}/{id}",
      patch(admin::rename_tag::<S, B>).delete(admin::delete_tag::<S, B>),
    )
    .route("/admin/applications", get(admin::list_applications::<S, B>))
    .layer(DefaultBodyLimit::max(body_limit))
    .with_state(state)
}
