//! Handlers for the admin dashboard. Every route requires the admin role;
//! other callers are redirected to `/` before anything is read.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/submissions` | All submissions, newest first |
//! | `GET`    | `/admin/summary` | Counts and current winners |
//! | `PUT`    | `/admin/submissions/{id}/placement` | Body: `{"placement":"first"}` or `{"placement":null}` |
//! | `DELETE` | `/admin/submissions/{id}` | Removes screenshots, then the record |
//! | `GET`    | `/admin/users` | Optional `?q=` filter on email or display name |
//! | `PUT`    | `/admin/users/{id}/role` | Body: `{"role":"moderator"}` |
//! | `POST`   | `/admin/tags/seed` | Seeds every category with its defaults |
//! | `PATCH`  | `/admin/tags/{category}/{id}` | Body: `{"name":"..."}` |
//! | `DELETE` | `/admin/tags/{category}/{id}` | |
//! | `GET`    | `/admin/applications` | Optional `?kind=mentor\|mentee` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use serde::{Deserialize, Serialize};
use showcase_core::{
  accounts,
  application::{self, Application, ApplicationKind},
  blob::BlobStore,
  lifecycle::{self, DeleteReport},
  profile::{Role, UserProfile},
  store::PortalStore,
  submission::{Placement, ReviewSummary, Submission},
  tag::{self, SeedReport, Tag, TagCategory},
};
use uuid::Uuid;

use crate::{AppState, auth::RequireAdmin, error::ApiError};

// ─── Submissions ─────────────────────────────────────────────────────────────

/// `GET /admin/submissions`
pub async fn list_submissions<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Submission>>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  Ok(Json(lifecycle::list_all_submissions(state.store.as_ref()).await?))
}

/// `GET /admin/summary`
pub async fn summary<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
) -> Result<Json<ReviewSummary>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  Ok(Json(lifecycle::review_summary(state.store.as_ref()).await?))
}

#[derive(Debug, Deserialize)]
pub struct PlacementBody {
  pub placement: Option<Placement>,
}

/// `PUT /admin/submissions/{id}/placement`
pub async fn set_placement<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(admin): RequireAdmin,
  Path(id): Path<Uuid>,
  Json(body): Json<PlacementBody>,
) -> Result<Json<Submission>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let updated = lifecycle::set_placement(state.store.as_ref(), id, body.placement).await?;
  tracing::debug!(
    admin = %admin.user_id(),
    submission_id = %id,
    "placement set by admin"
  );
  Ok(Json(updated))
}

/// `DELETE /admin/submissions/{id}`
pub async fn delete_submission<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
  Path(id): Path<Uuid>,
) -> Result<Json<DeleteReport>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let report =
    lifecycle::delete_submission(state.store.as_ref(), state.blobs.as_ref(), id).await?;
  Ok(Json(report))
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserParams {
  pub q: Option<String>,
}

/// `GET /admin/users[?q=<text>]`
pub async fn list_users<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
  Query(params): Query<UserParams>,
) -> Result<Json<Vec<UserProfile>>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let users = accounts::list_users(state.store.as_ref(), params.q.as_deref()).await?;
  Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
  pub role: Role,
}

/// `PUT /admin/users/{id}/role`
pub async fn set_role<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
  Path(id): Path<Uuid>,
  Json(body): Json<RoleBody>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  Ok(Json(accounts::set_role(state.store.as_ref(), id, body.role).await?))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CategorySeed {
  pub category: TagCategory,
  #[serde(flatten)]
  pub report:   SeedReport,
}

/// `POST /admin/tags/seed`
pub async fn seed_tags<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<CategorySeed>>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let mut seeded = Vec::new();
  for category in TagCategory::all() {
    let report = tag::seed_defaults(state.store.as_ref(), category).await?;
    seeded.push(CategorySeed { category, report });
  }
  Ok(Json(seeded))
}

#[derive(Debug, Deserialize)]
pub struct RenameTagBody {
  pub name: String,
}

/// `PATCH /admin/tags/{category}/{id}`
pub async fn rename_tag<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
  Path((category, id)): Path<(TagCategory, Uuid)>,
  Json(body): Json<RenameTagBody>,
) -> Result<Json<Tag>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  Ok(Json(tag::rename_tag(state.store.as_ref(), category, id, &body.name).await?))
}

/// `DELETE /admin/tags/{category}/{id}`
pub async fn delete_tag<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
  Path((category, id)): Path<(TagCategory, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  tag::delete_tag(state.store.as_ref(), category, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Applications ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ApplicationParams {
  pub kind: Option<ApplicationKind>,
}

/// `GET /admin/applications[?kind=<kind>]`
pub async fn list_applications<S, B>(
  State(state): State<AppState<S, B>>,
  RequireAdmin(_): RequireAdmin,
  Query(params): Query<ApplicationParams>,
) -> Result<Json<Vec<Application>>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let applications = application::list_applications(state.store.as_ref(), params.kind).await?;
  Ok(Json(applications))
}
